//! Game configuration (window, timing, audio, assets). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    #[serde(default)]
    pub fullscreen: bool,
    /// Simulation tick length in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// 0.0 ..= 1.0
    #[serde(default = "default_volume")]
    pub master_volume: f64,
    /// Directory holding images and sounds, relative to the working directory.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
}

fn default_window_width() -> u32 {
    960
}
fn default_window_height() -> u32 {
    540
}
fn default_true() -> bool {
    true
}
fn default_tick_ms() -> u64 {
    16
}
fn default_volume() -> f64 {
    0.8
}
fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            fullscreen: false,
            tick_ms: default_tick_ms(),
            master_volume: default_volume(),
            asset_dir: default_asset_dir(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    /// Tick length, never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = GameConfig::parse("(vsync: false, tick_ms: 20)").unwrap();
        assert!(!config.vsync);
        assert_eq!(config.tick_ms, 20);
        assert_eq!(config.window_width, 960);
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
    }

    #[test]
    fn pretty_output_parses_back() {
        let config = GameConfig {
            fullscreen: true,
            master_volume: 0.25,
            ..Default::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(GameConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(GameConfig::parse("(window_width: \"wide\")").is_err());
    }

    #[test]
    fn zero_tick_is_clamped() {
        let config = GameConfig {
            tick_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
