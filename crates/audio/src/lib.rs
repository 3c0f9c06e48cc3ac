//! Audio system using Kira for named sound cues.
//!
//! The simulation only names cues; this crate maps them to files under
//! `<asset_dir>/sounds/` and plays them. Missing or undecodable files are
//! logged once at load and then silently skipped.

use anyhow::Result;
use kira::{
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
};
use std::collections::HashMap;
use std::path::Path;

/// Every sound the game can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    MineHit,
    /// Pick against unbreakable rock.
    Clank,
    BlockBreak,
    /// Break of a rarity 2+ block.
    RareBreak,
    Jump,
    Land,
    Hurt,
    Portal,
    Scan,
    Melee,
    AreaPulse,
    Beam,
    Death,
}

impl SoundCue {
    pub const ALL: [SoundCue; 13] = [
        SoundCue::MineHit,
        SoundCue::Clank,
        SoundCue::BlockBreak,
        SoundCue::RareBreak,
        SoundCue::Jump,
        SoundCue::Land,
        SoundCue::Hurt,
        SoundCue::Portal,
        SoundCue::Scan,
        SoundCue::Melee,
        SoundCue::AreaPulse,
        SoundCue::Beam,
        SoundCue::Death,
    ];

    /// File stem under the sounds directory.
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::MineHit => "mine_hit",
            SoundCue::Clank => "clank",
            SoundCue::BlockBreak => "block_break",
            SoundCue::RareBreak => "rare_break",
            SoundCue::Jump => "jump",
            SoundCue::Land => "land",
            SoundCue::Hurt => "hurt",
            SoundCue::Portal => "portal",
            SoundCue::Scan => "scan",
            SoundCue::Melee => "melee",
            SoundCue::AreaPulse => "area_pulse",
            SoundCue::Beam => "beam",
            SoundCue::Death => "death",
        }
    }

    /// Relative loudness.
    pub fn volume(self) -> f64 {
        match self {
            SoundCue::MineHit | SoundCue::Clank => 0.5,
            SoundCue::Jump | SoundCue::Land => 0.4,
            _ => 0.8,
        }
    }
}

/// Main audio system managing loaded cues and live handles.
pub struct AudioSystem {
    manager: AudioManager,
    sounds: HashMap<SoundCue, StaticSoundData>,
    active_sounds: Vec<StaticSoundHandle>,
}

impl AudioSystem {
    /// Create a new audio system.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;

        Ok(Self {
            manager,
            sounds: HashMap::new(),
            active_sounds: Vec::new(),
        })
    }

    /// Load a sound from a file.
    pub fn load_sound(&mut self, cue: SoundCue, path: &Path) -> Result<()> {
        let sound_data = StaticSoundData::from_file(path)?;
        self.sounds.insert(cue, sound_data);
        Ok(())
    }

    /// Load every cue found in `<asset_dir>/sounds/<name>.ogg`. Returns how many loaded.
    pub fn load_cues(&mut self, asset_dir: &Path) -> usize {
        let dir = asset_dir.join("sounds");
        let mut loaded = 0;
        for cue in SoundCue::ALL {
            let path = dir.join(format!("{}.ogg", cue.name()));
            match self.load_sound(cue, &path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Sound '{}' unavailable ({}): {e}", cue.name(), path.display()),
            }
        }
        log::info!("Loaded {loaded}/{} sound cues", SoundCue::ALL.len());
        loaded
    }

    /// Play a cue at its default loudness. Unloaded cues are skipped.
    pub fn play(&mut self, cue: SoundCue) -> Result<()> {
        self.play_with_volume(cue, cue.volume())
    }

    /// Play a cue with volume control.
    pub fn play_with_volume(&mut self, cue: SoundCue, volume: f64) -> Result<()> {
        if let Some(sound_data) = self.sounds.get(&cue) {
            let settings = StaticSoundSettings::new().volume(volume);
            let modified = sound_data.clone().with_settings(settings);
            let handle = self.manager.play(modified)?;
            self.active_sounds.push(handle);
        }
        Ok(())
    }

    /// Clean up finished sounds.
    pub fn cleanup(&mut self) {
        self.active_sounds.retain(|handle| handle.state() != kira::sound::PlaybackState::Stopped);
    }

    /// Stop all sounds.
    pub fn stop_all(&mut self) {
        for handle in &mut self.active_sounds {
            let _ = handle.stop(Tween::default());
        }
        self.active_sounds.clear();
    }

    /// Set master volume (0.0 to 1.0).
    pub fn set_master_volume(&mut self, volume: f64) {
        let _ = self.manager.main_track().set_volume(volume, Tween::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn cue_names_are_unique() {
        let names: HashSet<_> = SoundCue::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), SoundCue::ALL.len());
    }
}
