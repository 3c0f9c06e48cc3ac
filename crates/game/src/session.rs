//! Host-side session: owns the stats, the app phase and the simulation, and
//! applies what each tick proposes. No window or GPU here.

use audio::SoundCue;
use engine_core::{ObjectKind, ResourceKind, Stage};
use glam::Vec2;
use input::{InputSnapshot, KeyCode};
use rand::{rngs::StdRng, Rng};

use crate::events::{Interactable, SimEvent, TickOutput};
use crate::render::overlay::HudView;
use crate::simulation::Simulation;
use crate::state::{AppPhase, MenuKind, PhaseEvent};
use crate::stats::PlayerStats;
use crate::weapons::WeaponKind;

/// Ticks a notice stays on screen.
pub const NOTICE_TICKS: u32 = 150;

/// What the host should do with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Used by the session; do not forward to gameplay input.
    Consumed,
    PassThrough,
    Exit,
}

pub struct Session<R: Rng = StdRng> {
    pub sim: Simulation<R>,
    pub stats: PlayerStats,
    pub phase: AppPhase,
    pub interaction: Option<Interactable>,
    notice: Option<(String, u32)>,
}

impl Session<StdRng> {
    pub fn new(viewport: Vec2) -> Self {
        Self::with_simulation(Simulation::new(viewport))
    }
}

impl<R: Rng> Session<R> {
    pub fn with_simulation(sim: Simulation<R>) -> Self {
        Self {
            sim,
            stats: PlayerStats::default(),
            phase: AppPhase::Title,
            interaction: None,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    fn set_notice(&mut self, text: String) {
        self.notice = Some((text, NOTICE_TICKS));
    }

    pub fn hud(&self) -> HudView<'_> {
        HudView {
            stats: &self.stats,
            phase: self.phase,
            stage: self.sim.stage(),
            interaction: self.interaction,
            notice: self.notice(),
        }
    }

    /// Fresh run from the title screen.
    fn new_run(&mut self) -> Vec<SoundCue> {
        self.stats = PlayerStats::default();
        self.enter(Stage::Base)
    }

    /// Load `stage` and apply what loading proposes.
    pub fn enter(&mut self, stage: Stage) -> Vec<SoundCue> {
        self.interaction = None;
        let out = self.sim.load_stage(stage, &self.stats);
        self.apply(out)
    }

    /// Run one simulation tick. Returns the sounds to play.
    pub fn tick(&mut self, input: &InputSnapshot) -> Vec<SoundCue> {
        if let Some((_, remaining)) = &mut self.notice {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.notice = None;
            }
        }
        let out = self.sim.tick(input, &self.stats, self.phase.simulation_active());
        self.apply(out)
    }

    /// Apply stat deltas, then react to events in order.
    pub fn apply(&mut self, out: TickOutput) -> Vec<SoundCue> {
        self.stats.apply(&out.deltas);
        let mut sounds = Vec::new();
        for event in out.events {
            match event {
                SimEvent::Sound(cue) => sounds.push(cue),
                SimEvent::InteractionChanged(target) => self.interaction = target,
                SimEvent::InteractRequested(target) => sounds.extend(self.interact(target)),
                SimEvent::PlayerDied => {
                    self.set_notice("You blacked out and woke up at the base".to_string());
                    sounds.extend(self.enter(Stage::Base));
                }
                SimEvent::ScanCompleted(found) => {
                    let mut parts: Vec<String> = ResourceKind::ALL
                        .into_iter()
                        .filter(|kind| found[*kind] > 0)
                        .map(|kind| format!("{} {}", found[kind], kind.name()))
                        .collect();
                    if parts.is_empty() {
                        parts.push("nothing nearby".to_string());
                    }
                    self.set_notice(format!("Scan: {}", parts.join(", ")));
                }
                SimEvent::CannotAfford(kind) => self.set_notice(format!("Out of {}", kind.name())),
                SimEvent::StageLoaded(stage) => log::info!("Entered {}", stage.name()),
                SimEvent::PlayerHurt { amount, cause } => log::debug!("Hurt {amount} by {cause:?}"),
                SimEvent::ResourceGrant(grant) => log::debug!("Granted {:?}", grant.resource),
                SimEvent::WeaponFired(kind) => log::debug!("Fired {}", kind.name()),
            }
        }
        sounds
    }

    fn interact(&mut self, target: Interactable) -> Vec<SoundCue> {
        if let Some(stage) = target.kind.destination(self.sim.stage()) {
            let mut sounds = vec![SoundCue::Portal];
            sounds.extend(self.enter(stage));
            return sounds;
        }
        if let ObjectKind::Station(station) = target.kind {
            self.phase.handle(PhaseEvent::OpenMenu(MenuKind::from(station)));
        }
        Vec::new()
    }

    /// Phase keys. Returns sounds through `sounds` when a new run starts.
    pub fn handle_key(&mut self, key: KeyCode, sounds: &mut Vec<SoundCue>) -> KeyOutcome {
        let event = match (self.phase, key) {
            (AppPhase::Title, KeyCode::Enter) => PhaseEvent::Start,
            (AppPhase::Title, KeyCode::Escape) => PhaseEvent::Quit,
            (AppPhase::Playing, KeyCode::Escape) => PhaseEvent::TogglePause,
            (AppPhase::Paused, KeyCode::Escape) => PhaseEvent::TogglePause,
            (AppPhase::Paused, KeyCode::Enter) => PhaseEvent::Start,
            (AppPhase::Paused, KeyCode::KeyQ) => PhaseEvent::Quit,
            (AppPhase::Menu(_), KeyCode::Escape | KeyCode::KeyE) => PhaseEvent::CloseMenu,
            (AppPhase::Menu(MenuKind::Workbench), digit) => {
                return match weapon_slot(digit) {
                    Some(weapon) => {
                        self.equip(weapon);
                        KeyOutcome::Consumed
                    }
                    None => KeyOutcome::PassThrough,
                };
            }
            _ => return KeyOutcome::PassThrough,
        };

        let from = self.phase;
        if !self.phase.handle(event) {
            return KeyOutcome::Exit;
        }
        if from == AppPhase::Title && self.phase == AppPhase::Playing {
            sounds.extend(self.new_run());
        }
        KeyOutcome::Consumed
    }

    /// Equip `weapon`, or put it away when it is already in hand.
    fn equip(&mut self, weapon: WeaponKind) {
        self.stats.equipped_weapon = if self.stats.equipped_weapon == Some(weapon) {
            None
        } else {
            Some(weapon)
        };
        log::info!("Equipped {:?}", self.stats.equipped_weapon.map(WeaponKind::name));
    }
}

fn weapon_slot(key: KeyCode) -> Option<WeaponKind> {
    let index = match key {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        _ => return None,
    };
    WeaponKind::ALL.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{ObjectId, StationKind};
    use rand::SeedableRng;

    const VIEW: Vec2 = Vec2::new(960.0, 540.0);

    fn session() -> Session<StdRng> {
        let mut s = Session::with_simulation(Simulation::with_rng(VIEW, StdRng::seed_from_u64(21)));
        let mut sounds = Vec::new();
        assert_eq!(s.handle_key(KeyCode::Enter, &mut sounds), KeyOutcome::Consumed);
        s
    }

    fn request(kind: ObjectKind) -> TickOutput {
        let mut out = TickOutput::default();
        out.push(SimEvent::InteractRequested(Interactable { id: ObjectId(1), kind }));
        out
    }

    #[test]
    fn start_enters_base() {
        let s = session();
        assert_eq!(s.phase, AppPhase::Playing);
        assert_eq!(s.sim.stage(), Stage::Base);
        assert!(!s.sim.store().is_empty());
    }

    #[test]
    fn entrance_switches_stage_with_portal_sound() {
        let mut s = session();
        let sounds = s.apply(request(ObjectKind::MineEntrance));
        assert_eq!(sounds.first(), Some(&SoundCue::Portal));
        assert_eq!(s.sim.stage(), Stage::Mine);
        assert_eq!(s.interaction, None);
    }

    #[test]
    fn station_opens_menu_and_pauses_simulation() {
        let mut s = session();
        s.apply(request(ObjectKind::Station(StationKind::Workbench)));
        assert_eq!(s.phase, AppPhase::Menu(MenuKind::Workbench));
        assert!(!s.phase.simulation_active());

        let mut sounds = Vec::new();
        assert_eq!(s.handle_key(KeyCode::Digit3, &mut sounds), KeyOutcome::Consumed);
        assert_eq!(s.stats.equipped_weapon, Some(WeaponKind::Beam));
        s.handle_key(KeyCode::Digit3, &mut sounds);
        assert_eq!(s.stats.equipped_weapon, None);

        assert_eq!(s.handle_key(KeyCode::KeyE, &mut sounds), KeyOutcome::Consumed);
        assert_eq!(s.phase, AppPhase::Playing);
    }

    #[test]
    fn death_returns_to_base() {
        let mut s = session();
        s.enter(Stage::Mine);
        let mut out = TickOutput::default();
        out.push(SimEvent::PlayerDied);
        s.apply(out);
        assert_eq!(s.sim.stage(), Stage::Base);
        assert!(s.notice().is_some());
    }

    #[test]
    fn gameplay_keys_pass_through() {
        let mut s = session();
        let mut sounds = Vec::new();
        assert_eq!(s.handle_key(KeyCode::KeyE, &mut sounds), KeyOutcome::PassThrough);
        assert_eq!(s.handle_key(KeyCode::KeyQ, &mut sounds), KeyOutcome::PassThrough);
        assert_eq!(s.handle_key(KeyCode::Escape, &mut sounds), KeyOutcome::Consumed);
        assert_eq!(s.phase, AppPhase::Paused);
    }

    #[test]
    fn escape_on_title_exits() {
        let mut s = Session::with_simulation(Simulation::with_rng(VIEW, StdRng::seed_from_u64(22)));
        let mut sounds = Vec::new();
        assert_eq!(s.handle_key(KeyCode::Escape, &mut sounds), KeyOutcome::Exit);
    }

    #[test]
    fn notice_expires() {
        let mut s = session();
        let mut out = TickOutput::default();
        out.push(SimEvent::CannotAfford(ResourceKind::Coal));
        s.apply(out);
        assert_eq!(s.notice(), Some("Out of coal"));
        s.phase = AppPhase::Paused;
        for _ in 0..NOTICE_TICKS {
            s.tick(&InputSnapshot::default());
        }
        assert_eq!(s.notice(), None);
    }
}
