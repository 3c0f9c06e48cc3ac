//! Application phase state machine.
//!
//! The host owns one [`AppPhase`] and feeds it [`PhaseEvent`]s; the
//! simulation only ever sees [`AppPhase::simulation_active`].

use engine_core::StationKind;

/// Key label shown in interaction prompts.
pub const INTERACT_KEY: &str = "E";

/// Which station menu is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Workbench,
    Storage,
    Upgrades,
    MedBay,
    Decontamination,
}

impl From<StationKind> for MenuKind {
    fn from(station: StationKind) -> Self {
        match station {
            StationKind::Workbench => MenuKind::Workbench,
            StationKind::StorageTerminal => MenuKind::Storage,
            StationKind::UpgradeTerminal => MenuKind::Upgrades,
            StationKind::MedBay => MenuKind::MedBay,
            StationKind::DecontaminationUnit => MenuKind::Decontamination,
        }
    }
}

impl MenuKind {
    pub fn title(self) -> &'static str {
        match self {
            MenuKind::Workbench => "WORKBENCH",
            MenuKind::Storage => "STORAGE",
            MenuKind::Upgrades => "UPGRADES",
            MenuKind::MedBay => "MED BAY",
            MenuKind::Decontamination => "DECONTAMINATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Title,
    Playing,
    Paused,
    Menu(MenuKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    TogglePause,
    OpenMenu(MenuKind),
    CloseMenu,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Event does not apply in this phase.
    Ignored,
    Enter(AppPhase),
    /// Leave the application.
    Exit,
}

impl AppPhase {
    /// The whole transition table.
    pub fn on(self, event: PhaseEvent) -> Transition {
        use AppPhase::*;
        use PhaseEvent::*;
        match (self, event) {
            (Title, Start) => Transition::Enter(Playing),
            (Title, Quit) => Transition::Exit,
            (Playing, TogglePause) => Transition::Enter(Paused),
            (Playing, OpenMenu(kind)) => Transition::Enter(Menu(kind)),
            (Paused, TogglePause) | (Paused, Start) => Transition::Enter(Playing),
            (Menu(_), CloseMenu) | (Menu(_), TogglePause) => Transition::Enter(Playing),
            (Playing | Paused | Menu(_), Quit) => Transition::Enter(Title),
            _ => Transition::Ignored,
        }
    }

    /// Apply `event` in place. Returns false when the application should exit.
    pub fn handle(&mut self, event: PhaseEvent) -> bool {
        match self.on(event) {
            Transition::Enter(next) => {
                log::debug!("Phase {:?} -> {:?}", self, next);
                *self = next;
                true
            }
            Transition::Ignored => true,
            Transition::Exit => false,
        }
    }

    /// The only thing the simulation core is told.
    pub fn simulation_active(self) -> bool {
        self == AppPhase::Playing
    }
}
