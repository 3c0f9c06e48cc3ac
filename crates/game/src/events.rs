//! What a tick reports back to the host: stat deltas and fire-and-forget events.

use audio::SoundCue;
use engine_core::{ObjectId, ObjectKind, ResourceKind, ResourceTable, Stage};

use crate::stats::StatDeltas;
use crate::weapons::WeaponKind;

/// Object the player is standing close enough to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interactable {
    pub id: ObjectId,
    pub kind: ObjectKind,
}

impl Interactable {
    /// Prompt shown to the player.
    pub fn label(&self) -> &'static str {
        match self.kind {
            ObjectKind::BaseEntrance => "Enter base",
            ObjectKind::MineEntrance => "Descend into the mine",
            ObjectKind::Exit => "Go outside",
            ObjectKind::Station(station) => station.label(),
            _ => "Use",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageCause {
    Suffocation,
    Infection,
    Hazard,
    Fall,
}

/// Result of breaking one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceGrant {
    /// Material of the broken block.
    pub block: ResourceKind,
    /// What went into the inventory, if anything.
    pub resource: Option<(ResourceKind, u32)>,
    pub infection: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Sound(SoundCue),
    StageLoaded(Stage),
    /// Latched interaction target changed (`None` when nothing is in range).
    InteractionChanged(Option<Interactable>),
    InteractRequested(Interactable),
    PlayerHurt { amount: f32, cause: DamageCause },
    ResourceGrant(ResourceGrant),
    ScanCompleted(ResourceTable<u32>),
    WeaponFired(WeaponKind),
    /// Attack refused for lack of ammunition.
    CannotAfford(ResourceKind),
    PlayerDied,
}

/// Everything one tick proposes.
#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    pub deltas: StatDeltas,
    pub events: Vec<SimEvent>,
}

impl TickOutput {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(SimEvent::Sound(cue));
    }

    pub fn hurt(&mut self, amount: f32, cause: DamageCause) {
        self.deltas.health -= amount;
        self.events.push(SimEvent::PlayerHurt { amount, cause });
        self.events.push(SimEvent::Sound(SoundCue::Hurt));
    }

    pub fn grant(&mut self, grant: ResourceGrant) {
        if let Some((kind, amount)) = grant.resource {
            self.deltas.resources[kind] += amount as i32;
        }
        self.deltas.infection += grant.infection;
        self.events.push(SimEvent::ResourceGrant(grant));
    }

    pub fn merge(&mut self, other: TickOutput) {
        self.deltas.merge(&other.deltas);
        self.events.extend(other.events);
    }

    pub fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
