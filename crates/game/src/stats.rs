//! Player stats owned by the host, and the deltas a tick proposes for them.

use engine_core::{ResourceKind, ResourceTable, Upgrades};

use crate::weapons::WeaponKind;

pub const MAX_INFECTION: f32 = 100.0;

/// Persistent player numbers. The simulation only reads these; changes come
/// back as [`StatDeltas`] and the host applies them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub health: f32,
    pub max_health: f32,
    pub oxygen: f32,
    pub max_oxygen: f32,
    /// 0..=100
    pub infection: f32,
    pub resources: ResourceTable<u32>,
    pub upgrades: Upgrades,
    pub equipped_weapon: Option<WeaponKind>,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            health: 100.0,
            max_health: 100.0,
            oxygen: 100.0,
            max_oxygen: 100.0,
            infection: 0.0,
            resources: ResourceTable::default(),
            upgrades: Upgrades::default(),
            equipped_weapon: None,
        }
    }
}

impl PlayerStats {
    /// Apply a tick's proposed changes, clamping every value into range.
    pub fn apply(&mut self, deltas: &StatDeltas) {
        self.health = (self.health + deltas.health).clamp(0.0, self.max_health);
        self.oxygen = (self.oxygen + deltas.oxygen).clamp(0.0, self.max_oxygen);
        self.infection = (self.infection + deltas.infection).clamp(0.0, MAX_INFECTION);
        for kind in ResourceKind::ALL {
            let change = deltas.resources[kind];
            let count = &mut self.resources[kind];
            *count = if change >= 0 {
                count.saturating_add(change as u32)
            } else {
                count.saturating_sub(change.unsigned_abs())
            };
        }
    }

    pub fn can_afford(&self, kind: ResourceKind, amount: u32) -> bool {
        self.resources[kind] >= amount
    }
}

/// Additive changes proposed by one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatDeltas {
    pub health: f32,
    pub oxygen: f32,
    pub infection: f32,
    pub resources: ResourceTable<i32>,
}

impl StatDeltas {
    pub fn is_empty(&self) -> bool {
        self.health == 0.0 && self.oxygen == 0.0 && self.infection == 0.0 && self.resources.is_empty()
    }

    pub fn merge(&mut self, other: &StatDeltas) {
        self.health += other.health;
        self.oxygen += other.oxygen;
        self.infection += other.infection;
        for kind in ResourceKind::ALL {
            self.resources[kind] += other.resources[kind];
        }
    }

    /// Deltas that bring `stats` back to full health and oxygen with no infection.
    pub fn restore(stats: &PlayerStats) -> Self {
        Self {
            health: stats.max_health - stats.health,
            oxygen: stats.max_oxygen - stats.oxygen,
            infection: -stats.infection,
            resources: ResourceTable::default(),
        }
    }
}
