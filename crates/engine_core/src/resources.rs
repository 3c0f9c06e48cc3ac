//! Resource kinds, enum-keyed tables and upgrade levels.

use std::ops::{Index, IndexMut};

/// Every material a world object can be made of, and every countable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Scrap,
    Wood,
    Iron,
    Ice,
    Coal,
    Titanium,
    Uranium,
    RareSlime,
    /// Default destructible cave wall in the mine.
    LivingMetal,
    /// Infected living metal: fragile, yields slime and infection.
    InfectedMetal,
}

impl ResourceKind {
    pub const COUNT: usize = 10;

    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Scrap,
        ResourceKind::Wood,
        ResourceKind::Iron,
        ResourceKind::Ice,
        ResourceKind::Coal,
        ResourceKind::Titanium,
        ResourceKind::Uranium,
        ResourceKind::RareSlime,
        ResourceKind::LivingMetal,
        ResourceKind::InfectedMetal,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Scrap => "scrap",
            ResourceKind::Wood => "wood",
            ResourceKind::Iron => "iron",
            ResourceKind::Ice => "ice",
            ResourceKind::Coal => "coal",
            ResourceKind::Titanium => "titanium",
            ResourceKind::Uranium => "uranium",
            ResourceKind::RareSlime => "rare slime",
            ResourceKind::LivingMetal => "living metal",
            ResourceKind::InfectedMetal => "infected metal",
        }
    }

    /// Ore kinds are the vein materials the scanner reports.
    pub fn is_ore(self) -> bool {
        !matches!(self, ResourceKind::LivingMetal | ResourceKind::InfectedMetal)
    }

    /// Rarity tier 0..=3, drives vein luck, screen shake and floating text colour.
    pub fn rarity(self) -> u8 {
        match self {
            ResourceKind::Scrap
            | ResourceKind::Wood
            | ResourceKind::Coal
            | ResourceKind::LivingMetal => 0,
            ResourceKind::Iron | ResourceKind::Ice | ResourceKind::InfectedMetal => 1,
            ResourceKind::Titanium | ResourceKind::RareSlime => 2,
            ResourceKind::Uranium => 3,
        }
    }

    /// Colour used when no texture is available (RGBA).
    pub fn color(self) -> [f32; 4] {
        match self {
            ResourceKind::Scrap => [0.55, 0.52, 0.48, 1.0],
            ResourceKind::Wood => [0.50, 0.33, 0.18, 1.0],
            ResourceKind::Iron => [0.70, 0.45, 0.35, 1.0],
            ResourceKind::Ice => [0.65, 0.85, 0.95, 1.0],
            ResourceKind::Coal => [0.15, 0.15, 0.17, 1.0],
            ResourceKind::Titanium => [0.80, 0.82, 0.90, 1.0],
            ResourceKind::Uranium => [0.35, 0.95, 0.30, 1.0],
            ResourceKind::RareSlime => [0.75, 0.30, 0.85, 1.0],
            ResourceKind::LivingMetal => [0.30, 0.32, 0.38, 1.0],
            ResourceKind::InfectedMetal => [0.45, 0.28, 0.40, 1.0],
        }
    }
}

/// Fixed-size table keyed by [`ResourceKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTable<T> {
    values: [T; ResourceKind::COUNT],
}

impl<T: Copy + Default> Default for ResourceTable<T> {
    fn default() -> Self {
        Self {
            values: [T::default(); ResourceKind::COUNT],
        }
    }
}

impl<T> ResourceTable<T> {
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &T)> {
        ResourceKind::ALL.into_iter().zip(self.values.iter())
    }
}

impl<T: Copy + Default + PartialEq> ResourceTable<T> {
    /// True when every entry equals the default value.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == T::default())
    }
}

impl<T> Index<ResourceKind> for ResourceTable<T> {
    type Output = T;

    fn index(&self, kind: ResourceKind) -> &T {
        &self.values[kind.index()]
    }
}

impl<T> IndexMut<ResourceKind> for ResourceTable<T> {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut T {
        &mut self.values[kind.index()]
    }
}

/// Upgrade levels the simulation reads. Levels start at 1 where a level is
/// a multiplier base, and at 0 where it unlocks something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upgrades {
    pub mining_speed: u32,
    pub mining_radius: u32,
    pub mining_reach: u32,
    pub oxygen_capacity: u32,
    pub ore_scanner: u32,
    pub base_expansion: u32,
    pub high_jump_boots: bool,
    pub decontamination_unit: bool,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            mining_speed: 1,
            mining_radius: 0,
            mining_reach: 0,
            oxygen_capacity: 0,
            ore_scanner: 0,
            base_expansion: 0,
            high_jump_boots: false,
            decontamination_unit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_indexes_by_kind() {
        let mut t: ResourceTable<u32> = ResourceTable::default();
        assert!(t.is_empty());
        t[ResourceKind::Uranium] += 3;
        assert_eq!(t[ResourceKind::Uranium], 3);
        assert_eq!(t[ResourceKind::Scrap], 0);
        assert!(!t.is_empty());
    }

    #[test]
    fn all_matches_index_order() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
