//! World objects: the static and destructible pieces a stage is built from.

use glam::Vec2;

use crate::components::Health;
use crate::rect::Rect;
use crate::resources::ResourceKind;
use crate::stage::Stage;

/// Edge length of one terrain cell in world units.
pub const BLOCK_SIZE: f32 = 20.0;
/// Edge length of one spatial bucket in world units.
pub const CHUNK_SIZE: f32 = 200.0;
/// Player collision box (width, height).
pub const PLAYER_SIZE: Vec2 = Vec2::new(14.0, 26.0);

/// Stable identifier of a placed object within one stage session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Base furniture the player can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationKind {
    Workbench,
    StorageTerminal,
    UpgradeTerminal,
    MedBay,
    DecontaminationUnit,
}

impl StationKind {
    pub fn label(self) -> &'static str {
        match self {
            StationKind::Workbench => "Workbench",
            StationKind::StorageTerminal => "Storage",
            StationKind::UpgradeTerminal => "Upgrades",
            StationKind::MedBay => "Med Bay",
            StationKind::DecontaminationUnit => "Decontamination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Blocks movement, cannot be mined.
    Solid,
    /// Blocks movement, loses health when mined.
    Destructible,
    /// Passable zone that hurts the player periodically.
    Hazard,
    /// Door from OUTSIDE into the base.
    BaseEntrance,
    /// Shaft from OUTSIDE down into the mine.
    MineEntrance,
    /// Way back OUTSIDE from the mine or the base.
    Exit,
    Station(StationKind),
}

impl ObjectKind {
    /// Participates in player collision.
    pub fn blocks_movement(self) -> bool {
        matches!(self, ObjectKind::Solid | ObjectKind::Destructible)
    }

    pub fn is_interactable(self) -> bool {
        matches!(
            self,
            ObjectKind::BaseEntrance
                | ObjectKind::MineEntrance
                | ObjectKind::Exit
                | ObjectKind::Station(_)
        )
    }

    /// Stage an entrance or exit leads to.
    pub fn destination(self, from: Stage) -> Option<Stage> {
        match self {
            ObjectKind::BaseEntrance => Some(Stage::Base),
            ObjectKind::MineEntrance => Some(Stage::Mine),
            ObjectKind::Exit if from != Stage::Outside => Some(Stage::Outside),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldObject {
    pub id: ObjectId,
    pub rect: Rect,
    pub kind: ObjectKind,
    pub resource_kind: Option<ResourceKind>,
    pub health: Option<Health>,
    /// Rendering-only alternate look (0 = plain).
    pub variant: u8,
}

impl WorldObject {
    pub fn solid(id: ObjectId, rect: Rect) -> Self {
        Self::with_kind(id, rect, ObjectKind::Solid)
    }

    pub fn with_kind(id: ObjectId, rect: Rect, kind: ObjectKind) -> Self {
        Self {
            id,
            rect,
            kind,
            resource_kind: None,
            health: None,
            variant: 0,
        }
    }

    pub fn destructible(id: ObjectId, rect: Rect, resource: ResourceKind, health: f32) -> Self {
        Self {
            id,
            rect,
            kind: ObjectKind::Destructible,
            resource_kind: Some(resource),
            health: Some(Health::new(health)),
            variant: 0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Footprint larger than one chunk on either axis.
    pub fn is_large(&self) -> bool {
        self.rect.w > CHUNK_SIZE || self.rect.h > CHUNK_SIZE
    }

    /// Number of terrain cells covered (at least 1).
    pub fn cell_count(&self) -> u32 {
        let cols = (self.rect.w / BLOCK_SIZE).round().max(1.0) as u32;
        let rows = (self.rect.h / BLOCK_SIZE).round().max(1.0) as u32;
        cols * rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_objects_exceed_one_chunk() {
        let small = WorldObject::solid(ObjectId(1), Rect::new(0.0, 0.0, CHUNK_SIZE, 20.0));
        let wide = WorldObject::solid(ObjectId(2), Rect::new(0.0, 0.0, CHUNK_SIZE + 1.0, 20.0));
        assert!(!small.is_large());
        assert!(wide.is_large());
    }

    #[test]
    fn exits_lead_outside_only_from_inner_stages() {
        assert_eq!(ObjectKind::Exit.destination(Stage::Mine), Some(Stage::Outside));
        assert_eq!(ObjectKind::Exit.destination(Stage::Outside), None);
        assert_eq!(ObjectKind::MineEntrance.destination(Stage::Outside), Some(Stage::Mine));
    }
}
