//! Hand-authored layouts for the surface and the base.

use engine_core::{
    ObjectKind, Rect, ResourceKind, Stage, StationKind, WorldObject, BLOCK_SIZE, PLAYER_SIZE,
};
use glam::Vec2;

use crate::coalesce::{base_health, IdAllocator};

/// Thickness of the surface ceiling the player hangs from.
pub const OUTSIDE_CEILING: f32 = 60.0;
/// Openings in the surface ceiling (x range). Falling through one is a fall.
pub const OUTSIDE_GAPS: [(f32, f32); 2] = [(1000.0, 1100.0), (2300.0, 2400.0)];

pub const BASE_FLOOR_Y: f32 = 480.0;
const BASE_CEILING: f32 = 40.0;
const WALL_THICKNESS: f32 = 20.0;

/// Surface: inverted gravity, so the underside of the ceiling is the floor.
pub fn outside(ids: &mut IdAllocator) -> (Vec<WorldObject>, Vec2) {
    let size = Stage::Outside.world_size(0);
    let mut objects = Vec::new();

    let mut x = 0.0;
    for (gap_start, gap_end) in OUTSIDE_GAPS.iter().copied().chain([(size.x, size.x)]) {
        if gap_start > x {
            objects.push(WorldObject::solid(
                ids.next_id(),
                Rect::new(x, 0.0, gap_start - x, OUTSIDE_CEILING),
            ));
        }
        x = gap_end;
    }

    objects.push(WorldObject::solid(ids.next_id(), Rect::new(0.0, 0.0, WALL_THICKNESS, size.y)));
    objects.push(WorldObject::solid(
        ids.next_id(),
        Rect::new(size.x - WALL_THICKNESS, 0.0, WALL_THICKNESS, size.y),
    ));

    let hanging = |x: f32, w: f32, h: f32| Rect::new(x, OUTSIDE_CEILING, w, h);
    objects.push(WorldObject::with_kind(
        ids.next_id(),
        hanging(420.0, 60.0, 80.0),
        ObjectKind::BaseEntrance,
    ));
    objects.push(WorldObject::with_kind(
        ids.next_id(),
        hanging(2700.0, 60.0, 80.0),
        ObjectKind::MineEntrance,
    ));
    for vent_x in [1500.0, 1900.0] {
        objects.push(WorldObject::with_kind(
            ids.next_id(),
            hanging(vent_x, 80.0, 40.0),
            ObjectKind::Hazard,
        ));
    }

    // Loose surface deposits to get started with.
    for (x, kind) in [
        (700.0, ResourceKind::Scrap),
        (820.0, ResourceKind::Wood),
        (1300.0, ResourceKind::Scrap),
        (2050.0, ResourceKind::Wood),
    ] {
        objects.push(WorldObject::destructible(
            ids.next_id(),
            hanging(x, BLOCK_SIZE, BLOCK_SIZE),
            kind,
            base_health(kind),
        ));
    }

    (objects, Vec2::new(200.0, OUTSIDE_CEILING))
}

/// Base room, widened by the expansion level.
pub fn base(ids: &mut IdAllocator, expansion: u32, decontamination: bool) -> (Vec<WorldObject>, Vec2) {
    let size = Stage::Base.world_size(expansion);
    let mut objects = vec![
        WorldObject::solid(ids.next_id(), Rect::new(0.0, BASE_FLOOR_Y, size.x, size.y - BASE_FLOOR_Y)),
        WorldObject::solid(ids.next_id(), Rect::new(0.0, 0.0, size.x, BASE_CEILING)),
        WorldObject::solid(ids.next_id(), Rect::new(0.0, 0.0, WALL_THICKNESS, size.y)),
        WorldObject::solid(
            ids.next_id(),
            Rect::new(size.x - WALL_THICKNESS, 0.0, WALL_THICKNESS, size.y),
        ),
    ];

    let on_floor = |x: f32, w: f32, h: f32| Rect::new(x, BASE_FLOOR_Y - h, w, h);
    objects.push(WorldObject::with_kind(ids.next_id(), on_floor(40.0, 50.0, 80.0), ObjectKind::Exit));

    let mut stations = vec![
        (StationKind::Workbench, on_floor(220.0, 70.0, 40.0)),
        (StationKind::StorageTerminal, on_floor(360.0, 50.0, 50.0)),
        (StationKind::UpgradeTerminal, on_floor(480.0, 50.0, 60.0)),
        (StationKind::MedBay, on_floor(620.0, 70.0, 60.0)),
    ];
    if decontamination {
        stations.push((StationKind::DecontaminationUnit, on_floor(780.0, 60.0, 70.0)));
    }
    for (station, rect) in stations {
        objects.push(WorldObject::with_kind(ids.next_id(), rect, ObjectKind::Station(station)));
    }

    (objects, Vec2::new(130.0, BASE_FLOOR_Y - PLAYER_SIZE.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_ceiling_has_two_gaps() {
        let (objects, _) = outside(&mut IdAllocator::default());
        let ceiling: Vec<_> = objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Solid && o.rect.y == 0.0 && o.rect.h == OUTSIDE_CEILING)
            .collect();
        assert_eq!(ceiling.len(), 3);
        for (start, end) in OUTSIDE_GAPS {
            let probe = Rect::new(start + 1.0, 0.0, end - start - 2.0, OUTSIDE_CEILING);
            assert!(ceiling.iter().all(|o| !o.rect.intersects(&probe)));
        }
    }

    #[test]
    fn outside_spawn_hangs_under_ceiling() {
        let (objects, spawn) = outside(&mut IdAllocator::default());
        let player = Rect::new(spawn.x, spawn.y, PLAYER_SIZE.x, PLAYER_SIZE.y);
        assert!(objects
            .iter()
            .filter(|o| o.kind.blocks_movement())
            .all(|o| !o.rect.intersects(&player)));
        assert_eq!(player.top(), OUTSIDE_CEILING);
    }

    #[test]
    fn decontamination_unit_only_when_owned() {
        let has_decon = |objects: &[WorldObject]| {
            objects
                .iter()
                .any(|o| o.kind == ObjectKind::Station(StationKind::DecontaminationUnit))
        };
        assert!(!has_decon(&base(&mut IdAllocator::default(), 0, false).0));
        assert!(has_decon(&base(&mut IdAllocator::default(), 0, true).0));
    }

    #[test]
    fn base_floor_spans_expanded_width() {
        let (objects, spawn) = base(&mut IdAllocator::default(), 2, false);
        let floor = &objects[0];
        assert_eq!(floor.rect.w, Stage::Base.world_size(2).x);
        assert_eq!(spawn.y + PLAYER_SIZE.y, BASE_FLOOR_Y);
    }
}
