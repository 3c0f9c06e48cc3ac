//! Procedural generation of stage layouts.
//!
//! The mine is carved fresh on every load: cellular-automaton caves, value-noise
//! caverns, ore veins and greedy block merging. The surface and the base are
//! hand-authored. Callers pass the RNG in so tests can seed it; at runtime the
//! game seeds from entropy and every mine is different.

pub mod cave;
pub mod coalesce;
pub mod layout;
pub mod veins;

pub use cave::{CaveGrid, Cell};
pub use coalesce::{base_health, size_factor, IdAllocator};

use engine_core::{ObjectKind, Rect, Stage, WorldObject, BLOCK_SIZE, PLAYER_SIZE};
use glam::Vec2;
use rand::Rng;
use thiserror::Error;

/// Smallest mine grid the generator accepts.
pub const MIN_COLS: usize = 20;
pub const MIN_ROWS: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("mine grid {cols}x{rows} is too small (minimum 20x10)")]
    GridTooSmall { cols: usize, rows: usize },
}

/// Player progression that shapes generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageParams {
    pub ore_scanner_level: u32,
    pub base_expansion_level: u32,
    pub decontamination_unit: bool,
}

/// Everything needed to populate a stage.
#[derive(Debug, Clone)]
pub struct StageLayout {
    pub objects: Vec<WorldObject>,
    pub world_size: Vec2,
    /// Top-left of the player box on arrival and after a fall.
    pub spawn_point: Vec2,
}

pub fn generate_stage<R: Rng>(
    stage: Stage,
    params: &StageParams,
    rng: &mut R,
) -> Result<StageLayout, GenerationError> {
    let mut ids = IdAllocator::default();
    let layout = match stage {
        Stage::Outside => {
            let (objects, spawn_point) = layout::outside(&mut ids);
            StageLayout {
                objects,
                world_size: stage.world_size(0),
                spawn_point,
            }
        }
        Stage::Base => {
            let (objects, spawn_point) = layout::base(
                &mut ids,
                params.base_expansion_level,
                params.decontamination_unit,
            );
            StageLayout {
                objects,
                world_size: stage.world_size(params.base_expansion_level),
                spawn_point,
            }
        }
        Stage::Mine => generate_mine(
            engine_core::MINE_COLS,
            engine_core::MINE_ROWS,
            params.ore_scanner_level,
            rng,
        )?,
    };

    log::info!(
        "Generated {} with {} objects ({}x{})",
        stage.name(),
        layout.objects.len(),
        layout.world_size.x,
        layout.world_size.y
    );
    Ok(layout)
}

/// Carve a mine of `cols x rows` cells.
pub fn generate_mine<R: Rng>(
    cols: usize,
    rows: usize,
    scanner_level: u32,
    rng: &mut R,
) -> Result<StageLayout, GenerationError> {
    if cols < MIN_COLS || rows < MIN_ROWS {
        return Err(GenerationError::GridTooSmall { cols, rows });
    }

    let mut grid = cave::carve(cols, rows, rng);
    veins::scatter_veins(&mut grid, scanner_level, rng);

    let mut ids = IdAllocator::default();
    let mut objects = coalesce::coalesce(&grid, &mut ids, rng);

    let floor_y = (rows - 1) as f32 * BLOCK_SIZE;
    objects.push(WorldObject::with_kind(
        ids.next_id(),
        Rect::new(BLOCK_SIZE, floor_y - 60.0, 30.0, 60.0),
        ObjectKind::Exit,
    ));

    Ok(StageLayout {
        objects,
        world_size: Vec2::new(cols as f32 * BLOCK_SIZE, rows as f32 * BLOCK_SIZE),
        spawn_point: Vec2::new(5.0 * BLOCK_SIZE, floor_y - PLAYER_SIZE.y),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn corridor(rows: usize) -> Rect {
        let (top, bottom) = cave::spawn_corridor_rows(rows);
        Rect::new(
            BLOCK_SIZE,
            top as f32 * BLOCK_SIZE,
            cave::SPAWN_CORRIDOR_COLS as f32 * BLOCK_SIZE,
            (bottom - top + 1) as f32 * BLOCK_SIZE,
        )
    }

    #[test]
    fn mine_objects_have_positive_size() {
        let mut rng = StdRng::seed_from_u64(42);
        let layout = generate_stage(Stage::Mine, &StageParams::default(), &mut rng).unwrap();
        assert!(!layout.objects.is_empty());
        assert!(layout.objects.iter().all(|o| o.rect.is_valid()));
    }

    #[test]
    fn spawn_corridor_has_no_blocking_objects() {
        for seed in [1, 2, 3] {
            let mut rng = StdRng::seed_from_u64(seed);
            let layout = generate_mine(240, 60, 3, &mut rng).unwrap();
            let corridor = corridor(60);
            assert!(layout
                .objects
                .iter()
                .filter(|o| o.kind.blocks_movement())
                .all(|o| !o.rect.intersects(&corridor)));
        }
    }

    #[test]
    fn spawn_point_is_inside_corridor_and_clear_of_exit() {
        let mut rng = StdRng::seed_from_u64(8);
        let layout = generate_mine(60, 30, 0, &mut rng).unwrap();
        let player = Rect::new(
            layout.spawn_point.x,
            layout.spawn_point.y,
            PLAYER_SIZE.x,
            PLAYER_SIZE.y,
        );
        let corridor = corridor(30);
        assert!(corridor.contains_point(player.position()));
        assert!(corridor.contains_point(Vec2::new(player.right(), player.bottom())));
        let exit = layout
            .objects
            .iter()
            .find(|o| o.kind == ObjectKind::Exit)
            .unwrap();
        assert!(corridor.contains_point(exit.center()));
        assert!(!exit.rect.intersects(&player));
    }

    #[test]
    fn same_seed_same_mine() {
        let a = generate_mine(80, 30, 1, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = generate_mine(80, 30, 1, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a.objects, b.objects);
    }

    #[test]
    fn tiny_grid_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate_mine(10, 40, 0, &mut rng).unwrap_err(),
            GenerationError::GridTooSmall { cols: 10, rows: 40 }
        );
        assert!(generate_mine(40, 5, 0, &mut rng).is_err());
    }

    #[test]
    fn base_width_follows_expansion() {
        let params = StageParams {
            base_expansion_level: 1,
            ..Default::default()
        };
        let layout = generate_stage(Stage::Base, &params, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(layout.world_size.x, 1200.0);
    }
}
