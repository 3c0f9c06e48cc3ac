//! Stage definitions: the three world contexts the player moves between.

use glam::Vec2;

use crate::world::BLOCK_SIZE;

/// Mine grid size in cells.
pub const MINE_COLS: usize = 240;
pub const MINE_ROWS: usize = 60;

pub const OUTSIDE_SIZE: Vec2 = Vec2::new(3200.0, 900.0);
pub const BASE_HEIGHT: f32 = 540.0;
const BASE_WIDTH: f32 = 960.0;
const BASE_WIDTH_PER_LEVEL: f32 = 240.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Surface. Gravity is inverted: the player hangs from the ceiling.
    Outside,
    /// Procedurally generated cave.
    Mine,
    /// The player's base. Safe zone for oxygen and infection.
    Base,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Outside => "outside",
            Stage::Mine => "mine",
            Stage::Base => "base",
        }
    }

    /// Sign of gravity along y: +1 pulls toward larger y, -1 toward y = 0.
    pub fn gravity_sign(self) -> f32 {
        match self {
            Stage::Outside => -1.0,
            Stage::Mine | Stage::Base => 1.0,
        }
    }

    /// World size of this stage for a given base expansion level.
    pub fn world_size(self, base_expansion_level: u32) -> Vec2 {
        match self {
            Stage::Outside => OUTSIDE_SIZE,
            Stage::Mine => Vec2::new(
                MINE_COLS as f32 * BLOCK_SIZE,
                MINE_ROWS as f32 * BLOCK_SIZE,
            ),
            Stage::Base => Vec2::new(
                BASE_WIDTH + BASE_WIDTH_PER_LEVEL * base_expansion_level as f32,
                BASE_HEIGHT,
            ),
        }
    }

    /// Oxygen is only consumed away from the base.
    pub fn drains_oxygen(self) -> bool {
        self != Stage::Base
    }
}
