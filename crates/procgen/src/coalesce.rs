//! Greedy merge of the cell grid into placed world objects.

use engine_core::{ObjectId, Rect, ResourceKind, WorldObject, BLOCK_SIZE};
use rand::Rng;

use crate::cave::{CaveGrid, Cell};

/// Square block sides tried at every unprocessed cell, largest first.
const BLOCK_SIDES: [usize; 3] = [4, 2, 1];
/// Chance a living metal block is infected.
pub const INFECTED_CHANCE: f64 = 0.13;
/// Chance a living metal block uses the alternate look.
pub const VARIANT_CHANCE: f64 = 0.05;

/// Health of a single cell of `kind`.
pub fn base_health(kind: ResourceKind) -> f32 {
    match kind {
        ResourceKind::Scrap | ResourceKind::Wood => 40.0,
        ResourceKind::Coal => 45.0,
        ResourceKind::Ice => 50.0,
        ResourceKind::LivingMetal => 30.0,
        ResourceKind::InfectedMetal => 8.0,
        ResourceKind::Iron => 80.0,
        ResourceKind::Titanium => 120.0,
        ResourceKind::Uranium => 150.0,
        ResourceKind::RareSlime => 60.0,
    }
}

/// Health multiplier for a merged block with the given side in cells.
pub fn size_factor(side: usize) -> f32 {
    match side {
        4 => 7.0,
        2 => 2.5,
        _ => 1.0,
    }
}

/// Sequential id source for one generated stage.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next);
        self.next += 1;
        id
    }
}

/// Turn every non-air cell into part of exactly one object.
pub fn coalesce<R: Rng>(grid: &CaveGrid, ids: &mut IdAllocator, rng: &mut R) -> Vec<WorldObject> {
    let (cols, rows) = (grid.cols(), grid.rows());
    let mut processed = vec![false; cols * rows];
    let mut objects = Vec::new();

    for y in 0..rows {
        for x in 0..cols {
            if processed[y * cols + x] {
                continue;
            }
            let cell = grid.get(x, y);
            if cell == Cell::Air {
                continue;
            }

            let side = BLOCK_SIDES
                .iter()
                .copied()
                .find(|&side| square_fits(grid, &processed, x, y, side, cell))
                .unwrap_or(1);

            for dy in 0..side {
                for dx in 0..side {
                    processed[(y + dy) * cols + x + dx] = true;
                }
            }

            let rect = Rect::new(
                x as f32 * BLOCK_SIZE,
                y as f32 * BLOCK_SIZE,
                side as f32 * BLOCK_SIZE,
                side as f32 * BLOCK_SIZE,
            );
            objects.push(make_object(ids.next_id(), rect, cell, side, rng));
        }
    }
    objects
}

fn square_fits(
    grid: &CaveGrid,
    processed: &[bool],
    x: usize,
    y: usize,
    side: usize,
    cell: Cell,
) -> bool {
    if x + side > grid.cols() || y + side > grid.rows() {
        return false;
    }
    (0..side).all(|dy| {
        (0..side).all(|dx| {
            let (cx, cy) = (x + dx, y + dy);
            !processed[cy * grid.cols() + cx] && grid.get(cx, cy) == cell
        })
    })
}

fn make_object<R: Rng>(id: ObjectId, rect: Rect, cell: Cell, side: usize, rng: &mut R) -> WorldObject {
    match cell {
        Cell::Bedrock | Cell::Air => WorldObject::solid(id, rect),
        Cell::Wall => {
            let kind = if rng.gen_bool(INFECTED_CHANCE) {
                ResourceKind::InfectedMetal
            } else {
                ResourceKind::LivingMetal
            };
            let mut obj = WorldObject::destructible(id, rect, kind, base_health(kind) * size_factor(side));
            if rng.gen_bool(VARIANT_CHANCE) {
                obj.variant = 1;
            }
            obj
        }
        Cell::Ore(kind) => {
            WorldObject::destructible(id, rect, kind, base_health(kind) * size_factor(side))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::ObjectKind;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn uniform_grid_merges_into_big_blocks() {
        let grid = CaveGrid::filled(8, 8, Cell::Ore(ResourceKind::Iron));
        let mut rng = StdRng::seed_from_u64(1);
        let objects = coalesce(&grid, &mut IdAllocator::default(), &mut rng);
        assert_eq!(objects.len(), 4);
        for obj in &objects {
            assert_eq!(obj.rect.w, 4.0 * BLOCK_SIZE);
            assert_eq!(obj.health.map(|h| h.max), Some(80.0 * 7.0));
        }
    }

    #[test]
    fn mixed_cells_fall_back_to_smaller_blocks() {
        let mut grid = CaveGrid::filled(4, 4, Cell::Wall);
        grid.set(3, 3, Cell::Air);
        let mut rng = StdRng::seed_from_u64(2);
        let objects = coalesce(&grid, &mut IdAllocator::default(), &mut rng);
        let covered: u32 = objects.iter().map(|o| o.cell_count()).sum();
        assert_eq!(covered, 15);
        assert!(objects.iter().any(|o| o.rect.w == 2.0 * BLOCK_SIZE));
    }

    #[test]
    fn bedrock_is_solid_and_walls_are_living_metal() {
        let mut grid = CaveGrid::filled(3, 1, Cell::Bedrock);
        grid.set(1, 0, Cell::Wall);
        let mut rng = StdRng::seed_from_u64(3);
        let objects = coalesce(&grid, &mut IdAllocator::default(), &mut rng);
        assert_eq!(objects[0].kind, ObjectKind::Solid);
        assert_eq!(objects[2].kind, ObjectKind::Solid);
        assert_eq!(objects[1].kind, ObjectKind::Destructible);
        assert!(matches!(
            objects[1].resource_kind,
            Some(ResourceKind::LivingMetal | ResourceKind::InfectedMetal)
        ));
    }

    #[test]
    fn ids_are_unique() {
        let grid = CaveGrid::filled(10, 10, Cell::Wall);
        let mut rng = StdRng::seed_from_u64(4);
        let objects = coalesce(&grid, &mut IdAllocator::default(), &mut rng);
        let mut ids: Vec<_> = objects.iter().map(|o| o.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), objects.len());
    }
}
