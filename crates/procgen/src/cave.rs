//! Cave carving: random fill, cellular-automaton smoothing and noise caverns.

use engine_core::ResourceKind;
use noise::{NoiseFn, Value};
use rand::Rng;

/// Probability a non-edge cell starts as air.
pub const AIR_CHANCE: f64 = 0.38;
/// Majority-rule smoothing passes.
pub const SMOOTHING_PASSES: usize = 4;
/// A cell stays (or becomes) wall with at least this many wall neighbours.
pub const WALL_NEIGHBOUR_THRESHOLD: usize = 5;
/// Noise lattice points per cell.
pub const NOISE_FREQUENCY: f64 = 0.35;
/// Noise above this carves next to air that existed before the cavern pass.
pub const CAVERN_GROW_THRESHOLD: f64 = 0.6;
/// Noise above this carves unconditionally.
pub const CAVERN_CARVE_THRESHOLD: f64 = 0.8;
/// Spawn corridor: columns `1..=SPAWN_CORRIDOR_COLS`.
pub const SPAWN_CORRIDOR_COLS: usize = 15;
/// Spawn corridor: this many rows directly above the floor row.
pub const SPAWN_CORRIDOR_ROWS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Air,
    /// Indestructible outer ring.
    Bedrock,
    /// Plain rock, becomes living metal.
    Wall,
    Ore(ResourceKind),
}

/// Row-major grid of cave cells.
#[derive(Debug, Clone)]
pub struct CaveGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl CaveGrid {
    pub fn filled(cols: usize, rows: usize, cell: Cell) -> Self {
        Self {
            cols,
            rows,
            cells: vec![cell; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[y * self.cols + x]
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.cols + x] = cell;
    }

    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.cols || y + 1 == self.rows
    }

    /// Solid for smoothing purposes; out-of-bounds counts as solid.
    fn is_solid_at(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return true;
        }
        self.get(x as usize, y as usize) != Cell::Air
    }

    /// Wall count among the 8 neighbours.
    pub fn wall_neighbours(&self, x: usize, y: usize) -> usize {
        let (x, y) = (x as isize, y as isize);
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if (dx, dy) != (0, 0) && self.is_solid_at(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        count
    }

    /// At least one 4-neighbour is air.
    pub fn touches_air(&self, x: usize, y: usize) -> bool {
        let (x, y) = (x as isize, y as isize);
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .iter()
            .any(|(dx, dy)| !self.is_solid_at(x + dx, y + dy))
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }
}

/// Carve the cave shape: everything except ores.
///
/// The rightmost column starts open and pulls the smoothing toward an open far
/// end; after smoothing the outer ring is sealed as bedrock.
pub fn carve<R: Rng>(cols: usize, rows: usize, rng: &mut R) -> CaveGrid {
    let mut grid = CaveGrid::filled(cols, rows, Cell::Wall);

    for y in 0..rows {
        grid.set(cols - 1, y, Cell::Air);
    }
    for y in 1..rows - 1 {
        for x in 1..cols - 1 {
            if rng.gen_bool(AIR_CHANCE) {
                grid.set(x, y, Cell::Air);
            }
        }
    }

    for _ in 0..SMOOTHING_PASSES {
        grid = smooth(&grid);
    }

    carve_caverns(&mut grid, rng.gen());
    seal_edges(&mut grid);
    clear_spawn_corridor(&mut grid);
    grid
}

/// One majority-rule pass over the interior. Edge cells are copied unchanged.
fn smooth(grid: &CaveGrid) -> CaveGrid {
    let mut next = grid.clone();
    for y in 1..grid.rows - 1 {
        for x in 1..grid.cols - 1 {
            let cell = if grid.wall_neighbours(x, y) >= WALL_NEIGHBOUR_THRESHOLD {
                Cell::Wall
            } else {
                Cell::Air
            };
            next.set(x, y, cell);
        }
    }
    next
}

/// Cavern noise at a cell, scaled to `[0, 1]`.
fn cavern_noise(field: &Value, x: usize, y: usize) -> f64 {
    let raw = field.get([x as f64 * NOISE_FREQUENCY, y as f64 * NOISE_FREQUENCY]);
    ((raw + 1.0) * 0.5).clamp(0.0, 1.0)
}

/// Open large caverns where a value-noise field is high. Adjacency to air is
/// judged on the grid as it was before this pass.
fn carve_caverns(grid: &mut CaveGrid, seed: u32) {
    let field = Value::new(seed);
    let before = grid.clone();
    for y in 1..grid.rows - 1 {
        for x in 1..grid.cols - 1 {
            if before.get(x, y) == Cell::Air {
                continue;
            }
            let n = cavern_noise(&field, x, y);
            if n > CAVERN_CARVE_THRESHOLD || (n > CAVERN_GROW_THRESHOLD && before.touches_air(x, y)) {
                grid.set(x, y, Cell::Air);
            }
        }
    }
}

fn seal_edges(grid: &mut CaveGrid) {
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            if grid.is_edge(x, y) {
                grid.set(x, y, Cell::Bedrock);
            }
        }
    }
}

/// Rows `(first, last)` of the spawn corridor, inclusive.
pub fn spawn_corridor_rows(rows: usize) -> (usize, usize) {
    let floor = rows - 1;
    (floor - SPAWN_CORRIDOR_ROWS, floor - 1)
}

fn clear_spawn_corridor(grid: &mut CaveGrid) {
    let (top, bottom) = spawn_corridor_rows(grid.rows);
    let right = SPAWN_CORRIDOR_COLS.min(grid.cols - 2);
    for y in top..=bottom {
        for x in 1..=right {
            grid.set(x, y, Cell::Air);
        }
    }
}
