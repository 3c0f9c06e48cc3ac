//! Ore vein scattering.
//!
//! Vein seeds sit on a coarse lattice. The kind depends on how far along the
//! mine the seed is (the mine gets deeper to the right) and on scanner luck,
//! which shifts weight toward rarer kinds. A vein is a short random walk that
//! only ever overwrites plain wall, so caves and the spawn corridor stay open.

use engine_core::ResourceKind;
use rand::distributions::WeightedIndex;
use rand::prelude::*;

use crate::cave::{CaveGrid, Cell};

/// Lattice spacing between candidate vein seeds, in cells.
pub const VEIN_LATTICE: usize = 3;
/// Chance a lattice point seeds a vein.
pub const VEIN_CHANCE: f64 = 0.15;
/// Extra weight per scanner level per rarity tier.
const LUCK_PER_LEVEL: f32 = 0.5;

/// Horizontal depth band of a lattice point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBand {
    Shallow,
    Mid,
    Deep,
}

impl DepthBand {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio < 1.0 / 3.0 {
            DepthBand::Shallow
        } else if ratio < 2.0 / 3.0 {
            DepthBand::Mid
        } else {
            DepthBand::Deep
        }
    }

    fn base_weights(self) -> &'static [(ResourceKind, f32)] {
        match self {
            DepthBand::Shallow => &[
                (ResourceKind::Scrap, 40.0),
                (ResourceKind::Wood, 25.0),
                (ResourceKind::Coal, 20.0),
                (ResourceKind::Iron, 15.0),
            ],
            DepthBand::Mid => &[
                (ResourceKind::Wood, 30.0),
                (ResourceKind::Coal, 30.0),
                (ResourceKind::Scrap, 20.0),
                (ResourceKind::Iron, 20.0),
            ],
            DepthBand::Deep => &[
                (ResourceKind::Titanium, 30.0),
                (ResourceKind::Ice, 30.0),
                (ResourceKind::Coal, 25.0),
                (ResourceKind::Uranium, 15.0),
            ],
        }
    }

    /// Weights after scanner luck.
    pub fn weights(self, scanner_level: u32) -> Vec<(ResourceKind, f32)> {
        self.base_weights()
            .iter()
            .map(|&(kind, w)| {
                let luck = 1.0 + LUCK_PER_LEVEL * scanner_level as f32 * kind.rarity() as f32;
                (kind, w * luck)
            })
            .collect()
    }
}

/// Walk length range for a vein of `kind`. Rarer kinds form smaller veins.
pub fn vein_size(kind: ResourceKind) -> (usize, usize) {
    match kind {
        ResourceKind::Scrap | ResourceKind::Coal => (6, 10),
        ResourceKind::Wood => (5, 9),
        ResourceKind::Ice => (4, 8),
        ResourceKind::Iron => (4, 7),
        ResourceKind::Titanium => (3, 6),
        ResourceKind::Uranium => (2, 4),
        _ => (1, 1),
    }
}

/// Scatter veins over `grid`. Returns the number of veins seeded.
pub fn scatter_veins<R: Rng>(grid: &mut CaveGrid, scanner_level: u32, rng: &mut R) -> usize {
    let (cols, rows) = (grid.cols(), grid.rows());
    let mut seeded = 0;

    for y in (1..rows - 1).step_by(VEIN_LATTICE) {
        for x in (1..cols - 1).step_by(VEIN_LATTICE) {
            if !rng.gen_bool(VEIN_CHANCE) {
                continue;
            }
            let band = DepthBand::from_ratio(x as f32 / cols as f32);
            let weights = band.weights(scanner_level);
            let Ok(dist) = WeightedIndex::new(weights.iter().map(|(_, w)| *w)) else {
                continue;
            };
            let kind = weights[dist.sample(rng)].0;
            let (min, max) = vein_size(kind);
            let steps = rng.gen_range(min..=max);
            paint_vein(grid, x, y, kind, steps, rng);
            seeded += 1;
        }
    }
    log::debug!("Seeded {seeded} ore veins (scanner level {scanner_level})");
    seeded
}

fn paint_vein<R: Rng>(
    grid: &mut CaveGrid,
    x: usize,
    y: usize,
    kind: ResourceKind,
    steps: usize,
    rng: &mut R,
) {
    let (mut cx, mut cy) = (x, y);
    for _ in 0..steps {
        if grid.get(cx, cy) == Cell::Wall {
            grid.set(cx, cy, Cell::Ore(kind));
        }
        // Stay inside the bedrock ring.
        let nx = cx as isize + rng.gen_range(-1isize..=1);
        let ny = cy as isize + rng.gen_range(-1isize..=1);
        cx = nx.clamp(1, grid.cols() as isize - 2) as usize;
        cy = ny.clamp(1, grid.rows() as isize - 2) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cave::carve;

    #[test]
    fn depth_bands_split_in_thirds() {
        assert_eq!(DepthBand::from_ratio(0.1), DepthBand::Shallow);
        assert_eq!(DepthBand::from_ratio(0.5), DepthBand::Mid);
        assert_eq!(DepthBand::from_ratio(0.9), DepthBand::Deep);
    }

    #[test]
    fn scanner_luck_favours_rare_kinds() {
        let plain = DepthBand::Deep.weights(0);
        let lucky = DepthBand::Deep.weights(3);
        let share = |w: &[(ResourceKind, f32)], k: ResourceKind| {
            let total: f32 = w.iter().map(|(_, v)| v).sum();
            w.iter().find(|(kind, _)| *kind == k).map(|(_, v)| v / total).unwrap_or(0.0)
        };
        assert!(share(&lucky, ResourceKind::Uranium) > share(&plain, ResourceKind::Uranium));
        assert!(share(&lucky, ResourceKind::Coal) < share(&plain, ResourceKind::Coal));
    }

    #[test]
    fn veins_never_replace_air_or_bedrock() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = carve(90, 40, &mut rng);
        let before = grid.clone();
        scatter_veins(&mut grid, 2, &mut rng);
        for y in 0..40 {
            for x in 0..90 {
                match before.get(x, y) {
                    Cell::Air | Cell::Bedrock => assert_eq!(grid.get(x, y), before.get(x, y)),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn shallow_veins_hold_no_deep_ores() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut grid = CaveGrid::filled(60, 30, Cell::Wall);
        scatter_veins(&mut grid, 0, &mut rng);
        // A walk drifts at most `max steps` cells from its seed.
        for y in 0..30 {
            for x in 0..10 {
                if let Cell::Ore(kind) = grid.get(x, y) {
                    assert!(!matches!(kind, ResourceKind::Uranium | ResourceKind::Titanium));
                }
            }
        }
    }
}
