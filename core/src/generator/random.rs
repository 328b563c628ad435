use alloc::vec::Vec;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::*;

/// Places mines by rejection sampling: draw a uniformly random cell, retry when it already holds a mine or is the
/// starting cell.
///
/// Only the starting cell is kept free, its neighbors may still receive mines. The same seed and start always produce
/// the same layout.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start: Coord2,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let (width, height) = config.size;

        let placeable = config.total_cells().saturating_sub(1);
        let target = if config.mines > placeable {
            log::warn!(
                "Cannot keep start cell safe with {} mines, placing only {}",
                config.mines,
                placeable
            );
            placeable
        } else {
            config.mines
        };

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines = Vec::with_capacity(target.into());
        let mut rejected = 0_u32;

        while mines.len() < usize::from(target) {
            let coords = (rng.random_range(0..width), rng.random_range(0..height));
            if coords == self.start || mask[coords.to_nd_index()] {
                rejected += 1;
                continue;
            }
            mask[coords.to_nd_index()] = true;
            mines.push(coords);
        }

        log::debug!(
            "Generated {} mines around start {:?} (seed {}, {} draws rejected)",
            mines.len(),
            self.start,
            self.seed,
            rejected
        );
        MineLayout::from_placed_mines(config.size, mines)
    }
}
