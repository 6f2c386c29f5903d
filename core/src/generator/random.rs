use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Uniform generator: picks the mine cells without replacement from the
/// row-major index space of the board.
///
/// One seed drives a whole run, every call advances the same RNG so the
/// sequence of episodes is reproducible.
#[derive(Clone, Debug)]
pub struct RandomBoardGenerator {
    seed: u64,
    rng: SmallRng,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(&mut self, config: GameConfig) -> Grid {
        debug_assert!(config.validate().is_ok(), "invalid config {config:?}");

        let total_cells = config.total_cells();
        let mut mines = config.mines;
        if mines >= total_cells {
            log::warn!(
                "Requested {} mines but board only fits {} with one safe cell",
                mines,
                total_cells.saturating_sub(1)
            );
            mines = total_cells.saturating_sub(1);
        }

        let mut mine_mask: Array2<bool> = Array2::default(config.size().to_nd_index());
        let sampled = rand::seq::index::sample(
            &mut self.rng,
            usize::from(total_cells),
            usize::from(mines),
        );
        for index in sampled.into_iter() {
            let coords = from_linear(index as CellCount, config.cols);
            mine_mask[coords.to_nd_index()] = true;
        }

        let grid = Grid::from_mine_mask(&mine_mask);

        // double check mine count
        if grid.mine_count() != config.mines {
            log::warn!(
                "Generated grid count mismatch, actual: {}, requested: {}",
                grid.mine_count(),
                config.mines
            );
        }
        log::trace!("Generated {}x{} grid", config.rows, config.cols);
        grid
    }
}
