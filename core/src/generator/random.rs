use super::*;
use ndarray::Array2;

/// Purely random layout: mines are dropped on uniformly sampled cells, retrying occupied
/// ones, until the requested count is placed.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: &GameConfig) -> Result<Grid> {
        use rand::prelude::*;

        // rejection sampling never terminates on a full board
        if config.grid_size < 2 {
            return Err(GameError::InvalidConfiguration(ConfigProblem::GridSize));
        }
        if config.mines < 1 || config.mines >= config.total_tiles() {
            log::warn!(
                "Refusing to place {} mines on {} tiles",
                config.mines,
                config.total_tiles()
            );
            return Err(GameError::InvalidConfiguration(ConfigProblem::MineCount));
        }

        let size = config.grid_size;
        let mut mines: Array2<bool> = Array2::default((size as usize, size as usize));
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines_placed: CellCount = 0;
        let mut attempts: u32 = 0;

        while mines_placed < config.mines {
            attempts += 1;
            let coords: Coord2 = (rng.random_range(0..size), rng.random_range(0..size));
            let cell = &mut mines[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                mines_placed += 1;
            }
        }

        log::debug!(
            "Generated {}x{} layout with {} mines in {} draws (seed {})",
            size,
            size,
            mines_placed,
            attempts,
            self.seed
        );
        Grid::from_mine_mask(&mines)
    }
}
