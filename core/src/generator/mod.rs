use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: &GameConfig) -> Result<Grid>;
}

/// A prepared layout is its own generator, as long as it matches the requested board.
impl MinefieldGenerator for Grid {
    fn generate(self, config: &GameConfig) -> Result<Grid> {
        if self.size() != config.grid_size {
            return Err(GameError::InvalidConfiguration(ConfigProblem::GridSize));
        }
        if self.mine_count() != config.mines {
            return Err(GameError::InvalidConfiguration(ConfigProblem::MineCount));
        }
        Ok(self)
    }
}
