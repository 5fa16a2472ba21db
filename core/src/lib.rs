//! Engine for the single-player "Mines" wager game.
//!
//! A [`GameEngine`] owns the whole session: configuration, the current round, the
//! bankroll [`Ledger`], the auto-play policy and subscribers. Front-ends issue commands
//! and render [`EngineSnapshot`]s.

use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use autoplay::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use ledger::*;
pub use observer::*;
pub use payout::*;
pub use round::*;
pub use settings::*;
pub use storage::*;
pub use tile::*;
pub use types::*;
pub use wallet::*;

mod autoplay;
mod engine;
mod error;
mod generator;
mod ledger;
mod observer;
mod payout;
mod round;
mod settings;
mod storage;
mod tile;
mod types;
mod wallet;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid_size: Coord,
    pub mines: CellCount,
    pub bet: f64,
}

impl GameConfig {
    pub const fn new_unchecked(grid_size: Coord, mines: CellCount, bet: f64) -> Self {
        Self {
            grid_size,
            mines,
            bet,
        }
    }

    /// Builds a config, clamping the mine count so at least one tile stays safe.
    pub fn new(grid_size: Coord, mines: CellCount, bet: f64) -> Self {
        let grid_size = grid_size.max(2);
        let mines = mines.clamp(1, square(grid_size) - 1);
        Self::new_unchecked(grid_size, mines, bet)
    }

    pub const fn total_tiles(&self) -> CellCount {
        square(self.grid_size)
    }

    pub const fn safe_tiles(&self) -> CellCount {
        self.total_tiles().saturating_sub(self.mines)
    }

    pub const fn max_mines(&self) -> CellCount {
        self.total_tiles().saturating_sub(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(GameError::InvalidConfiguration(ConfigProblem::GridSize));
        }
        if self.mines < 1 || self.mines > self.max_mines() {
            return Err(GameError::InvalidConfiguration(ConfigProblem::MineCount));
        }
        validate_bet(self.bet)
    }
}

pub(crate) fn validate_bet(bet: f64) -> Result<()> {
    if bet.is_finite() && bet > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfiguration(ConfigProblem::BetAmount))
    }
}

/// Square board of tiles with a fixed mine layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    tiles: Array2<Tile>,
    mine_count: CellCount,
}

impl Grid {
    pub fn from_mine_mask(mine_mask: &Array2<bool>) -> Result<Self> {
        let (rows, cols) = mine_mask.dim();
        if rows != cols || rows < 2 || rows > Coord::MAX as usize {
            return Err(GameError::InvalidConfiguration(ConfigProblem::GridSize));
        }

        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count();
        if mine_count == 0 || mine_count >= mine_mask.len() {
            return Err(GameError::InvalidConfiguration(ConfigProblem::MineCount));
        }

        let mut tiles = mine_mask.map(|&is_mine| Tile {
            is_mine,
            ..Tile::default()
        });
        for ((row, col), tile) in tiles.indexed_iter_mut() {
            let coords = (row as Coord, col as Coord);
            tile.adjacent_mines = mine_mask
                .iter_neighbors(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count() as u8;
        }

        Ok(Self {
            tiles,
            mine_count: mine_count as CellCount,
        })
    }

    pub fn from_mine_coords(size: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default((size as usize, size as usize));

        for &coords in mine_coords {
            if coords.0 >= size || coords.1 >= size {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Self::from_mine_mask(&mine_mask)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size && coords.1 < size {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord {
        self.tiles.nrows() as Coord
    }

    pub fn total_tiles(&self) -> CellCount {
        self.tiles.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_tile_count(&self) -> CellCount {
        self.total_tiles() - self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords].is_mine
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self[coords].adjacent_mines
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        self.tiles
            .indexed_iter()
            .map(|((row, col), &tile)| ((row as Coord, col as Coord), tile))
    }

    /// Mine positions in row-major order.
    pub fn mine_positions(&self) -> Vec<Coord2> {
        self.iter()
            .filter(|(_, tile)| tile.is_mine)
            .map(|(coords, _)| coords)
            .collect()
    }

    pub fn hidden_safe_positions(&self) -> Vec<Coord2> {
        self.iter()
            .filter(|(_, tile)| tile.is_hidden_safe())
            .map(|(coords, _)| coords)
            .collect()
    }

    /// Flips a hidden tile to revealed, returning it. `None` if it was already revealed.
    pub(crate) fn reveal_tile(&mut self, coords: Coord2) -> Option<Tile> {
        let tile = &mut self.tiles[coords.to_nd_index()];
        if tile.is_revealed {
            return None;
        }
        tile.is_revealed = true;
        Some(*tile)
    }
}

impl Index<Coord2> for Grid {
    type Output = Tile;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.tiles[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    NoChange,
    Changed,
}

impl CommandOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Safe,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Safe => true,
            HitMine => true,
            Won => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CashOutOutcome {
    NoChange,
    CashedOut(f64),
}

impl CashOutOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::CashedOut(_))
    }
}
