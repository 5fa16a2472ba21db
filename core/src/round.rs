use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    InProgress,
    Won,
    Lost,
}

impl RoundStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Transient per-round progress. Dropped on reset, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub status: RoundStatus,
    pub revealed_count: CellCount,
    pub current_winnings: f64,
    /// Look-ahead payout for one more safe reveal; display only.
    pub potential_next_winnings: f64,
    pub last_revealed: Option<Coord2>,
    pub revealed_order: Vec<Coord2>,
    /// Filled only when the round is lost.
    pub mines_on_loss: Vec<Coord2>,
    pub cashed_out: bool,
}

impl RoundState {
    pub fn is_over(&self) -> bool {
        self.status.is_finished()
    }

    pub fn has_won(&self) -> bool {
        matches!(self.status, RoundStatus::Won)
    }
}

/// One wager from start to a terminal state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    grid: Grid,
    bet: f64,
    state: RoundState,
}

impl Round {
    pub fn new(grid: Grid, bet: f64) -> Self {
        let potential_next_winnings = winnings(bet, 1, grid.safe_tile_count());
        Self {
            grid,
            bet,
            state: RoundState {
                status: RoundStatus::InProgress,
                revealed_count: 0,
                current_winnings: 0.0,
                potential_next_winnings,
                last_revealed: None,
                revealed_order: Vec::new(),
                mines_on_loss: Vec::new(),
                cashed_out: false,
            },
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn status(&self) -> RoundStatus {
        self.state.status
    }

    pub fn is_finished(&self) -> bool {
        self.state.status.is_finished()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.state.revealed_count
    }

    pub fn current_winnings(&self) -> f64 {
        self.state.current_winnings
    }

    pub fn safe_tiles_left(&self) -> CellCount {
        self.grid.safe_tile_count() - self.state.revealed_count
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.grid.validate_coords(coords)?;

        if self.is_finished() {
            return Ok(RevealOutcome::NoChange);
        }
        let Some(tile) = self.grid.reveal_tile(coords) else {
            return Ok(RevealOutcome::NoChange);
        };

        self.state.last_revealed = Some(coords);
        self.state.revealed_order.push(coords);

        if tile.is_mine {
            log::debug!(
                "Mine hit at {:?} after {} safe reveals",
                coords,
                self.state.revealed_count
            );
            self.state.status = RoundStatus::Lost;
            self.state.mines_on_loss = self.grid.mine_positions();
            return Ok(RevealOutcome::HitMine);
        }

        let safe_tiles = self.grid.safe_tile_count();
        self.state.revealed_count += 1;
        self.state.current_winnings = winnings(self.bet, self.state.revealed_count, safe_tiles);
        self.state.potential_next_winnings =
            winnings(self.bet, self.state.revealed_count + 1, safe_tiles);
        log::trace!(
            "Revealed {:?} ({}/{}), winnings now {}",
            coords,
            self.state.revealed_count,
            safe_tiles,
            self.state.current_winnings
        );

        if self.state.revealed_count == safe_tiles {
            self.state.status = RoundStatus::Won;
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Safe)
        }
    }

    pub fn cash_out(&mut self) -> CashOutOutcome {
        if self.is_finished() || self.state.revealed_count == 0 {
            return CashOutOutcome::NoChange;
        }

        self.state.status = RoundStatus::Won;
        self.state.cashed_out = true;
        CashOutOutcome::CashedOut(self.state.current_winnings)
    }
}
