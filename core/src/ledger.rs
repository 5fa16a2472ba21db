use serde::{Deserialize, Serialize};

use crate::*;

/// Outcome events the engine emits at round boundaries.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LedgerEvent {
    /// Stake debited when a round starts.
    RoundStarted { bet: f64 },
    /// Winnings credited on a full clear or a cash-out.
    RoundWon { amount: f64 },
    /// Stake forfeited on a mine.
    RoundLost { bet: f64 },
}

/// Wallet balance and lifetime statistics. Survives resets; only [`LedgerEvent`]s change it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ledger {
    pub wallet_balance: f64,
    pub total_games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub total_winnings: f64,
    pub total_losses: f64,
    pub highest_win: f64,
}

impl Ledger {
    pub const fn new(wallet_balance: f64) -> Self {
        Self {
            wallet_balance,
            total_games_played: 0,
            games_won: 0,
            games_lost: 0,
            total_winnings: 0.0,
            total_losses: 0.0,
            highest_win: 0.0,
        }
    }

    pub fn can_afford(&self, bet: f64) -> bool {
        bet <= self.wallet_balance
    }

    pub fn apply(&mut self, event: LedgerEvent) -> Result<()> {
        match event {
            LedgerEvent::RoundStarted { bet } => {
                if !self.can_afford(bet) {
                    return Err(GameError::InsufficientBalance {
                        required: bet,
                        available: self.wallet_balance,
                    });
                }
                self.wallet_balance -= bet;
                self.total_games_played += 1;
            }
            LedgerEvent::RoundWon { amount } => {
                self.wallet_balance += amount;
                self.games_won += 1;
                self.total_winnings += amount;
                self.highest_win = self.highest_win.max(amount);
            }
            LedgerEvent::RoundLost { bet } => {
                self.games_lost += 1;
                self.total_losses += bet;
            }
        }
        log::debug!("Ledger applied {:?}, balance {}", event, self.wallet_balance);
        Ok(())
    }

    /// Share of played games that were won, in percent.
    pub fn win_rate(&self) -> f64 {
        if self.total_games_played == 0 {
            0.0
        } else {
            f64::from(self.games_won) / f64::from(self.total_games_played) * 100.0
        }
    }

    pub fn net_profit(&self) -> f64 {
        self.total_winnings - self.total_losses
    }

    pub(crate) fn log_analytics(&self, won: bool) {
        log::info!(
            "Round finished ({}): played {}, won {}, lost {}, win rate {:.1}%, net profit {:.2}, highest win {:.2}",
            if won { "win" } else { "loss" },
            self.total_games_played,
            self.games_won,
            self.games_lost,
            self.win_rate(),
            self.net_profit(),
            self.highest_win
        );
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}
