use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

pub const DEFAULT_GRID_SIZE: Coord = 5;
pub const DEFAULT_MINES: CellCount = 5;
pub const DEFAULT_BET: f64 = 0.05;
pub const DEFAULT_STARTING_BALANCE: f64 = 10.0;
pub const DEFAULT_AUTO_PLAY_DELAY_MS: u64 = 500;
pub const MIN_AUTO_PLAY_DELAY_MS: u64 = 100;
pub const DEFAULT_CASHOUT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_WALLET_CONNECT_DELAY_MS: u64 = 1500;
pub const MAX_GRID_SIZE: Coord = 16;

/// Session tunables. Every field falls back to its default when missing from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub grid_size: Coord,
    pub min_mines: CellCount,
    /// Upper clamp for `configure`; `None` means all but one tile.
    pub max_mines: Option<CellCount>,
    pub default_mines: CellCount,
    pub default_bet: f64,
    pub starting_balance: f64,
    pub auto_play_delay_ms: u64,
    pub min_auto_play_delay_ms: u64,
    pub cashout_multiplier: f64,
    pub wallet_connect_delay_ms: u64,
    pub require_wallet_connection: bool,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            min_mines: 1,
            max_mines: None,
            default_mines: DEFAULT_MINES,
            default_bet: DEFAULT_BET,
            starting_balance: DEFAULT_STARTING_BALANCE,
            auto_play_delay_ms: DEFAULT_AUTO_PLAY_DELAY_MS,
            min_auto_play_delay_ms: MIN_AUTO_PLAY_DELAY_MS,
            cashout_multiplier: DEFAULT_CASHOUT_MULTIPLIER,
            wallet_connect_delay_ms: DEFAULT_WALLET_CONNECT_DELAY_MS,
            require_wallet_connection: false,
            seed: None,
        }
    }
}

impl EngineSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).map_err(|err| {
            log::warn!("Could not parse engine settings: {}", err);
            GameError::InvalidSettings("malformed settings document")
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 || self.grid_size > MAX_GRID_SIZE {
            return Err(GameError::InvalidSettings("grid_size must be within 2..=16"));
        }
        if self.min_mines == 0 || self.min_mines > self.max_mines() {
            return Err(GameError::InvalidSettings("min_mines must be within 1..=max_mines"));
        }
        if !(self.default_bet.is_finite() && self.default_bet > 0.0) {
            return Err(GameError::InvalidSettings("default_bet must be positive"));
        }
        if !(self.starting_balance.is_finite() && self.starting_balance >= 0.0) {
            return Err(GameError::InvalidSettings("starting_balance must not be negative"));
        }
        if self.min_auto_play_delay_ms < MIN_AUTO_PLAY_DELAY_MS
            || self.auto_play_delay_ms < self.min_auto_play_delay_ms
        {
            return Err(GameError::InvalidSettings("auto-play delay must be at least 100ms"));
        }
        if !(self.cashout_multiplier.is_finite() && self.cashout_multiplier >= 1.0) {
            return Err(GameError::InvalidSettings("cashout_multiplier must be at least 1.0"));
        }
        Ok(())
    }

    pub fn total_tiles(&self) -> CellCount {
        square(self.grid_size)
    }

    /// Effective upper clamp, never above `grid_size² − 1`.
    pub fn max_mines(&self) -> CellCount {
        let ceiling = self.total_tiles().saturating_sub(1);
        self.max_mines.map_or(ceiling, |max| max.min(ceiling))
    }

    pub fn clamp_mines(&self, mines: CellCount) -> CellCount {
        mines.clamp(self.min_mines, self.max_mines())
    }

    pub fn initial_config(&self) -> GameConfig {
        GameConfig::new_unchecked(
            self.grid_size,
            self.clamp_mines(self.default_mines),
            self.default_bet,
        )
    }

    pub fn auto_play_delay(&self) -> Duration {
        Duration::from_millis(self.auto_play_delay_ms)
    }

    pub fn wallet_connect_delay(&self) -> Duration {
        Duration::from_millis(self.wallet_connect_delay_ms)
    }
}
