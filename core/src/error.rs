use thiserror::Error;

/// Why a configuration was refused.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    /// Mine count must leave at least one safe tile and be at least one.
    MineCount,
    /// Bet must be a positive, finite amount.
    BetAmount,
    /// Board side must fit the coordinate type and hold at least two tiles.
    GridSize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Invalid configuration: {0:?}")]
    InvalidConfiguration(ConfigProblem),
    #[error("Insufficient balance: bet {required} exceeds wallet {available}")]
    InsufficientBalance { required: f64, available: f64 },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Wallet is not connected")]
    WalletNotConnected,
    #[error("Invalid settings: {0}")]
    InvalidSettings(&'static str),
    #[error("Could not store snapshot: {0}")]
    Storage(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
