//! Payout curve for a round.
//!
//! The multiplier grows linearly with the share of safe tiles revealed, then picks up a
//! quadratic bonus past the halfway mark and a cubic one past 80%. It is not derived from
//! the true odds of the board.

use crate::CellCount;

/// Payout multiplier after `revealed` of `safe_tiles` safe tiles, `0.0` before any reveal.
pub fn multiplier(revealed: CellCount, safe_tiles: CellCount) -> f64 {
    if revealed == 0 || safe_tiles == 0 {
        return 0.0;
    }

    let revealed = f64::from(revealed);
    let safe_tiles = f64::from(safe_tiles);
    let progress = revealed / safe_tiles;

    let mut multiplier = 1.0 + 3.0 * progress;
    if revealed > safe_tiles / 2.0 {
        multiplier += 2.0 * progress.powi(2);
    }
    if revealed > 0.8 * safe_tiles {
        multiplier += progress.powi(3);
    }
    multiplier
}

/// Amount banked by cashing out `bet` after `revealed` safe reveals.
pub fn winnings(bet: f64, revealed: CellCount, safe_tiles: CellCount) -> f64 {
    bet * multiplier(revealed, safe_tiles)
}

/// Chance, in percent, that a reveal on an untouched board is safe.
pub fn win_probability_percent(total_tiles: CellCount, mines: CellCount) -> f64 {
    if total_tiles == 0 {
        return 0.0;
    }
    100.0 * f64::from(total_tiles.saturating_sub(mines)) / f64::from(total_tiles)
}
