use core::time::Duration;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoPlayConfig {
    pub enabled: bool,
    /// Armed for the current round; only meaningful while a round is in progress.
    pub running: bool,
    pub delay_ms: u64,
    pub cashout_multiplier: f64,
}

impl AutoPlayConfig {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            enabled: false,
            running: false,
            delay_ms: settings.auto_play_delay_ms,
            cashout_multiplier: settings.cashout_multiplier,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// What one auto-play tick decided to do.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AutoPlayAction {
    Reveal(Coord2),
    CashOut,
}

/// Result of polling the auto-play timer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum AutoPlayStep {
    /// Auto-play is off, disarmed, or there is no round in progress.
    Inactive,
    /// Armed but the next tick is not due yet.
    Waiting,
    Revealed(Coord2, RevealOutcome),
    CashedOut(f64),
}

/// Picks the next move for a round in progress.
///
/// The stop rule compares current winnings with the *next* reveal's look-ahead payout
/// scaled by the target multiplier, so for any target of at least 1.0 it only fires when
/// the payout curve stalls. The board-cleared fallback cashes out when nothing safe is left.
pub fn next_action(round: &Round, cashout_multiplier: f64, rng: &mut impl Rng) -> AutoPlayAction {
    let state = round.state();
    if state.current_winnings >= state.potential_next_winnings * cashout_multiplier {
        return AutoPlayAction::CashOut;
    }

    round
        .grid()
        .hidden_safe_positions()
        .choose(rng)
        .copied()
        .map_or(AutoPlayAction::CashOut, AutoPlayAction::Reveal)
}

/// Proof that a tick was taken from the schedule; stale once the schedule is re-armed or
/// cancelled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TickToken(u64);

/// Single pending tick with a generation counter for cancellation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSchedule {
    generation: u64,
    due: Option<Instant>,
}

impl TickSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Instant, delay: Duration) -> TickToken {
        self.generation += 1;
        self.due = Some(now + delay);
        TickToken(self.generation)
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.due
    }

    /// Takes the pending tick if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<TickToken> {
        match self.due {
            Some(at) if now >= at => {
                self.due = None;
                Some(TickToken(self.generation))
            }
            _ => None,
        }
    }

    pub fn is_current(&self, token: TickToken) -> bool {
        token.0 == self.generation
    }
}
