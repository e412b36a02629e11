#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Countdown budgeting and per-tick timer updates for rounds.

use std::time::Duration;

use signal_intercept_core::{Command, TimerTuning};

/// Computes round budgets and counts down the active round.
#[derive(Clone, Debug)]
pub struct RoundTimer {
    tuning: TimerTuning,
}

impl RoundTimer {
    /// Creates a timer from the provided tuning.
    #[must_use]
    pub fn new(tuning: &TimerTuning) -> Self {
        Self {
            tuning: tuning.clone(),
        }
    }

    /// Budget granted to a round played at `level`.
    ///
    /// Restarted sessions always receive the level one budget.
    #[must_use]
    pub fn budget(&self, level: u32, restart: bool) -> Duration {
        let effective_level = if restart { 1 } else { level };
        let penalty = self
            .tuning
            .penalty_per_level()
            .saturating_mul(effective_level);
        self.tuning
            .base_budget()
            .saturating_sub(penalty)
            .max(self.tuning.minimum_budget())
    }

    /// Pushes the countdown update for a tick lasting `dt`.
    ///
    /// Returns the time left after the tick, or `None` when the round expired,
    /// in which case the caller must skip the remaining per-tick updates.
    pub fn tick(
        &self,
        time_left: Duration,
        dt: Duration,
        out: &mut Vec<Command>,
    ) -> Option<Duration> {
        let remaining = time_left.saturating_sub(dt);
        if remaining.is_zero() {
            out.push(Command::ExpireRound);
            None
        } else {
            out.push(Command::SetTimeLeft {
                time_left: remaining,
            });
            Some(remaining)
        }
    }
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::new(&TimerTuning::default())
    }
}
