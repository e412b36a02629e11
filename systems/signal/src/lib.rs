#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Signal status classification and decode detection.

use std::time::Duration;

use signal_intercept_core::{Command, SignalStatus, SignalTuning};

/// Maps smoothed signal quality onto receiver statuses and detects decodes.
#[derive(Clone, Debug)]
pub struct SignalMonitor {
    tuning: SignalTuning,
}

impl SignalMonitor {
    /// Creates a monitor from the provided thresholds.
    #[must_use]
    pub fn new(tuning: &SignalTuning) -> Self {
        Self {
            tuning: tuning.clone(),
        }
    }

    /// Status shown for a smoothed quality while the round is still running.
    ///
    /// Every threshold is strict, so a quality sitting exactly on a boundary
    /// reads as the lower status.
    #[must_use]
    pub fn classify(&self, quality: f32) -> SignalStatus {
        if quality > self.tuning.decrypting_threshold {
            SignalStatus::Decrypting
        } else if quality > self.tuning.strong_threshold {
            SignalStatus::Strong
        } else if quality > self.tuning.weak_threshold {
            SignalStatus::Weak
        } else {
            SignalStatus::Lost
        }
    }

    /// Reports whether the quality is high enough to decode the transmission.
    #[must_use]
    pub fn is_lock(&self, quality: f32) -> bool {
        quality > self.tuning.decode_threshold
    }

    /// Points awarded for a decode at `level` with `time_left` remaining.
    #[must_use]
    pub fn award(&self, level: u32, time_left: Duration) -> u32 {
        lock_award(level, time_left, self.tuning.award_per_level)
    }

    /// Emits the status change or decode command for a running round.
    ///
    /// A lock produces a single [`Command::DecodeTransmission`]; the world
    /// switches the status to decoded when it applies it.
    pub fn evaluate(
        &self,
        quality: f32,
        level: u32,
        time_left: Duration,
        out: &mut Vec<Command>,
    ) {
        if self.is_lock(quality) {
            out.push(Command::DecodeTransmission {
                award: self.award(level, time_left),
            });
        } else {
            out.push(Command::SetStatus {
                status: self.classify(quality),
            });
        }
    }
}

impl Default for SignalMonitor {
    fn default() -> Self {
        Self::new(&SignalTuning::default())
    }
}

/// Score for a decode: a per-level base plus one point per 100 ms remaining.
#[must_use]
pub fn lock_award(level: u32, time_left: Duration, award_per_level: u32) -> u32 {
    let bonus = u32::try_from(time_left.as_millis() / 100).unwrap_or(u32::MAX);
    award_per_level.saturating_mul(level).saturating_add(bonus)
}
