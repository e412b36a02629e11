//! Tuning surface controlling every adjustable constant of a session.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ParamRange;

/// Aggregated tuning knobs for matching, drift, timing and pacing.
///
/// Every table falls back to its defaults when omitted from a configuration
/// file, so an empty document yields the stock game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    /// Decides how per-tick constants relate to elapsed wall-clock time.
    pub cadence: TickCadence,
    /// Tolerances used when comparing the player wave with the target.
    pub matching: MatchTuning,
    /// Low-pass filter applied to the instantaneous match quality.
    pub smoothing: SmoothingTuning,
    /// Status thresholds and lock scoring.
    pub signal: SignalTuning,
    /// Target drift speed and reflection bounds.
    pub drift: DriftTuning,
    /// Countdown budget per round.
    pub timer: TimerTuning,
    /// Fixed presentation delays.
    pub pacing: PacingTuning,
    /// Ranges used when a round randomizes its target.
    pub randomization: RandomizationTuning,
}

/// Relationship between a simulation tick and elapsed time.
///
/// `PerFrame` applies smoothing and drift once per rendered frame regardless of
/// its duration, so faster displays converge faster. `FrameRateIndependent`
/// scales both by `dt * reference_hz`; at exactly `1 / reference_hz` seconds per
/// frame the two modes agree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum TickCadence {
    /// One full step per frame.
    #[default]
    PerFrame,
    /// Steps scaled by elapsed time relative to a reference frame rate.
    FrameRateIndependent {
        /// Frame rate at which one tick equals one full step.
        reference_hz: f32,
    },
}

impl TickCadence {
    /// Number of reference steps represented by a tick lasting `dt`.
    ///
    /// Non-positive reference rates fall back to one step per frame.
    #[must_use]
    pub fn steps(self, dt: Duration) -> f32 {
        match self {
            Self::PerFrame => 1.0,
            Self::FrameRateIndependent { reference_hz } if reference_hz > 0.0 => {
                dt.as_secs_f32() * reference_hz
            }
            Self::FrameRateIndependent { .. } => 1.0,
        }
    }
}

/// Tolerances for the wave matcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    /// Frequency difference at which the frequency score reaches zero.
    pub frequency_tolerance: f32,
    /// Amplitude difference at which the amplitude score reaches zero.
    pub amplitude_tolerance: f32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            frequency_tolerance: 3.0,
            amplitude_tolerance: 30.0,
        }
    }
}

/// Exponential smoothing of the signal quality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingTuning {
    /// Fraction of the gap closed per step; lower values make locks slower to acquire.
    pub rate: f32,
}

impl Default for SmoothingTuning {
    fn default() -> Self {
        Self { rate: 0.1 }
    }
}

/// Status thresholds evaluated against the smoothed quality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalTuning {
    /// Quality strictly above which the transmission decodes.
    pub decode_threshold: f32,
    /// Quality strictly above which the status reads decrypting.
    pub decrypting_threshold: f32,
    /// Quality strictly above which the status reads strong.
    pub strong_threshold: f32,
    /// Quality strictly above which the status reads weak.
    pub weak_threshold: f32,
    /// Points awarded per level on decode, before the time bonus.
    pub award_per_level: u32,
}

impl Default for SignalTuning {
    fn default() -> Self {
        Self {
            decode_threshold: 0.96,
            decrypting_threshold: 0.8,
            strong_threshold: 0.4,
            weak_threshold: 0.1,
            award_per_level: 100,
        }
    }
}

/// Target drift parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftTuning {
    /// Frequency step at level zero; raising this makes every level harder.
    pub base_speed: f32,
    /// Additional frequency step per level.
    pub speed_per_level: f32,
    /// Multiplier converting the frequency step into an amplitude step.
    pub amplitude_ratio: f32,
    /// Frequency band the target reflects inside.
    pub frequency_bounds: ParamRange,
    /// Amplitude band the target reflects inside.
    pub amplitude_bounds: ParamRange,
}

impl Default for DriftTuning {
    fn default() -> Self {
        Self {
            base_speed: 0.01,
            speed_per_level: 0.005,
            amplitude_ratio: 5.0,
            frequency_bounds: ParamRange::new(2.0, 18.0),
            amplitude_bounds: ParamRange::new(20.0, 90.0),
        }
    }
}

/// Countdown budget parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerTuning {
    /// Budget before the level penalty is subtracted.
    pub base_budget_ms: u64,
    /// Hard minimum budget regardless of level.
    pub minimum_budget_ms: u64,
    /// Budget removed per level.
    pub penalty_per_level_ms: u64,
}

impl TimerTuning {
    /// Budget before the level penalty is subtracted.
    #[must_use]
    pub fn base_budget(&self) -> Duration {
        Duration::from_millis(self.base_budget_ms)
    }

    /// Hard minimum budget regardless of level.
    #[must_use]
    pub fn minimum_budget(&self) -> Duration {
        Duration::from_millis(self.minimum_budget_ms)
    }

    /// Budget removed per level.
    #[must_use]
    pub fn penalty_per_level(&self) -> Duration {
        Duration::from_millis(self.penalty_per_level_ms)
    }
}

impl Default for TimerTuning {
    fn default() -> Self {
        Self {
            base_budget_ms: 60_000,
            minimum_budget_ms: 20_000,
            penalty_per_level_ms: 2_000,
        }
    }
}

/// Presentation delays driven by real time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingTuning {
    /// Warm-up time between power-on and the first round.
    pub boot_delay_ms: u64,
    /// Pause between a decode and the next level.
    pub decode_pause_ms: u64,
}

impl PacingTuning {
    /// Warm-up time between power-on and the first round.
    #[must_use]
    pub fn boot_delay(&self) -> Duration {
        Duration::from_millis(self.boot_delay_ms)
    }

    /// Pause between a decode and the next level.
    #[must_use]
    pub fn decode_pause(&self) -> Duration {
        Duration::from_millis(self.decode_pause_ms)
    }
}

impl Default for PacingTuning {
    fn default() -> Self {
        Self {
            boot_delay_ms: 1_500,
            decode_pause_ms: 4_000,
        }
    }
}

/// Ranges sampled when a round randomizes its target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationTuning {
    /// Range for the target frequency.
    pub frequency: ParamRange,
    /// Range for the target amplitude.
    pub amplitude: ParamRange,
}

impl Default for RandomizationTuning {
    fn default() -> Self {
        Self {
            frequency: ParamRange::new(5.0, 15.0),
            amplitude: ParamRange::new(30.0, 80.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let tuning: GameTuning = toml::from_str("").expect("parse");
        assert_eq!(tuning, GameTuning::default());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let tuning: GameTuning = toml::from_str(
            r#"
            [smoothing]
            rate = 0.25

            [cadence]
            mode = "frame-rate-independent"
            reference_hz = 60.0
            "#,
        )
        .expect("parse");

        assert_eq!(tuning.smoothing.rate, 0.25);
        assert_eq!(
            tuning.cadence,
            TickCadence::FrameRateIndependent { reference_hz: 60.0 }
        );
        assert_eq!(tuning.signal, SignalTuning::default());
    }

    #[test]
    fn cadence_steps_scale_with_elapsed_time() {
        let cadence = TickCadence::FrameRateIndependent { reference_hz: 50.0 };
        assert!((cadence.steps(Duration::from_millis(40)) - 2.0).abs() < 1e-6);
        assert_eq!(TickCadence::PerFrame.steps(Duration::from_secs(3)), 1.0);
        let degenerate = TickCadence::FrameRateIndependent { reference_hz: 0.0 };
        assert_eq!(degenerate.steps(Duration::from_millis(40)), 1.0);
    }

    #[test]
    fn default_budgets_match_stock_game() {
        let timer = TimerTuning::default();
        assert_eq!(timer.base_budget(), Duration::from_secs(60));
        assert_eq!(timer.minimum_budget(), Duration::from_secs(20));
        assert_eq!(PacingTuning::default().boot_delay(), Duration::from_millis(1_500));
    }
}
