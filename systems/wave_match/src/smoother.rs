use std::time::Duration;

use signal_intercept_core::{SmoothingTuning, TickCadence};

/// First-order low-pass filter turning instantaneous quality into a stable
/// signal reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySmoother {
    rate: f32,
    cadence: TickCadence,
}

impl QualitySmoother {
    /// Creates a smoother from the tuning surface.
    #[must_use]
    pub fn new(tuning: &SmoothingTuning, cadence: TickCadence) -> Self {
        Self {
            rate: tuning.rate.clamp(0.0, 1.0),
            cadence,
        }
    }

    /// Fraction of the remaining gap closed by a tick lasting `dt`.
    #[must_use]
    pub fn factor(&self, dt: Duration) -> f32 {
        match self.cadence {
            TickCadence::PerFrame => self.rate,
            cadence => 1.0 - (1.0 - self.rate).powf(cadence.steps(dt)),
        }
    }

    /// Moves `previous` toward `instant` for a tick lasting `dt`.
    #[must_use]
    pub fn smooth(&self, previous: f32, instant: f32, dt: Duration) -> f32 {
        smooth(previous, instant, self.factor(dt)).clamp(0.0, 1.0)
    }
}

impl Default for QualitySmoother {
    fn default() -> Self {
        Self::new(&SmoothingTuning::default(), TickCadence::PerFrame)
    }
}

/// Single exponential moving average step.
#[must_use]
pub fn smooth(previous: f32, instant: f32, rate: f32) -> f32 {
    previous + (instant - previous) * rate
}
