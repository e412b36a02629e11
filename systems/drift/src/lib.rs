#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic drift of the hidden target wave.

use std::time::Duration;

use signal_intercept_core::{
    DriftDirection, DriftTuning, Heading, ParamRange, TickCadence, WaveParams,
};

/// Outcome of a single drift step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftStep {
    /// Target parameters after the step.
    pub target: WaveParams,
    /// Direction to use on the following step.
    pub direction: DriftDirection,
}

/// Oscillator nudging the target each tick and reflecting at its bounds.
///
/// A step is applied before the bounds are checked, so a parameter may pass a
/// bound by at most one step before its heading turns back inward.
#[derive(Clone, Debug)]
pub struct TargetDrift {
    tuning: DriftTuning,
    cadence: TickCadence,
}

impl TargetDrift {
    /// Creates a drift oscillator from the tuning surface.
    #[must_use]
    pub fn new(tuning: &DriftTuning, cadence: TickCadence) -> Self {
        Self {
            tuning: tuning.clone(),
            cadence,
        }
    }

    /// Frequency units moved per reference step at the provided level.
    #[must_use]
    pub fn speed(&self, level: u32) -> f32 {
        self.tuning.base_speed + level as f32 * self.tuning.speed_per_level
    }

    /// Advances the target by one tick lasting `dt`.
    #[must_use]
    pub fn advance(
        &self,
        target: WaveParams,
        direction: DriftDirection,
        level: u32,
        dt: Duration,
    ) -> DriftStep {
        let step = self.speed(level) * self.cadence.steps(dt);
        let frequency = target.frequency() + step * direction.frequency().sign();
        let amplitude = target.amplitude()
            + step * self.tuning.amplitude_ratio * direction.amplitude().sign();

        DriftStep {
            target: target.with_frequency(frequency).with_amplitude(amplitude),
            direction: DriftDirection::new(
                reflect(frequency, self.tuning.frequency_bounds, direction.frequency()),
                reflect(amplitude, self.tuning.amplitude_bounds, direction.amplitude()),
            ),
        }
    }
}

impl Default for TargetDrift {
    fn default() -> Self {
        Self::new(&DriftTuning::default(), TickCadence::PerFrame)
    }
}

fn reflect(value: f32, bounds: ParamRange, heading: Heading) -> Heading {
    if value > bounds.max() {
        Heading::Falling
    } else if value < bounds.min() {
        Heading::Rising
    } else {
        heading
    }
}
