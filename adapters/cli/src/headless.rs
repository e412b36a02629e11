//! Windowless session driven by an autopilot that chases the target.

use std::time::Duration;

use signal_intercept_core::{Event, RoundSnapshot, SessionPhase};
use signal_intercept_simulation::Simulation;

/// Dial travel per second available to the autopilot.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autopilot {
    frequency_rate: f32,
    amplitude_rate: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            frequency_rate: 4.0,
            amplitude_rate: 30.0,
        }
    }
}

impl Autopilot {
    /// Dial positions one frame closer to the hidden target.
    pub(crate) fn steer(&self, round: &RoundSnapshot, dt: Duration) -> (f32, f32) {
        let seconds = dt.as_secs_f32();
        (
            approach(
                round.player.frequency(),
                round.target.frequency(),
                self.frequency_rate * seconds,
            ),
            approach(
                round.player.amplitude(),
                round.target.amplitude(),
                self.amplitude_rate * seconds,
            ),
        )
    }
}

fn approach(current: f32, goal: f32, max_step: f32) -> f32 {
    let gap = goal - current;
    current + gap.clamp(-max_step, max_step)
}

/// Outcome of a headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct HeadlessSummary {
    pub(crate) frames: u64,
    pub(crate) decoded: u32,
    pub(crate) expired: u32,
    pub(crate) level: u32,
    pub(crate) score: u32,
}

/// Powers the receiver on and plays `frames` frames of `frame_dt` each.
///
/// Expired rounds are re-established immediately.
pub(crate) fn run(
    simulation: &mut Simulation,
    autopilot: Autopilot,
    frames: u64,
    frame_dt: Duration,
) -> HeadlessSummary {
    let mut summary = HeadlessSummary::default();
    let _ = simulation.power_on();

    for _ in 0..frames {
        let round = simulation.snapshot();
        if round.phase == SessionPhase::GameOver {
            let _ = simulation.restart();
        } else if round.is_round_running() {
            let (frequency, amplitude) = autopilot.steer(&round, frame_dt);
            simulation.set_player_frequency(frequency);
            simulation.set_player_amplitude(amplitude);
        }

        for event in simulation.tick(frame_dt) {
            match event {
                Event::TransmissionDecoded { .. } => summary.decoded += 1,
                Event::RoundExpired { .. } => summary.expired += 1,
                _ => {}
            }
        }
        summary.frames += 1;
    }

    let round = simulation.snapshot();
    summary.level = round.level;
    summary.score = round.score;
    summary
}
