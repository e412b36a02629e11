#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round orchestration for the receiver session.
//!
//! The controller owns the real-time schedules between rounds (boot warm-up
//! and the pause after a decode), randomizes the target of every new round and
//! drives the per-tick pipeline: countdown, drift, matching, smoothing and
//! status evaluation. Like every system it only reads snapshots and responds
//! with commands.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use signal_intercept_core::{
    Command, Event, GameTuning, RandomizationTuning, RoundSnapshot, SessionPhase, WaveParams,
    PHASE_PERIOD,
};
use signal_intercept_system_drift::TargetDrift;
use signal_intercept_system_round_timer::RoundTimer;
use signal_intercept_system_signal::SignalMonitor;
use signal_intercept_system_wave_match::{QualitySmoother, WaveMatcher};

/// Real-time countdown between two scheduled steps.
#[derive(Clone, Copy, Debug)]
struct Countdown {
    elapsed: Duration,
    delay: Duration,
}

impl Countdown {
    fn new(delay: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            delay,
        }
    }

    fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.elapsed >= self.delay
    }
}

/// Orchestrates boot, round setup, level advancement and per-tick updates.
#[derive(Debug)]
pub struct LevelController {
    randomization: RandomizationTuning,
    boot_delay: Duration,
    decode_pause: Duration,
    timer: RoundTimer,
    drift: TargetDrift,
    matcher: WaveMatcher,
    smoother: QualitySmoother,
    monitor: SignalMonitor,
    rng: ChaCha8Rng,
    boot: Option<Countdown>,
    advance: Option<Countdown>,
}

impl LevelController {
    /// Creates a controller using the supplied tuning and random seed.
    #[must_use]
    pub fn new(tuning: &GameTuning, seed: u64) -> Self {
        Self {
            randomization: tuning.randomization.clone(),
            boot_delay: tuning.pacing.boot_delay(),
            decode_pause: tuning.pacing.decode_pause(),
            timer: RoundTimer::new(&tuning.timer),
            drift: TargetDrift::new(&tuning.drift, tuning.cadence),
            matcher: WaveMatcher::new(&tuning.matching),
            smoother: QualitySmoother::new(&tuning.smoothing, tuning.cadence),
            monitor: SignalMonitor::new(&tuning.signal),
            rng: ChaCha8Rng::seed_from_u64(seed),
            boot: None,
            advance: None,
        }
    }

    /// Consumes world events and the current snapshot to emit commands.
    pub fn handle(&mut self, events: &[Event], round: &RoundSnapshot, out: &mut Vec<Command>) {
        let mut elapsed: Option<Duration> = None;
        for event in events {
            match event {
                Event::PowerChanged { on: true } => {
                    self.boot = Some(Countdown::new(self.boot_delay));
                    self.advance = None;
                }
                Event::PowerChanged { on: false } => {
                    self.boot = None;
                    self.advance = None;
                }
                Event::TransmissionDecoded { level, .. } => {
                    tracing::debug!(level, "scheduling level advance");
                    self.advance = Some(Countdown::new(self.decode_pause));
                }
                Event::RoundStarted { .. } => self.advance = None,
                Event::TimeAdvanced { dt } => {
                    elapsed = Some(elapsed.unwrap_or_default().saturating_add(*dt));
                }
                _ => {}
            }
        }

        let Some(dt) = elapsed else {
            return;
        };

        if let Some(boot) = self.boot.as_mut() {
            if boot.advance(dt) {
                self.boot = None;
                out.push(Command::CompleteBoot);
                self.begin_round(true, 1, out);
            }
            return;
        }

        if let Some(pause) = self.advance.as_mut() {
            if pause.advance(dt) && round.phase == SessionPhase::LockedPause {
                self.advance = None;
                out.push(Command::AdvanceLevel);
                self.begin_round(false, round.level.saturating_add(1), out);
            }
            return;
        }

        if round.is_round_running() {
            self.update_round(round, dt, out);
        }
    }

    /// Starts a fresh session after the countdown expired.
    ///
    /// Ignored outside the game-over phase.
    pub fn request_restart(&mut self, round: &RoundSnapshot, out: &mut Vec<Command>) {
        if round.phase != SessionPhase::GameOver {
            return;
        }
        self.begin_round(true, 1, out);
    }

    fn begin_round(&mut self, restart: bool, level: u32, out: &mut Vec<Command>) {
        out.push(Command::BeginRound {
            restart,
            target: self.randomized_target(),
            time_budget: self.timer.budget(level, restart),
        });
    }

    fn randomized_target(&mut self) -> WaveParams {
        let frequency = self.sample(
            self.randomization.frequency.min(),
            self.randomization.frequency.max(),
        );
        let amplitude = self.sample(
            self.randomization.amplitude.min(),
            self.randomization.amplitude.max(),
        );
        let phase_offset = self.rng.gen_range(0.0..PHASE_PERIOD);
        WaveParams::new(frequency, amplitude, phase_offset)
    }

    fn sample(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }

    fn update_round(&self, round: &RoundSnapshot, dt: Duration, out: &mut Vec<Command>) {
        let Some(time_left) = self.timer.tick(round.time_left, dt, out) else {
            return;
        };

        let step = self.drift.advance(round.target, round.drift, round.level, dt);
        out.push(Command::DriftTarget {
            target: step.target,
            direction: step.direction,
        });

        let instant = self.matcher.quality(step.target, round.player);
        let smoothed = self.smoother.smooth(round.signal_quality, instant, dt);
        out.push(Command::ReportSignal { instant, smoothed });

        self.monitor.evaluate(smoothed, round.level, time_left, out);
    }
}
