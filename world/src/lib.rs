#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Signal Intercept.

use std::time::Duration;

use signal_intercept_core::{
    Command, DriftDirection, Event, RoundGeneration, SessionPhase, SignalStatus, WaveParams,
    AMPLITUDE_RANGE, FREQUENCY_RANGE, INITIAL_MESSAGE,
};

/// Represents the authoritative Signal Intercept session state.
#[derive(Debug)]
pub struct World {
    phase: SessionPhase,
    level: u32,
    score: u32,
    time_left: Duration,
    time_budget: Duration,
    signal_quality: f32,
    instant_quality: f32,
    status: SignalStatus,
    decoded: bool,
    game_over: bool,
    message: String,
    message_pending: bool,
    target: WaveParams,
    player: WaveParams,
    drift: DriftDirection,
    generation: RoundGeneration,
    tick_index: u64,
}

impl World {
    /// Creates a powered-off receiver ready for a session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Off,
            level: 1,
            score: 0,
            time_left: Duration::ZERO,
            time_budget: Duration::ZERO,
            signal_quality: 0.0,
            instant_quality: 0.0,
            status: SignalStatus::Lost,
            decoded: false,
            game_over: false,
            message: INITIAL_MESSAGE.to_owned(),
            message_pending: false,
            target: WaveParams::initial_target(),
            player: WaveParams::initial_player(),
            drift: DriftDirection::default(),
            generation: RoundGeneration::default(),
            tick_index: 0,
        }
    }

    fn round_running(&self) -> bool {
        self.phase == SessionPhase::Active && !self.decoded && !self.game_over
    }

    fn enter_phase(&mut self, phase: SessionPhase, out_events: &mut Vec<Event>) {
        if self.phase != phase {
            self.phase = phase;
            out_events.push(Event::PhaseChanged { phase });
        }
    }

    fn show_status(&mut self, status: SignalStatus, out_events: &mut Vec<Event>) {
        if self.status != status {
            let from = self.status;
            self.status = status;
            out_events.push(Event::StatusChanged { from, to: status });
        }
    }

    fn reset_session(&mut self) {
        self.level = 1;
        self.score = 0;
        self.time_left = Duration::ZERO;
        self.time_budget = Duration::ZERO;
        self.signal_quality = 0.0;
        self.instant_quality = 0.0;
        self.status = SignalStatus::Lost;
        self.decoded = false;
        self.game_over = false;
        self.message = INITIAL_MESSAGE.to_owned();
        self.message_pending = false;
        self.target = WaveParams::initial_target();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that do not fit the current phase are ignored without emitting
/// events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PowerOn => {
            if world.phase != SessionPhase::Off {
                return;
            }
            world.reset_session();
            out_events.push(Event::PowerChanged { on: true });
            world.enter_phase(SessionPhase::Booting, out_events);
        }
        Command::PowerOff => {
            if world.phase == SessionPhase::Off {
                return;
            }
            world.generation = world.generation.next();
            world.message_pending = false;
            world.instant_quality = 0.0;
            out_events.push(Event::PowerChanged { on: false });
            world.enter_phase(SessionPhase::Off, out_events);
        }
        Command::CompleteBoot => {
            if world.phase == SessionPhase::Booting {
                world.enter_phase(SessionPhase::Active, out_events);
            }
        }
        Command::Tick { dt } => {
            if world.phase == SessionPhase::Off {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::AdvanceLevel => {
            if world.phase != SessionPhase::LockedPause {
                return;
            }
            world.level = world.level.saturating_add(1);
            out_events.push(Event::LevelAdvanced { level: world.level });
        }
        Command::BeginRound {
            restart,
            target,
            time_budget,
        } => {
            if matches!(world.phase, SessionPhase::Off | SessionPhase::Booting) {
                return;
            }
            if restart {
                world.level = 1;
                world.score = 0;
            }
            world.signal_quality = 0.0;
            world.instant_quality = 0.0;
            world.decoded = false;
            world.game_over = false;
            world.time_budget = time_budget;
            world.time_left = time_budget;
            world.target = target;
            world.generation = world.generation.next();
            world.message_pending = true;
            world.show_status(SignalStatus::Lost, out_events);
            world.enter_phase(SessionPhase::Active, out_events);
            out_events.push(Event::RoundStarted {
                generation: world.generation,
                level: world.level,
                time_budget,
            });
        }
        Command::SetTimeLeft { time_left } => {
            if world.round_running() {
                world.time_left = world.time_left.min(time_left);
            }
        }
        Command::ExpireRound => {
            if !world.round_running() {
                return;
            }
            world.time_left = Duration::ZERO;
            world.game_over = true;
            world.show_status(SignalStatus::Lost, out_events);
            world.enter_phase(SessionPhase::GameOver, out_events);
            out_events.push(Event::RoundExpired {
                level: world.level,
                score: world.score,
            });
        }
        Command::DriftTarget { target, direction } => {
            if world.round_running() {
                world.target = target;
                world.drift = direction;
            }
        }
        Command::ReportSignal { instant, smoothed } => {
            if world.round_running() {
                world.instant_quality = unit_interval(instant);
                world.signal_quality = unit_interval(smoothed);
            }
        }
        Command::SetStatus { status } => {
            if world.round_running() && status != SignalStatus::Decoded {
                world.show_status(status, out_events);
            }
        }
        Command::DecodeTransmission { award } => {
            if !world.round_running() {
                return;
            }
            world.decoded = true;
            world.score = world.score.saturating_add(award);
            world.show_status(SignalStatus::Decoded, out_events);
            world.enter_phase(SessionPhase::LockedPause, out_events);
            out_events.push(Event::TransmissionDecoded {
                level: world.level,
                award,
                score: world.score,
            });
        }
        Command::DeliverMessage { generation, text } => {
            let current = world.phase != SessionPhase::Off
                && world.message_pending
                && generation == world.generation;
            if current {
                world.message = text;
                world.message_pending = false;
                out_events.push(Event::MessageReceived { generation });
            } else {
                out_events.push(Event::MessageDiscarded { generation });
            }
        }
        Command::SetPlayerFrequency { value } => {
            world.player = world.player.with_frequency(FREQUENCY_RANGE.clamp(value));
        }
        Command::SetPlayerAmplitude { value } => {
            world.player = world.player.with_amplitude(AMPLITUDE_RANGE.clamp(value));
        }
    }
}

fn unit_interval(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use signal_intercept_core::{RoundGeneration, RoundSnapshot, SessionPhase, WaveParams};

    use super::World;

    /// Captures a read-only snapshot of the round state.
    #[must_use]
    pub fn snapshot(world: &World) -> RoundSnapshot {
        RoundSnapshot {
            phase: world.phase,
            level: world.level,
            score: world.score,
            time_left: world.time_left,
            time_budget: world.time_budget,
            signal_quality: world.signal_quality,
            instant_quality: world.instant_quality,
            status: world.status,
            decoded: world.decoded,
            game_over: world.game_over,
            message: world.message.clone(),
            message_pending: world.message_pending,
            target: world.target,
            player: world.player,
            drift: world.drift,
            generation: world.generation,
        }
    }

    /// Phase of the receiver session.
    #[must_use]
    pub fn phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Level currently played.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Generation of the current round.
    #[must_use]
    pub fn generation(world: &World) -> RoundGeneration {
        world.generation
    }

    /// Player dial parameters.
    #[must_use]
    pub fn player(world: &World) -> WaveParams {
        world.player
    }

    /// Hidden target parameters.
    #[must_use]
    pub fn target(world: &World) -> WaveParams {
        world.target
    }

    /// Message currently held for decoding.
    #[must_use]
    pub fn message(world: &World) -> &str {
        &world.message
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
