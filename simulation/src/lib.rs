#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game clock driving a Signal Intercept session.
//!
//! [`Simulation`] wires the authoritative world to the level controller, the
//! message uplink and the audio session. Adapters feed it player input and
//! call [`Simulation::tick`] once per frame with the real elapsed time.

mod audio;

use std::time::Duration;

use signal_intercept_core::{Command, Event, GameTuning, RoundSnapshot, SessionPhase};
use signal_intercept_system_level_control::LevelController;
use signal_intercept_system_transmission::Uplink;
use signal_intercept_world::{self as world, query, World};

pub use audio::{
    AudioDevice, AudioParams, AudioSession, AudioSink, Cue, CueTone, NullAudioDevice, Waveform,
};

/// Receiver session advanced one frame at a time.
pub struct Simulation {
    world: World,
    controller: LevelController,
    uplink: Uplink,
    audio_device: Box<dyn AudioDevice>,
    audio: Option<AudioSession>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("controller", &self.controller)
            .field("uplink", &self.uplink)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a powered-off receiver.
    #[must_use]
    pub fn new(
        tuning: &GameTuning,
        seed: u64,
        uplink: Uplink,
        audio_device: Box<dyn AudioDevice>,
    ) -> Self {
        Self {
            world: World::new(),
            controller: LevelController::new(tuning, seed),
            uplink,
            audio_device,
            audio: None,
        }
    }

    /// Switches the receiver on. Ignored when already powered.
    pub fn power_on(&mut self) -> Vec<Event> {
        self.submit(vec![Command::PowerOn])
    }

    /// Switches the receiver off, releasing audio. Ignored when already off.
    pub fn power_off(&mut self) -> Vec<Event> {
        self.submit(vec![Command::PowerOff])
    }

    /// Flips the power switch.
    pub fn toggle_power(&mut self) -> Vec<Event> {
        if query::phase(&self.world) == SessionPhase::Off {
            self.power_on()
        } else {
            self.power_off()
        }
    }

    /// Starts a fresh session after the countdown expired.
    pub fn restart(&mut self) -> Vec<Event> {
        let mut commands = Vec::new();
        self.controller
            .request_restart(&query::snapshot(&self.world), &mut commands);
        self.submit(commands)
    }

    /// Moves the frequency dial; out-of-range values are clamped.
    pub fn set_player_frequency(&mut self, value: f32) {
        let _ = self.submit(vec![Command::SetPlayerFrequency { value }]);
    }

    /// Moves the amplitude dial; out-of-range values are clamped.
    pub fn set_player_amplitude(&mut self, value: f32) {
        let _ = self.submit(vec![Command::SetPlayerAmplitude { value }]);
    }

    /// Advances the session by `dt`, returning every event it produced.
    ///
    /// Messages that arrived since the previous frame are delivered first.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut commands: Vec<Command> = self
            .uplink
            .poll()
            .into_iter()
            .map(|delivery| Command::DeliverMessage {
                generation: delivery.generation,
                text: delivery.text,
            })
            .collect();
        commands.push(Command::Tick { dt });

        let events = self.submit(commands);

        if let Some(session) = self.audio.as_mut() {
            session.apply(AudioParams::from_snapshot(&query::snapshot(&self.world)));
        }
        events
    }

    /// Captures the current round state.
    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        query::snapshot(&self.world)
    }

    /// Hum parameters last sent to the audio session, if one is open.
    #[must_use]
    pub fn audio_params(&self) -> Option<AudioParams> {
        self.audio.as_ref().and_then(AudioSession::params)
    }

    /// Reports whether an audio session is currently held.
    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    fn submit(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut pending = commands;
        let mut log = Vec::new();
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            let snapshot = query::snapshot(&self.world);
            self.controller.handle(&events, &snapshot, &mut pending);
            self.react(&events);
            log.extend(events);
        }
        log
    }

    fn react(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PowerChanged { on: true } => {
                    tracing::info!("receiver powered on");
                    self.audio = AudioSession::acquire(self.audio_device.as_ref());
                }
                Event::PowerChanged { on: false } => {
                    tracing::info!("receiver powered off");
                    self.audio = None;
                }
                Event::RoundStarted {
                    generation,
                    level,
                    time_budget,
                } => {
                    tracing::info!(
                        level,
                        generation = generation.get(),
                        budget_ms = time_budget.as_millis() as u64,
                        "round started"
                    );
                    self.uplink.request(*generation);
                }
                Event::TransmissionDecoded {
                    level,
                    award,
                    score,
                } => {
                    tracing::info!(level, award, score, "transmission decoded");
                    self.play(Cue::Success);
                }
                Event::RoundExpired { level, score } => {
                    tracing::info!(level, score, "signal lost, countdown expired");
                    self.play(Cue::Failure);
                }
                Event::MessageReceived { generation } => {
                    tracing::debug!(generation = generation.get(), "message received");
                }
                Event::MessageDiscarded { generation } => {
                    tracing::debug!(generation = generation.get(), "discarding stale message");
                }
                _ => {}
            }
        }
    }

    fn play(&mut self, cue: Cue) {
        if let Some(session) = self.audio.as_mut() {
            session.cue(cue);
        }
    }
}
