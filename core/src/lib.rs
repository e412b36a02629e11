#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Signal Intercept engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! [`RoundSnapshot`] values, and respond exclusively with new command batches.

mod tuning;

use std::{f32::consts::TAU, time::Duration};

use serde::{Deserialize, Serialize};

pub use tuning::{
    DriftTuning, GameTuning, MatchTuning, PacingTuning, RandomizationTuning, SignalTuning,
    SmoothingTuning, TickCadence, TimerTuning,
};

/// Message shown while the first transmission of a session is still in flight.
pub const INITIAL_MESSAGE: &str = "INITIALIZING...";

/// Range accepted for the player's frequency dial.
pub const FREQUENCY_RANGE: ParamRange = ParamRange::new(1.0, 20.0);

/// Range accepted for the player's amplitude dial.
pub const AMPLITUDE_RANGE: ParamRange = ParamRange::new(10.0, 100.0);

/// Upper bound (exclusive) of a randomized phase offset, in radians.
pub const PHASE_PERIOD: f32 = TAU;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Switches the receiver on, entering the boot sequence.
    PowerOn,
    /// Switches the receiver off from any phase.
    PowerOff,
    /// Ends the boot sequence so that rounds may run.
    CompleteBoot,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Increments the level ahead of the next round.
    AdvanceLevel,
    /// Starts a fresh round with the provided hidden target.
    BeginRound {
        /// Whether the round resets level and score to their initial values.
        restart: bool,
        /// Randomized target the player must match.
        target: WaveParams,
        /// Countdown budget granted to the round.
        time_budget: Duration,
    },
    /// Stores the countdown value computed by the round timer.
    SetTimeLeft {
        /// Remaining time in the active round.
        time_left: Duration,
    },
    /// Ends the active round because its countdown reached zero.
    ExpireRound,
    /// Replaces the hidden target after a drift step.
    DriftTarget {
        /// Target parameters after drifting.
        target: WaveParams,
        /// Direction the target will drift on the following tick.
        direction: DriftDirection,
    },
    /// Records the outcome of the matching and smoothing steps.
    ReportSignal {
        /// Unsmoothed match quality for the current tick.
        instant: f32,
        /// Smoothed signal quality for the current tick.
        smoothed: f32,
    },
    /// Updates the displayed signal status.
    SetStatus {
        /// Status derived from the smoothed signal quality.
        status: SignalStatus,
    },
    /// Marks the transmission as decoded and awards points.
    DecodeTransmission {
        /// Points added to the session score.
        award: u32,
    },
    /// Delivers a mission message requested for a round.
    DeliverMessage {
        /// Generation of the round that requested the message.
        generation: RoundGeneration,
        /// Text to display once decoded.
        text: String,
    },
    /// Stores a new value for the player's frequency dial.
    SetPlayerFrequency {
        /// Requested value; clamped into [`FREQUENCY_RANGE`].
        value: f32,
    },
    /// Stores a new value for the player's amplitude dial.
    SetPlayerAmplitude {
        /// Requested value; clamped into [`AMPLITUDE_RANGE`].
        value: f32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Reports that the receiver was switched on or off.
    PowerChanged {
        /// Whether the receiver is now powered.
        on: bool,
    },
    /// Announces that the session moved into a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: SessionPhase,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of real time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a new round began.
    RoundStarted {
        /// Generation assigned to the round.
        generation: RoundGeneration,
        /// Level the round is played at.
        level: u32,
        /// Countdown budget granted to the round.
        time_budget: Duration,
    },
    /// Confirms that the level counter increased.
    LevelAdvanced {
        /// Level after the increment.
        level: u32,
    },
    /// Reports a change of the displayed signal status.
    StatusChanged {
        /// Status shown before the change.
        from: SignalStatus,
        /// Status shown after the change.
        to: SignalStatus,
    },
    /// Confirms that the player locked onto the target.
    TransmissionDecoded {
        /// Level at which the transmission was decoded.
        level: u32,
        /// Points awarded for the decode.
        award: u32,
        /// Session score after the award.
        score: u32,
    },
    /// Reports that the countdown ran out before a lock.
    RoundExpired {
        /// Level at which the round expired.
        level: u32,
        /// Final session score.
        score: u32,
    },
    /// Confirms that a message was stored for the current round.
    MessageReceived {
        /// Generation the message belongs to.
        generation: RoundGeneration,
    },
    /// Reports that a message arrived for a round that already ended.
    MessageDiscarded {
        /// Stale generation carried by the delivery.
        generation: RoundGeneration,
    },
}

/// Closed interval describing valid values for a wave parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    min: f32,
    max: f32,
}

impl ParamRange {
    /// Creates a new range spanning `min..=max`.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Distance between the bounds.
    #[must_use]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Reports whether the value lies inside the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamps the value into the range. Non-finite input collapses to the
    /// nearest meaningful bound, `NaN` to the lower one.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    /// Maps a unit fraction in `0.0..=1.0` onto the range.
    #[must_use]
    pub fn lerp(&self, fraction: f32) -> f32 {
        self.min + self.span() * fraction
    }
}

/// Parameters describing a sine wave drawn on the oscilloscope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    frequency: f32,
    amplitude: f32,
    phase_offset: f32,
}

impl WaveParams {
    /// Creates a new wave description.
    #[must_use]
    pub const fn new(frequency: f32, amplitude: f32, phase_offset: f32) -> Self {
        Self {
            frequency,
            amplitude,
            phase_offset,
        }
    }

    /// Hidden target used before the first round is randomized.
    #[must_use]
    pub const fn initial_target() -> Self {
        Self::new(10.0, 50.0, 0.0)
    }

    /// Dial position the player starts a session with.
    #[must_use]
    pub const fn initial_player() -> Self {
        Self::new(5.0, 20.0, 0.0)
    }

    /// Frequency in cycles per width-scale unit.
    #[must_use]
    pub const fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Peak amplitude in pixels.
    #[must_use]
    pub const fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Phase offset in radians.
    #[must_use]
    pub const fn phase_offset(&self) -> f32 {
        self.phase_offset
    }

    /// Returns a copy with the frequency replaced.
    #[must_use]
    pub const fn with_frequency(self, frequency: f32) -> Self {
        Self { frequency, ..self }
    }

    /// Returns a copy with the amplitude replaced.
    #[must_use]
    pub const fn with_amplitude(self, amplitude: f32) -> Self {
        Self { amplitude, ..self }
    }
}

/// Direction of travel for a single drifting parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    /// Parameter increases on the next step.
    #[default]
    Rising,
    /// Parameter decreases on the next step.
    Falling,
}

impl Heading {
    /// Sign applied to a drift step.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Rising => 1.0,
            Self::Falling => -1.0,
        }
    }

    /// Opposite heading.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Rising => Self::Falling,
            Self::Falling => Self::Rising,
        }
    }
}

/// Drift headings for the target's frequency and amplitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriftDirection {
    frequency: Heading,
    amplitude: Heading,
}

impl DriftDirection {
    /// Creates a drift direction from explicit headings.
    #[must_use]
    pub const fn new(frequency: Heading, amplitude: Heading) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }

    /// Heading of the frequency component.
    #[must_use]
    pub const fn frequency(&self) -> Heading {
        self.frequency
    }

    /// Heading of the amplitude component.
    #[must_use]
    pub const fn amplitude(&self) -> Heading {
        self.amplitude
    }
}

/// Top-level phase of a receiver session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Receiver is switched off.
    #[default]
    Off,
    /// Receiver is warming up; nothing runs yet.
    Booting,
    /// A round is being played.
    Active,
    /// A transmission was decoded; the next level starts after a pause.
    LockedPause,
    /// The countdown expired; an explicit restart is required.
    GameOver,
}

/// Discrete reading derived from the smoothed signal quality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalStatus {
    /// No usable signal.
    #[default]
    Lost,
    /// Faint signal.
    Weak,
    /// Clear signal, not yet decrypting.
    Strong,
    /// Close enough that decryption is in progress.
    Decrypting,
    /// Lock acquired; the message is readable.
    Decoded,
}

impl SignalStatus {
    /// Human-readable label shown on the receiver panel.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lost => "NO SIGNAL",
            Self::Weak => "WEAK SIGNAL",
            Self::Strong => "STRONG SIGNAL",
            Self::Decrypting => "DECRYPTING...",
            Self::Decoded => "MESSAGE RECEIVED",
        }
    }
}

/// Counter identifying a round, used to reject stale message deliveries.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoundGeneration(u64);

impl RoundGeneration {
    /// Creates a generation with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the generation.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Generation that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Immutable representation of the round state used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Phase of the receiver session.
    pub phase: SessionPhase,
    /// Level currently played, starting at 1.
    pub level: u32,
    /// Accumulated session score.
    pub score: u32,
    /// Countdown remaining in the round.
    pub time_left: Duration,
    /// Countdown budget granted when the round started.
    pub time_budget: Duration,
    /// Smoothed signal quality in `0.0..=1.0`.
    pub signal_quality: f32,
    /// Unsmoothed quality of the latest tick, consumed by audio.
    pub instant_quality: f32,
    /// Status derived from the smoothed quality.
    pub status: SignalStatus,
    /// Whether the round's transmission was decoded.
    pub decoded: bool,
    /// Whether the countdown expired.
    pub game_over: bool,
    /// Message to decode.
    pub message: String,
    /// Whether a message request for the current round is still in flight.
    pub message_pending: bool,
    /// Hidden target parameters.
    pub target: WaveParams,
    /// Player dial parameters.
    pub player: WaveParams,
    /// Direction the target drifts on the next tick.
    pub drift: DriftDirection,
    /// Generation of the current round.
    pub generation: RoundGeneration,
}

impl RoundSnapshot {
    /// Reports whether the per-tick gameplay update should run.
    #[must_use]
    pub fn is_round_running(&self) -> bool {
        self.phase == SessionPhase::Active && !self.decoded && !self.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let snapshot = RoundSnapshot {
            phase: SessionPhase::Active,
            level: 3,
            score: 742,
            time_left: Duration::from_millis(41_250),
            time_budget: Duration::from_secs(54),
            signal_quality: 0.62,
            instant_quality: 0.7,
            status: SignalStatus::Strong,
            decoded: false,
            game_over: false,
            message: "USE CODEPHRASE: RED HORIZON.".to_owned(),
            message_pending: false,
            target: WaveParams::new(12.5, 44.0, 1.2),
            player: WaveParams::initial_player(),
            drift: DriftDirection::new(Heading::Falling, Heading::Rising),
            generation: RoundGeneration::new(7),
        };
        assert_round_trip(&snapshot);
    }

    #[test]
    fn range_clamp_handles_out_of_bounds_and_nan() {
        assert_eq!(FREQUENCY_RANGE.clamp(0.2), 1.0);
        assert_eq!(FREQUENCY_RANGE.clamp(25.0), 20.0);
        assert_eq!(FREQUENCY_RANGE.clamp(7.5), 7.5);
        assert_eq!(AMPLITUDE_RANGE.clamp(f32::NAN), 10.0);
        assert_eq!(AMPLITUDE_RANGE.clamp(f32::INFINITY), 100.0);
        assert_eq!(AMPLITUDE_RANGE.clamp(f32::NEG_INFINITY), 10.0);
    }

    #[test]
    fn range_lerp_spans_bounds() {
        let range = ParamRange::new(5.0, 15.0);
        assert_eq!(range.lerp(0.0), 5.0);
        assert_eq!(range.lerp(0.5), 10.0);
        assert_eq!(range.lerp(1.0), 15.0);
    }

    #[test]
    fn heading_reversal_flips_sign() {
        assert_eq!(Heading::Rising.sign(), 1.0);
        assert_eq!(Heading::Rising.reversed(), Heading::Falling);
        assert_eq!(Heading::Falling.reversed().sign(), 1.0);
    }

    #[test]
    fn status_labels_match_receiver_panel() {
        assert_eq!(SignalStatus::Lost.label(), "NO SIGNAL");
        assert_eq!(SignalStatus::Decrypting.label(), "DECRYPTING...");
        assert_eq!(SignalStatus::Decoded.label(), "MESSAGE RECEIVED");
    }

    #[test]
    fn generation_advances_monotonically() {
        let first = RoundGeneration::default();
        assert!(first.next() > first);
        assert_eq!(first.next().get(), 1);
    }
}
