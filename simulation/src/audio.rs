//! Audio collaborator contracts and the session resource that owns them.

use std::time::Duration;

use signal_intercept_core::RoundSnapshot;

/// Continuous parameters of the receiver hum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioParams {
    /// Carrier tone frequency in hertz, following the player's frequency dial.
    pub carrier_hz: f32,
    /// Carrier gain, rising with the instantaneous match quality.
    pub carrier_gain: f32,
    /// Static noise gain, falling as the match improves.
    pub noise_gain: f32,
}

impl AudioParams {
    /// Derives the hum from the unsmoothed quality and the frequency dial.
    #[must_use]
    pub fn from_signal(instant_quality: f32, player_frequency: f32) -> Self {
        let quality = instant_quality.clamp(0.0, 1.0);
        Self {
            carrier_hz: 100.0 + player_frequency * 50.0,
            carrier_gain: quality * 0.2,
            noise_gain: 0.15 * (1.0 - quality * 0.8),
        }
    }

    /// Derives the hum from a round snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &RoundSnapshot) -> Self {
        Self::from_signal(snapshot.instant_quality, snapshot.player.frequency())
    }
}

/// Oscillator shape used by a one-shot cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    /// Pure sine tone.
    Sine,
    /// Harsh sawtooth tone.
    Sawtooth,
}

/// One-shot sound played on round outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Transmission decoded.
    Success,
    /// Countdown expired.
    Failure,
}

/// Synthesis recipe for a [`Cue`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CueTone {
    /// Oscillator shape.
    pub waveform: Waveform,
    /// Frequency at the start of the sweep.
    pub start_hz: f32,
    /// Frequency at the end of the sweep.
    pub end_hz: f32,
    /// Duration of the frequency sweep.
    pub sweep: Duration,
    /// Initial gain, decaying towards silence.
    pub gain: f32,
    /// Total length of the cue.
    pub length: Duration,
}

impl Cue {
    /// Synthesis recipe for the cue.
    #[must_use]
    pub const fn tone(self) -> CueTone {
        match self {
            Self::Success => CueTone {
                waveform: Waveform::Sine,
                start_hz: 880.0,
                end_hz: 1_760.0,
                sweep: Duration::from_millis(100),
                gain: 0.3,
                length: Duration::from_millis(500),
            },
            Self::Failure => CueTone {
                waveform: Waveform::Sawtooth,
                start_hz: 100.0,
                end_hz: 50.0,
                sweep: Duration::from_millis(500),
                gain: 0.5,
                length: Duration::from_millis(500),
            },
        }
    }
}

/// Output stream opened by an [`AudioDevice`].
pub trait AudioSink {
    /// Updates the continuous hum.
    fn apply(&mut self, params: AudioParams);

    /// Plays a one-shot cue over the hum.
    fn cue(&mut self, cue: Cue);

    /// Silences the stream and releases its resources.
    fn stop(&mut self);
}

/// Platform capability able to open audio streams.
pub trait AudioDevice {
    /// Opens a new stream, or `None` when audio is unavailable.
    fn open(&self) -> Option<Box<dyn AudioSink>>;
}

/// Device for platforms without audio output.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudioDevice;

impl AudioDevice for NullAudioDevice {
    fn open(&self) -> Option<Box<dyn AudioSink>> {
        None
    }
}

/// Audio stream held for the duration of a powered-on session.
///
/// Dropping the session stops its sink.
pub struct AudioSession {
    sink: Box<dyn AudioSink>,
    params: Option<AudioParams>,
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl AudioSession {
    /// Opens a session on the device, degrading to `None` without audio.
    #[must_use]
    pub fn acquire(device: &dyn AudioDevice) -> Option<Self> {
        let Some(sink) = device.open() else {
            tracing::debug!("audio unavailable, continuing silently");
            return None;
        };
        Some(Self { sink, params: None })
    }

    /// Updates the hum, skipping the sink when nothing changed.
    pub fn apply(&mut self, params: AudioParams) {
        if self.params == Some(params) {
            return;
        }
        self.params = Some(params);
        self.sink.apply(params);
    }

    /// Plays a one-shot cue.
    pub fn cue(&mut self, cue: Cue) {
        self.sink.cue(cue);
    }

    /// Most recent hum parameters sent to the sink.
    #[must_use]
    pub fn params(&self) -> Option<AudioParams> {
        self.params
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
