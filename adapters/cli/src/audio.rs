//! Audio device that reports the receiver hum through `tracing`.
//!
//! The windowed backend is built without sound output, so cues and hum
//! changes are surfaced as log records instead.

use signal_intercept_simulation::{AudioDevice, AudioParams, AudioSink, Cue};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TracingAudioDevice;

impl AudioDevice for TracingAudioDevice {
    fn open(&self) -> Option<Box<dyn AudioSink>> {
        tracing::debug!("audio stream opened");
        Some(Box::new(TracingSink))
    }
}

#[derive(Debug)]
struct TracingSink;

impl AudioSink for TracingSink {
    fn apply(&mut self, params: AudioParams) {
        tracing::trace!(
            carrier_hz = params.carrier_hz,
            carrier_gain = params.carrier_gain,
            noise_gain = params.noise_gain,
            "hum"
        );
    }

    fn cue(&mut self, cue: Cue) {
        let tone = cue.tone();
        tracing::debug!(
            ?cue,
            waveform = ?tone.waveform,
            start_hz = tone.start_hz,
            end_hz = tone.end_hz,
            "cue"
        );
    }

    fn stop(&mut self) {
        tracing::debug!("audio stream closed");
    }
}
