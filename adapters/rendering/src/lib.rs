#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Signal Intercept adapters.
//!
//! Scenes are expressed in scope space: a fixed logical canvas of
//! [`SCOPE_WIDTH`] by [`SCOPE_HEIGHT`] units that backends scale onto their
//! window. Everything a backend needs to draw a frame is precomputed here so
//! the backend only maps shapes and text onto its primitives.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use signal_intercept_core::{RoundSnapshot, SessionPhase, SignalStatus, WaveParams};

/// Logical width of the oscilloscope screen.
pub const SCOPE_WIDTH: f32 = 640.0;

/// Logical height of the oscilloscope screen.
pub const SCOPE_HEIGHT: f32 = 288.0;

/// Spacing of the oscilloscope graticule.
pub const GRID_SPACING: f32 = 40.0;

/// Number of segments in the signal integrity meter.
pub const METER_SEGMENTS: usize = 20;

/// Remaining time below which the countdown is flagged critical.
pub const CRITICAL_TIME: Duration = Duration::from_secs(10);

/// Scope time advanced per 60 Hz frame.
const SCOPE_TIME_PER_FRAME: f32 = 0.05;

/// Sweep speed of the CRT scanline in scope units per unit of scope time.
const SCANLINE_SPEED: f32 = 80.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Colors of the receiver front panel.
pub mod palette {
    use super::Color;

    /// Phosphor green used for the target trace and healthy readouts.
    pub const PHOSPHOR: Color = Color::from_rgb_u8(57, 255, 20);
    /// Amber used for the level readout and the upper meter segments.
    pub const AMBER: Color = Color::from_rgb_u8(245, 158, 11);
    /// Red used for alerts.
    pub const ALERT: Color = Color::from_rgb_u8(239, 68, 68);
    /// Trace drawn for the player's dials.
    pub const PLAYER_TRACE: Color = Color::new(1.0, 1.0, 1.0, 0.9);
    /// Screen background.
    pub const SCREEN: Color = Color::from_rgb_u8(5, 10, 5);
    /// Graticule lines.
    pub const GRID: Color = Color::new(26.0 / 255.0, 66.0 / 255.0, 26.0 / 255.0, 0.3);
    /// Unlit meter segments and inactive labels.
    pub const UNLIT: Color = Color::from_rgb_u8(26, 26, 26);
    /// Secondary text.
    pub const MUTED: Color = Color::from_rgb_u8(115, 115, 115);
    /// Cabinet behind the screen.
    pub const CABINET: Color = Color::from_rgb_u8(17, 17, 17);
}

/// Color used to render the status label.
#[must_use]
pub fn status_color(status: SignalStatus) -> Color {
    match status {
        SignalStatus::Lost => palette::ALERT,
        SignalStatus::Weak
        | SignalStatus::Strong
        | SignalStatus::Decrypting
        | SignalStatus::Decoded => palette::PHOSPHOR,
    }
}

/// Jitter range of the target trace for the provided quality and level.
#[must_use]
pub fn noise_range(quality: f32, level: u32) -> f32 {
    let base = (1.0 - quality.clamp(0.0, 1.0)) * 20.0;
    let level_noise = level.saturating_sub(1) as f32 * 2.0;
    base + level_noise
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the power switch was pressed on this frame.
    pub power_toggle: bool,
    /// Whether a restart was requested on this frame.
    pub restart: bool,
    /// Requested change of the frequency dial.
    pub frequency_delta: f32,
    /// Requested change of the amplitude dial.
    pub amplitude_delta: f32,
}

/// Free-running time base of the oscilloscope sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScopeClock {
    time: f32,
}

impl ScopeClock {
    /// Advances the sweep by the elapsed frame time.
    pub fn advance(&mut self, dt: Duration) {
        self.time += SCOPE_TIME_PER_FRAME * dt.as_secs_f32() * 60.0;
    }

    /// Phase shared by both traces, in radians.
    #[must_use]
    pub fn phase(&self) -> f32 {
        self.time * 0.5
    }

    /// Vertical position of the CRT scanline.
    #[must_use]
    pub fn scanline(&self) -> f32 {
        (self.time * SCANLINE_SPEED).rem_euclid(SCOPE_HEIGHT)
    }
}

/// Polyline drawn on the scope.
#[derive(Clone, Debug, PartialEq)]
pub struct Trace {
    /// Points in scope space, one per horizontal unit.
    pub points: Vec<Vec2>,
    /// Stroke color.
    pub color: Color,
    /// Stroke thickness in scope units.
    pub thickness: f32,
}

impl Trace {
    /// Samples a sine wave across the scope.
    ///
    /// `jitter` must return values in `-0.5..0.5`; they are scaled by
    /// `noise` and added to every sample.
    #[must_use]
    pub fn sample<J>(
        params: WaveParams,
        phase: f32,
        noise: f32,
        mut jitter: J,
        color: Color,
        thickness: f32,
    ) -> Self
    where
        J: FnMut() -> f32,
    {
        let center = SCOPE_HEIGHT * 0.5;
        let frequency = params.frequency() / 50.0;
        let points = (0..SCOPE_WIDTH as u32)
            .map(|column| {
                let x = column as f32;
                let offset = if noise > 0.0 { jitter() * noise } else { 0.0 };
                let y = center + (x * frequency + phase).sin() * params.amplitude() + offset;
                Vec2::new(x, y)
            })
            .collect();
        Self {
            points,
            color,
            thickness,
        }
    }
}

/// Full-screen message covering the scope.
#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    /// Receiver switched off.
    Offline,
    /// Boot sequence running.
    Booting,
    /// Mission message still in flight.
    Acquiring,
    /// Countdown expired.
    SignalLost {
        /// Final session score.
        score: u32,
    },
}

impl Overlay {
    /// Overlay shown for the round, if any.
    #[must_use]
    pub fn for_round(round: &RoundSnapshot) -> Option<Self> {
        match round.phase {
            SessionPhase::Off => Some(Self::Offline),
            SessionPhase::Booting => Some(Self::Booting),
            SessionPhase::GameOver => Some(Self::SignalLost { score: round.score }),
            SessionPhase::Active | SessionPhase::LockedPause if round.message_pending => {
                Some(Self::Acquiring)
            }
            SessionPhase::Active | SessionPhase::LockedPause => None,
        }
    }

    /// Headline and detail lines of the overlay.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Offline => vec!["SYSTEM OFFLINE".to_owned(), "WAITING FOR INPUT".to_owned()],
            Self::Booting => vec!["BOOT SEQUENCE INITIATED...".to_owned()],
            Self::Acquiring => vec!["ACQUIRING TARGET SIGNAL...".to_owned()],
            Self::SignalLost { score } => vec![
                "SIGNAL LOST".to_owned(),
                "TRANSMISSION TERMINATED".to_owned(),
                format!("FINAL SCORE {score}"),
                "PRESS R TO RE-ESTABLISH CONNECTION".to_owned(),
            ],
        }
    }
}

/// Countdown bar beneath the status readout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeBar {
    /// Filled fraction in `0.0..=1.0`.
    pub fraction: f32,
    /// Whether less than [`CRITICAL_TIME`] remains.
    pub critical: bool,
}

impl TimeBar {
    /// Builds the bar for the provided countdown.
    #[must_use]
    pub fn new(time_left: Duration, budget: Duration) -> Self {
        let fraction = if budget.is_zero() {
            0.0
        } else {
            (time_left.as_secs_f32() / budget.as_secs_f32()).clamp(0.0, 1.0)
        };
        Self {
            fraction,
            critical: time_left < CRITICAL_TIME,
        }
    }
}

/// Color of a lit meter segment.
#[must_use]
pub fn meter_segment(index: usize, quality: f32) -> Color {
    if (index as f32 / METER_SEGMENTS as f32) >= quality {
        palette::UNLIT
    } else if index > 16 {
        palette::ALERT
    } else if index > 12 {
        palette::AMBER
    } else {
        palette::PHOSPHOR
    }
}

/// Text rendered on the receiver panel.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelView {
    /// Zero-padded score.
    pub score: String,
    /// Zero-padded level.
    pub level: String,
    /// Status label.
    pub status: &'static str,
    /// Status label color.
    pub status_color: Color,
    /// Remaining time with one decimal.
    pub time_left: String,
    /// Countdown bar.
    pub time_bar: TimeBar,
    /// Quality shown by the meter and its percentage label.
    pub displayed_quality: f32,
    /// Current dial readouts.
    pub player: WaveParams,
}

impl PanelView {
    /// Builds the panel for the provided round.
    #[must_use]
    pub fn from_round(round: &RoundSnapshot) -> Self {
        Self {
            score: format!("{:06}", round.score),
            level: format!("{:02}", round.level),
            status: round.status.label(),
            status_color: status_color(round.status),
            time_left: format!("{:.1}s", round.time_left.as_secs_f32()),
            time_bar: TimeBar::new(round.time_left, round.time_budget),
            displayed_quality: displayed_quality(round),
            player: round.player,
        }
    }
}

/// Quality shown on screen; zero unless a round is on screen.
#[must_use]
pub fn displayed_quality(round: &RoundSnapshot) -> f32 {
    match round.phase {
        SessionPhase::Active | SessionPhase::LockedPause => round.signal_quality,
        SessionPhase::Off | SessionPhase::Booting | SessionPhase::GameOver => 0.0,
    }
}

/// Decoder unit readout beneath the scope.
#[derive(Clone, Debug, PartialEq)]
pub struct DecoderView {
    /// Message as currently readable.
    pub text: String,
    /// Matrix readout line.
    pub readout: String,
    /// Text color, brightening with quality.
    pub color: Color,
}

impl DecoderView {
    /// Creates the decoder readout.
    #[must_use]
    pub fn new(text: String, readout: String, quality: f32, decoded: bool) -> Self {
        let color = if decoded {
            palette::PHOSPHOR
        } else {
            palette::PHOSPHOR.with_alpha(0.4 + quality.clamp(0.0, 1.0) * 0.6)
        };
        Self {
            text,
            readout,
            color,
        }
    }
}

/// Scene description combining the scope, panel and decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Target trace, hidden while the receiver is off.
    pub target: Option<Trace>,
    /// Player trace, hidden while the receiver is off.
    pub player: Option<Trace>,
    /// Vertical position of the CRT scanline.
    pub scanline: f32,
    /// Overlay covering the scope.
    pub overlay: Option<Overlay>,
    /// Receiver panel.
    pub panel: PanelView,
    /// Decoder unit.
    pub decoder: DecoderView,
    /// Whether the receiver is powered.
    pub powered: bool,
}

impl Scene {
    /// Builds a scene for the round using the provided sweep and jitter.
    #[must_use]
    pub fn from_round<J>(
        round: &RoundSnapshot,
        clock: &ScopeClock,
        decoder: DecoderView,
        jitter: J,
    ) -> Self
    where
        J: FnMut() -> f32,
    {
        let powered = round.phase != SessionPhase::Off;
        let quality = displayed_quality(round);
        let phase = clock.phase();
        let (target, player) = if powered {
            let target_alpha = 0.4 + quality * 0.5;
            let target = Trace::sample(
                round.target,
                phase + round.target.phase_offset(),
                noise_range(quality, round.level),
                jitter,
                palette::PHOSPHOR.with_alpha(target_alpha),
                3.0,
            );
            let player = Trace::sample(
                round.player,
                phase,
                0.0,
                || 0.0,
                palette::PLAYER_TRACE,
                2.0,
            );
            (Some(target), Some(player))
        } else {
            (None, None)
        };

        Self {
            target,
            player,
            scanline: clock.scanline(),
            overlay: Overlay::for_round(round),
            panel: PanelView::from_round(round),
            decoder,
            powered,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Signal Intercept scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and replaces the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_intercept_core::{DriftDirection, RoundGeneration};

    fn round(phase: SessionPhase) -> RoundSnapshot {
        RoundSnapshot {
            phase,
            level: 3,
            score: 1_234,
            time_left: Duration::from_millis(8_300),
            time_budget: Duration::from_secs(54),
            signal_quality: 0.5,
            instant_quality: 0.6,
            status: SignalStatus::Strong,
            decoded: false,
            game_over: phase == SessionPhase::GameOver,
            message: "ASSET COMPROMISED. ABORT MISSION.".to_owned(),
            message_pending: false,
            target: WaveParams::new(10.0, 50.0, 1.0),
            player: WaveParams::new(9.0, 40.0, 0.0),
            drift: DriftDirection::default(),
            generation: RoundGeneration::new(3),
        }
    }

    fn decoder_view() -> DecoderView {
        DecoderView::new("A".to_owned(), "R".to_owned(), 0.5, false)
    }

    #[test]
    fn noise_grows_with_level_and_poor_quality() {
        assert_eq!(noise_range(1.0, 1), 0.0);
        assert_eq!(noise_range(0.0, 1), 20.0);
        assert_eq!(noise_range(0.5, 4), 16.0);
        assert_eq!(noise_range(1.0, 0), 0.0);
    }

    #[test]
    fn panel_formats_readouts() {
        let panel = PanelView::from_round(&round(SessionPhase::Active));

        assert_eq!(panel.score, "001234");
        assert_eq!(panel.level, "03");
        assert_eq!(panel.status, "STRONG SIGNAL");
        assert_eq!(panel.time_left, "8.3s");
        assert!(panel.time_bar.critical);
        assert!((panel.time_bar.fraction - 8.3 / 54.0).abs() < 1e-6);
    }

    #[test]
    fn quality_is_hidden_outside_rounds() {
        assert_eq!(displayed_quality(&round(SessionPhase::GameOver)), 0.0);
        assert_eq!(displayed_quality(&round(SessionPhase::Active)), 0.5);
    }

    #[test]
    fn overlays_follow_session_phase() {
        assert_eq!(
            Overlay::for_round(&round(SessionPhase::Off)),
            Some(Overlay::Offline)
        );
        assert_eq!(Overlay::for_round(&round(SessionPhase::Active)), None);

        let mut pending = round(SessionPhase::Active);
        pending.message_pending = true;
        assert_eq!(Overlay::for_round(&pending), Some(Overlay::Acquiring));

        let lost = Overlay::for_round(&round(SessionPhase::GameOver)).expect("overlay");
        assert!(lost.lines().contains(&"FINAL SCORE 1234".to_owned()));
    }

    #[test]
    fn clean_trace_follows_sine() {
        let trace = Trace::sample(
            WaveParams::new(10.0, 50.0, 0.0),
            0.0,
            0.0,
            || 0.4,
            palette::PLAYER_TRACE,
            2.0,
        );

        assert_eq!(trace.points.len(), SCOPE_WIDTH as usize);
        assert_eq!(trace.points[0], Vec2::new(0.0, SCOPE_HEIGHT * 0.5));
        let expected = SCOPE_HEIGHT * 0.5 + (5.0_f32 * 10.0 / 50.0).sin() * 50.0;
        assert!((trace.points[5].y - expected).abs() < 1e-4);
    }

    #[test]
    fn powered_off_scene_hides_traces() {
        let scene = Scene::from_round(
            &round(SessionPhase::Off),
            &ScopeClock::default(),
            decoder_view(),
            || 0.0,
        );

        assert!(scene.target.is_none());
        assert!(!scene.powered);
        assert_eq!(scene.overlay, Some(Overlay::Offline));
    }

    #[test]
    fn meter_lights_segments_below_quality() {
        assert_eq!(meter_segment(0, 0.5), palette::PHOSPHOR);
        assert_eq!(meter_segment(10, 0.5), palette::UNLIT);
        assert_eq!(meter_segment(14, 1.0), palette::AMBER);
        assert_eq!(meter_segment(19, 1.0), palette::ALERT);
    }

    #[test]
    fn scope_clock_advances_per_reference_frame() {
        let mut clock = ScopeClock::default();
        clock.advance(Duration::from_secs_f32(1.0 / 60.0));
        assert!((clock.phase() - 0.025).abs() < 1e-5);
    }
}
