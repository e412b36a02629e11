#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Signal Intercept receiver.

mod audio;
mod config;
mod gemini;
mod headless;

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use signal_intercept_core::RoundSnapshot;
use signal_intercept_rendering::{
    palette, DecoderView, FrameInput, Presentation, RenderingBackend, Scene, ScopeClock,
};
use signal_intercept_rendering_macroquad::MacroquadBackend;
use signal_intercept_simulation::{NullAudioDevice, Simulation};
use signal_intercept_system_decoder::{matrix_readout, Decoder};
use signal_intercept_system_transmission::{Dispatch, Uplink};
use tracing_subscriber::EnvFilter;

use crate::{
    audio::TracingAudioDevice,
    config::{CliConfig, UplinkConfig},
    gemini::GeminiSource,
    headless::Autopilot,
};

const DECODER_SALT: u64 = 0x5eed_dec0;
const JITTER_SALT: u64 = 0x5eed_0d1f;

/// Command-line arguments accepted by the receiver.
#[derive(Debug, Parser)]
#[command(name = "signal-intercept", about = "Tune the receiver and intercept the transmission")]
struct CliArgs {
    /// Optional TOML file with `[tuning.*]` and `[uplink]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for target randomization, fallback messages and decoder glyphs.
    #[arg(long)]
    seed: Option<u64>,
    /// Run without a window, letting an autopilot chase the target.
    #[arg(long)]
    headless: bool,
    /// Number of frames simulated in headless mode.
    #[arg(long, default_value_t = 3_600)]
    frames: u64,
    /// Frame length in milliseconds used in headless mode.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Render as fast as possible instead of synchronising with the display.
    #[arg(long)]
    no_vsync: bool,
    /// Print frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Key for the hosted message service; fallback phrases are used without it.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

/// Entry point for the Signal Intercept command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = CliConfig::load(args.config.as_deref())?;
    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!(seed, headless = args.headless, "starting receiver");

    let uplink = build_uplink(args.api_key.as_deref(), &config.uplink, seed)?;

    if args.headless {
        let mut simulation =
            Simulation::new(&config.tuning, seed, uplink, Box::new(NullAudioDevice));
        let summary = headless::run(
            &mut simulation,
            Autopilot::default(),
            args.frames,
            Duration::from_millis(args.frame_ms),
        );
        tracing::info!(
            frames = summary.frames,
            decoded = summary.decoded,
            expired = summary.expired,
            level = summary.level,
            score = summary.score,
            "headless session finished"
        );
        return Ok(());
    }

    let simulation = Simulation::new(&config.tuning, seed, uplink, Box::new(TracingAudioDevice));
    run_windowed(simulation, seed, &args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn build_uplink(api_key: Option<&str>, config: &UplinkConfig, seed: u64) -> Result<Uplink> {
    match api_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => {
            let source = GeminiSource::new(config, key.to_owned())
                .context("failed to build message service client")?;
            tracing::info!(model = %config.model, "message service configured");
            Ok(Uplink::new(Arc::new(source), Dispatch::Threaded, seed))
        }
        None => {
            tracing::info!("no API key configured, using fallback transmissions");
            Ok(Uplink::offline(seed))
        }
    }
}

fn run_windowed(mut simulation: Simulation, seed: u64, args: &CliArgs) -> Result<()> {
    let backend = MacroquadBackend::default()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    let mut frame = FrameState {
        decoder: Decoder::new(seed ^ DECODER_SALT),
        jitter: ChaCha8Rng::seed_from_u64(seed ^ JITTER_SALT),
        clock: ScopeClock::default(),
    };
    let initial = frame.scene(&simulation.snapshot());

    backend.run(
        Presentation::new("Signal Intercept", palette::CABINET, initial),
        move |dt, input, scene| {
            apply_input(&mut simulation, input);
            let _ = simulation.tick(dt);
            frame.clock.advance(dt);
            *scene = frame.scene(&simulation.snapshot());
        },
    )
}

/// Presentation state that lives outside the simulation.
struct FrameState {
    decoder: Decoder,
    jitter: ChaCha8Rng,
    clock: ScopeClock,
}

impl FrameState {
    fn scene(&mut self, round: &RoundSnapshot) -> Scene {
        let text = self
            .decoder
            .render(&round.message, round.signal_quality, round.decoded);
        let decoder = DecoderView::new(
            text,
            matrix_readout(round.signal_quality, round.decoded),
            round.signal_quality,
            round.decoded,
        );
        let jitter = &mut self.jitter;
        Scene::from_round(round, &self.clock, decoder, || jitter.gen_range(-0.5..0.5))
    }
}

fn apply_input(simulation: &mut Simulation, input: FrameInput) {
    if input.power_toggle {
        let _ = simulation.toggle_power();
    }
    if input.restart {
        let _ = simulation.restart();
    }
    let player = simulation.snapshot().player;
    if input.frequency_delta != 0.0 {
        simulation.set_player_frequency(player.frequency() + input.frequency_delta);
    }
    if input.amplitude_delta != 0.0 {
        simulation.set_player_amplitude(player.amplitude() + input.amplitude_delta);
    }
}
