#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Signal Intercept.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so
//! the adapter depends on macroquad without its default `audio` feature.
//!
//! The receiver buttons use Macroquad's immediate-mode UI module. All
//! UI-specific calls live inside the local `ui` module.

mod ui;

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use signal_intercept_rendering::{
    meter_segment, palette, Color, FrameInput, Overlay, Presentation, RenderingBackend, Scene,
    Trace, GRID_SPACING, METER_SEGMENTS, SCOPE_HEIGHT, SCOPE_WIDTH,
};

use self::ui::{draw_receiver_buttons, ReceiverButtons, ReceiverUiContext};

/// Frequency dial travel per second while a key is held.
const FREQUENCY_RATE: f32 = 4.0;

/// Amplitude dial travel per second while a key is held.
const AMPLITUDE_RATE: f32 = 30.0;

/// Height reserved beneath the scope for the decoder and status panel.
const PANEL_HEIGHT: f32 = 240.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ReceiverInputState {
    power_latched: bool,
    restart_latched: bool,
}

impl ReceiverInputState {
    /// Returns whether the power button was pressed and clears the latch so the
    /// action fires only once.
    pub fn take_power_toggle(&mut self) -> bool {
        let latched = self.power_latched;
        self.power_latched = false;
        latched
    }

    /// Records that the power button was pressed this frame.
    pub fn register_power_toggle(&mut self) {
        self.power_latched = true;
    }

    /// Returns the latched restart request, clearing it so the action fires once.
    pub fn take_restart(&mut self) -> bool {
        let latched = self.restart_latched;
        self.restart_latched = false;
        latched
    }

    /// Records that the restart button was pressed this frame.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }
}

/// Keys observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardState {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `Space` flips the power switch.
    power_toggle: bool,
    /// `R` re-establishes the connection after the signal was lost.
    restart: bool,
    /// `Up` and `Down` held state as a signed direction.
    frequency_direction: f32,
    /// `Right` and `Left` held state as a signed direction.
    amplitude_direction: f32,
}

impl KeyboardState {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            power_toggle: is_key_pressed(KeyCode::Space),
            restart: is_key_pressed(KeyCode::R),
            frequency_direction: axis(is_key_down(KeyCode::Up), is_key_down(KeyCode::Down)),
            amplitude_direction: axis(is_key_down(KeyCode::Right), is_key_down(KeyCode::Left)),
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

fn gather_frame_input(
    keyboard: KeyboardState,
    buttons: &mut ReceiverInputState,
    frame_dt: Duration,
) -> FrameInput {
    let seconds = frame_dt.as_secs_f32();
    FrameInput {
        power_toggle: keyboard.power_toggle | buttons.take_power_toggle(),
        restart: keyboard.restart | buttons.take_restart(),
        frequency_delta: keyboard.frequency_direction * FREQUENCY_RATE * seconds,
        amplitude_delta: keyboard.amplitude_direction * AMPLITUDE_RATE * seconds,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / self.frames,
            avg_render: self.render_accum / self.frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut buttons = ReceiverInputState::default();

            loop {
                let keyboard = KeyboardState::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(keyboard, &mut buttons, frame_dt);

                let simulation_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let simulation_duration = simulation_start.elapsed();

                let render_start = Instant::now();
                let layout = ScreenLayout::new(screen_width, screen_height);
                draw_scope(&scene, &layout);
                draw_overlay(scene.overlay.as_ref(), &layout);
                draw_decoder(&scene, &layout);
                draw_status_panel(&scene, &layout);

                let pressed = draw_receiver_buttons(
                    &mut macroquad::ui::root_ui(),
                    ReceiverUiContext {
                        origin: macroquad::math::Vec2::new(
                            layout.panel_origin.x + layout.panel_size.x - 220.0,
                            layout.panel_origin.y + layout.panel_size.y - 56.0,
                        ),
                        powered: scene.powered,
                        signal_lost: matches!(scene.overlay, Some(Overlay::SignalLost { .. })),
                    },
                );
                let ReceiverButtons { power, restart } = pressed;
                if power {
                    buttons.register_power_toggle();
                }
                if restart {
                    buttons.register_restart();
                }
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_render,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} (10s avg: {:.2}) | sim: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen-space placement of the scope and the panel beneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ScreenLayout {
    scale: f32,
    scope_origin: Vec2,
    panel_origin: Vec2,
    panel_size: Vec2,
}

impl ScreenLayout {
    const MARGIN: f32 = 16.0;

    fn new(screen_width: f32, screen_height: f32) -> Self {
        let available_width = (screen_width - Self::MARGIN * 2.0).max(0.0);
        let available_height = (screen_height - PANEL_HEIGHT - Self::MARGIN * 3.0).max(0.0);
        let scale = (available_width / SCOPE_WIDTH)
            .min(available_height / SCOPE_HEIGHT)
            .max(0.0);
        let scope_size = Vec2::new(SCOPE_WIDTH, SCOPE_HEIGHT) * scale;
        let scope_origin = Vec2::new((screen_width - scope_size.x) * 0.5, Self::MARGIN);
        let panel_origin = Vec2::new(scope_origin.x, scope_origin.y + scope_size.y + Self::MARGIN);

        Self {
            scale,
            scope_origin,
            panel_origin,
            panel_size: Vec2::new(scope_size.x, PANEL_HEIGHT),
        }
    }

    fn scope_size(&self) -> Vec2 {
        Vec2::new(SCOPE_WIDTH, SCOPE_HEIGHT) * self.scale
    }

    fn to_screen(&self, scope_point: Vec2) -> Vec2 {
        let clamped = Vec2::new(scope_point.x, scope_point.y.clamp(0.0, SCOPE_HEIGHT));
        self.scope_origin + clamped * self.scale
    }
}

fn draw_scope(scene: &Scene, layout: &ScreenLayout) {
    let size = layout.scope_size();
    let origin = layout.scope_origin;
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(palette::SCREEN),
    );

    let grid = to_macroquad_color(palette::GRID);
    let mut x = 0.0;
    while x < SCOPE_WIDTH {
        let top = layout.to_screen(Vec2::new(x, 0.0));
        macroquad::shapes::draw_line(top.x, top.y, top.x, top.y + size.y, 1.0, grid);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < SCOPE_HEIGHT {
        let left = layout.to_screen(Vec2::new(0.0, y));
        macroquad::shapes::draw_line(left.x, left.y, left.x + size.x, left.y, 1.0, grid);
        y += GRID_SPACING;
    }

    if let Some(target) = &scene.target {
        draw_trace(target, layout);
    }
    if let Some(player) = &scene.player {
        draw_trace(player, layout);
    }

    if scene.powered {
        let scan = layout.to_screen(Vec2::new(0.0, scene.scanline));
        macroquad::shapes::draw_rectangle(
            scan.x,
            scan.y - 5.0 * layout.scale,
            size.x,
            15.0 * layout.scale,
            to_macroquad_color(palette::PHOSPHOR.with_alpha(0.1)),
        );
    }

    macroquad::shapes::draw_rectangle_lines(
        origin.x,
        origin.y,
        size.x,
        size.y,
        4.0,
        to_macroquad_color(palette::UNLIT),
    );
}

fn draw_trace(trace: &Trace, layout: &ScreenLayout) {
    let color = to_macroquad_color(trace.color);
    let thickness = (trace.thickness * layout.scale).max(1.0);
    for segment in trace.points.windows(2) {
        let from = layout.to_screen(segment[0]);
        let to = layout.to_screen(segment[1]);
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, thickness, color);
    }
}

fn draw_overlay(overlay: Option<&Overlay>, layout: &ScreenLayout) {
    let Some(overlay) = overlay else {
        return;
    };
    let size = layout.scope_size();
    let origin = layout.scope_origin;
    let (backdrop, text) = match overlay {
        Overlay::Offline => (Color::new(0.0, 0.0, 0.0, 0.95), palette::MUTED),
        Overlay::Booting => (Color::new(0.0, 0.0, 0.0, 1.0), palette::PHOSPHOR),
        Overlay::Acquiring => (Color::new(0.0, 0.0, 0.0, 0.4), palette::PHOSPHOR),
        Overlay::SignalLost { .. } => (palette::ALERT.with_alpha(0.4), palette::ALERT),
    };
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(backdrop),
    );

    let lines = overlay.lines();
    let line_height = 32.0;
    let block_height = line_height * lines.len() as f32;
    let mut baseline = origin.y + (size.y - block_height) * 0.5 + line_height;
    for (index, line) in lines.iter().enumerate() {
        let font_size = if index == 0 { 32.0 } else { 20.0 };
        let color = if index == 0 { text } else { Color::new(1.0, 1.0, 1.0, 0.9) };
        draw_centered_text(line, origin.x + size.x * 0.5, baseline, font_size, color);
        baseline += line_height;
    }
}

fn draw_decoder(scene: &Scene, layout: &ScreenLayout) {
    let origin = layout.panel_origin;
    let width = layout.panel_size.x * 0.62;
    let height = layout.panel_size.y;
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        width,
        height,
        to_macroquad_color(Color::new(0.0, 0.0, 0.0, 1.0)),
    );
    macroquad::shapes::draw_rectangle_lines(
        origin.x,
        origin.y,
        width,
        height,
        1.0,
        to_macroquad_color(palette::PHOSPHOR.with_alpha(0.3)),
    );

    let decoder = &scene.decoder;
    if scene.powered {
        draw_centered_text(
            &decoder.text,
            origin.x + width * 0.5,
            origin.y + height * 0.45,
            28.0,
            decoder.color,
        );
    }
    macroquad::text::draw_text(
        &decoder.readout,
        origin.x + 8.0,
        origin.y + height - 10.0,
        16.0,
        to_macroquad_color(palette::PHOSPHOR.with_alpha(0.6)),
    );
}

fn draw_status_panel(scene: &Scene, layout: &ScreenLayout) {
    let panel = &scene.panel;
    let left = layout.panel_origin.x + layout.panel_size.x * 0.65;
    let width = layout.panel_size.x * 0.35;
    let mut baseline = layout.panel_origin.y + 20.0;
    let muted = to_macroquad_color(palette::MUTED);

    macroquad::text::draw_text("SCORE", left, baseline, 16.0, muted);
    macroquad::text::draw_text(
        &panel.score,
        left + 64.0,
        baseline,
        22.0,
        to_macroquad_color(palette::PHOSPHOR),
    );
    macroquad::text::draw_text("LEVEL", left + width * 0.62, baseline, 16.0, muted);
    macroquad::text::draw_text(
        &panel.level,
        left + width * 0.62 + 56.0,
        baseline,
        22.0,
        to_macroquad_color(palette::AMBER),
    );

    baseline += 30.0;
    macroquad::text::draw_text("STATUS:", left, baseline, 16.0, muted);
    if scene.powered {
        macroquad::text::draw_text(
            panel.status,
            left + 72.0,
            baseline,
            18.0,
            to_macroquad_color(panel.status_color),
        );
    }

    baseline += 28.0;
    let critical = panel.time_bar.critical && scene.powered;
    let bar_color = if critical {
        palette::ALERT
    } else {
        palette::PHOSPHOR
    };
    macroquad::text::draw_text("TRANSMISSION WINDOW", left, baseline, 14.0, muted);
    macroquad::text::draw_text(
        &panel.time_left,
        left + width - 56.0,
        baseline,
        14.0,
        to_macroquad_color(if critical { palette::ALERT } else { palette::MUTED }),
    );
    baseline += 8.0;
    macroquad::shapes::draw_rectangle(
        left,
        baseline,
        width,
        6.0,
        to_macroquad_color(palette::SCREEN),
    );
    macroquad::shapes::draw_rectangle(
        left,
        baseline,
        width * panel.time_bar.fraction,
        6.0,
        to_macroquad_color(bar_color),
    );

    baseline += 28.0;
    macroquad::text::draw_text("SIGNAL INTEGRITY", left, baseline, 14.0, muted);
    let percent = format!("{:.0}%", panel.displayed_quality * 100.0);
    macroquad::text::draw_text(&percent, left + width - 40.0, baseline, 14.0, muted);
    baseline += 8.0;
    let segment_width = width / METER_SEGMENTS as f32;
    for index in 0..METER_SEGMENTS {
        macroquad::shapes::draw_rectangle(
            left + index as f32 * segment_width,
            baseline,
            (segment_width - 1.0).max(1.0),
            12.0,
            to_macroquad_color(meter_segment(index, panel.displayed_quality)),
        );
    }

    baseline += 34.0;
    let dials = format!(
        "FREQ {:>5.1}  AMP {:>5.1}",
        panel.player.frequency(),
        panel.player.amplitude()
    );
    macroquad::text::draw_text(&dials, left, baseline, 18.0, muted);
}

fn draw_centered_text(text: &str, center_x: f32, baseline: f32, font_size: f32, color: Color) {
    let dimensions = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
    macroquad::text::draw_text(
        text,
        center_x - dimensions.width * 0.5,
        baseline,
        font_size,
        to_macroquad_color(color),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
