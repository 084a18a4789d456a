#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Whack-a-Penguin.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature, so requested sound cues are logged and flashed on
//! screen instead of played.
//!
//! The adapter uses Macroquad's immediate-mode UI module for the game-over
//! panel. All UI-specific calls live inside the local `ui` module.

mod ui;

use self::ui::{draw_game_over_ui, GameOverUiContext, GameOverUiResult};
use anyhow::Result;
use glam::Vec2;
use macroquad::math::Vec2 as MacroquadVec2;
use macroquad::{
    color::{BLACK, WHITE},
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use whack_core::{Cue, Variant, TARGET_HALF_HEIGHT, TARGET_HALF_WIDTH};
use whack_rendering::{
    Color, FrameInput, FrameSimulationBreakdown, Presentation, RenderingBackend, Scene,
    SlotPresentation,
};

/// Radius of a drawn hole in world units.
const HOLE_RADIUS: f32 = 46.0;
/// Vertical offset between the hole centre and the drawn hole.
const HOLE_DROP: f32 = 12.0;
/// Width of the lighter rim drawn around each hole.
const HOLE_RIM_WIDTH: f32 = 6.0;
const HOLE_RIM_LIGHTEN: f32 = 0.25;
/// How long a cue flash stays on screen.
const CUE_FLASH_DURATION: Duration = Duration::from_millis(200);
/// Font size of the score label in world units.
const SCORE_FONT_SIZE: f32 = 44.0;

/// Tracks UI-sourced restart requests so they can be merged with keyboard input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct RestartInputState {
    restart_latched: bool,
}

impl RestartInputState {
    /// Returns whether the UI requested a new game and clears the latch so the
    /// action fires only once.
    pub fn take_restart(&mut self) -> bool {
        let latched = self.restart_latched;
        self.restart_latched = false;
        latched
    }

    /// Combines a latched button press with the restart shortcut, consuming the latch.
    pub fn merge_keyboard(&mut self, key_pressed: bool) -> bool {
        let latched = self.take_restart();
        latched || key_pressed
    }

    /// Records that the new game button was pressed this frame.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `R` starts a new game.
    restart: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let restart = is_key_pressed(KeyCode::R);

        Self {
            quit_requested,
            restart,
        }
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
    scene_population: Duration,
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
    scene_population_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_scene_population: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);

        self.simulation_accum += breakdown.simulation;
        self.scene_population_accum += breakdown.scene_population;
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
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_scene_population: self.scene_population_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.scene_population_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

/// Short on-screen flash standing in for a sound cue.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CueFlash {
    cue: Cue,
    remaining: Duration,
}

impl CueFlash {
    fn new(cue: Cue) -> Self {
        Self {
            cue,
            remaining: CUE_FLASH_DURATION,
        }
    }

    /// Ages the flash, returning `None` once it has faded out.
    fn tick(self, dt: Duration) -> Option<Self> {
        let remaining = self.remaining.checked_sub(dt)?;
        if remaining.is_zero() {
            return None;
        }
        Some(Self { remaining, ..self })
    }

    fn color(&self) -> Color {
        let alpha = 0.35 * self.remaining.as_secs_f32() / CUE_FLASH_DURATION.as_secs_f32();
        match self.cue {
            Cue::Whack => Color::new(1.0, 0.85, 0.2, alpha),
            Cue::WhackBad => Color::new(0.9, 0.1, 0.1, alpha),
        }
    }
}

/// Drains the cues requested since the last frame and returns the flash to show.
fn consume_cues(scene: &mut Scene, flash: Option<CueFlash>, dt: Duration) -> Option<CueFlash> {
    let mut flash = flash.and_then(|flash| flash.tick(dt));
    for cue in scene.cues.drain(..) {
        log::info!("cue: {}", cue.name());
        flash = Some(CueFlash::new(cue));
    }
    flash
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static,
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
            window_width: scene.field.width as i32,
            window_height: scene.field.height as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut restart_input = RestartInputState::default();
            let mut flash = None;

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let metrics_before = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let restart = restart_input.merge_keyboard(keyboard.restart);
                let frame_input = gather_frame_input(&scene, &metrics_before, restart);

                let simulation_breakdown = update_scene(frame_dt, frame_input, &mut scene);
                flash = consume_cues(&mut scene, flash, frame_dt);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);

                let render_start = Instant::now();
                draw_field(&scene, &metrics);
                draw_slots(&scene, &metrics);
                draw_score(&scene, &metrics);
                if let Some(flash) = flash {
                    draw_flash(flash, &metrics);
                }
                if scene.game_over {
                    let mut game_over_ui = macroquad::ui::root_ui();
                    let GameOverUiResult { restart_pressed } = draw_game_over_ui(
                        &mut game_over_ui,
                        game_over_panel(&scene, &metrics),
                    );
                    if restart_pressed {
                        restart_input.register_restart();
                    }
                }
                let render_duration = render_start.elapsed();

                let frame_breakdown = FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_breakdown.simulation,
                    scene_population: simulation_breakdown.scene_population,
                    render: render_duration,
                };

                let fps_metrics = fps_counter.record_frame(frame_breakdown);
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_scene_population,
                        avg_render,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} (10s avg: {:.2}) | sim: {:>6.2}ms scene: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_scene_population.as_secs_f64() * 1_000.0,
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

/// Maps the play field onto the window, preserving its aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let field = scene.field;
        let scale = if field.width <= f32::EPSILON || field.height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / field.width).min(screen_height / field.height)
        };

        let offset_x = ((screen_width - field.width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - field.height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }

    fn to_world(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            (position.x - self.offset_x) / self.scale,
            (position.y - self.offset_y) / self.scale,
        )
    }
}

fn gather_frame_input(scene: &Scene, metrics: &SceneMetrics, restart: bool) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let clicked = is_mouse_button_pressed(MouseButton::Left);
    gather_frame_input_from_observations(
        scene,
        metrics,
        Vec2::new(cursor_x, cursor_y),
        clicked,
        restart,
    )
}

fn gather_frame_input_from_observations(
    scene: &Scene,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    clicked: bool,
    restart: bool,
) -> FrameInput {
    let mut input = FrameInput {
        restart,
        ..FrameInput::default()
    };

    if !clicked || metrics.scale <= f32::EPSILON {
        return input;
    }

    let world_position = metrics.to_world(cursor_position);
    if scene.field.contains(world_position) {
        input.tap = Some(world_position);
    }

    input
}

fn draw_field(scene: &Scene, metrics: &SceneMetrics) {
    let origin = metrics.to_screen(Vec2::ZERO);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        scene.field.width * metrics.scale,
        scene.field.height * metrics.scale,
        to_macroquad_color(scene.field.grass_color),
    );
}

fn draw_slots(scene: &Scene, metrics: &SceneMetrics) {
    let hole_color = to_macroquad_color(scene.field.hole_color);
    let rim_color = to_macroquad_color(rim_color(scene.field.hole_color));
    for slot in &scene.slots {
        let hole = metrics.to_screen(slot.position + Vec2::new(0.0, HOLE_DROP));
        macroquad::shapes::draw_circle(
            hole.x,
            hole.y,
            (HOLE_RADIUS + HOLE_RIM_WIDTH) * metrics.scale,
            rim_color,
        );
        macroquad::shapes::draw_circle(hole.x, hole.y, HOLE_RADIUS * metrics.scale, hole_color);

        if let Some((x, y, width, height)) = actor_rectangle(slot, metrics) {
            let (body, belly) = actor_palette(slot.variant);
            macroquad::shapes::draw_rectangle(x, y, width, height, to_macroquad_color(body));
            let inset = width * 0.2;
            macroquad::shapes::draw_rectangle(
                x + inset,
                y + height * 0.3,
                width - 2.0 * inset,
                height * 0.7,
                to_macroquad_color(belly),
            );
        }
    }
}

/// Packed earth around a hole, a lighter shade of the hole itself.
fn rim_color(hole: Color) -> Color {
    hole.lighten(HOLE_RIM_LIGHTEN)
}

/// Screen-space rectangle of the visible part of an actor, cropped at its hole.
fn actor_rectangle(
    slot: &SlotPresentation,
    metrics: &SceneMetrics,
) -> Option<(f32, f32, f32, f32)> {
    if !slot.actor_visible() {
        return None;
    }

    let center = slot.actor_center();
    let half_width = TARGET_HALF_WIDTH * slot.scale;
    let half_height = TARGET_HALF_HEIGHT * slot.scale;
    let top = center.y - half_height;
    let bottom = (center.y + half_height).min(slot.crop_line());
    if bottom <= top {
        return None;
    }

    let corner = metrics.to_screen(Vec2::new(center.x - half_width, top));
    Some((
        corner.x,
        corner.y,
        2.0 * half_width * metrics.scale,
        (bottom - top) * metrics.scale,
    ))
}

fn actor_palette(variant: Variant) -> (Color, Color) {
    match variant {
        Variant::Friendly => (
            Color::from_rgb_u8(40, 70, 140),
            Color::from_rgb_u8(245, 245, 250),
        ),
        Variant::Enemy => (
            Color::from_rgb_u8(30, 30, 34),
            Color::from_rgb_u8(190, 40, 40),
        ),
    }
}

fn draw_score(scene: &Scene, metrics: &SceneMetrics) {
    let anchor = metrics.to_screen(Vec2::new(8.0, scene.field.height - 12.0));
    let _ = macroquad::text::draw_text(
        &scene.score_label(),
        anchor.x,
        anchor.y,
        SCORE_FONT_SIZE * metrics.scale,
        WHITE,
    );
}

fn draw_flash(flash: CueFlash, metrics: &SceneMetrics) {
    let screen_width = macroquad::window::screen_width();
    let screen_height = macroquad::window::screen_height();
    let thickness = 12.0 * metrics.scale;
    macroquad::shapes::draw_rectangle_lines(
        0.0,
        0.0,
        screen_width,
        screen_height,
        thickness,
        to_macroquad_color(flash.color()),
    );
}

fn game_over_panel(scene: &Scene, metrics: &SceneMetrics) -> GameOverUiContext {
    let size = Vec2::new(320.0, 200.0) * metrics.scale;
    let center = metrics.to_screen(Vec2::new(scene.field.width, scene.field.height) * 0.5);
    let origin = center - size * 0.5;

    GameOverUiContext {
        origin: MacroquadVec2::new(origin.x, origin.y),
        size: MacroquadVec2::new(size.x, size.y),
        background: macroquad::color::Color { a: 0.85, ..BLACK },
        score: scene.score,
        rounds: scene.round,
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
