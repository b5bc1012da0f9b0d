#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Puzzle Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Scenes are drawn on a fixed virtual canvas that is scaled uniformly to the
//! window and centred with letterbox bars. Pointer input is mapped back into
//! canvas units before the scene update sees it.

mod draw;

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, is_mouse_button_released, mouse_position, KeyCode,
    MouseButton,
};
use puzzle_defence_rendering::{
    FrameControl, FrameInput, Presentation, RenderingBackend, Scene,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use self::draw::{draw_scene, to_macroquad_color};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game.
    quit_requested: bool,
    /// `P` toggles the pause overlay.
    pause_pressed: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            pause_pressed: is_key_pressed(KeyCode::P),
        }
    }
}

/// Mouse button transitions observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct PointerButtons {
    primary_pressed: bool,
    primary_released: bool,
    secondary_pressed: bool,
}

impl PointerButtons {
    fn poll() -> Self {
        Self {
            primary_pressed: is_mouse_button_pressed(MouseButton::Left),
            primary_released: is_mouse_button_released(MouseButton::Left),
            secondary_pressed: is_mouse_button_pressed(MouseButton::Right),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_width: i32,
    window_height: i32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_width: 1280,
            window_height: 800,
        }
    }
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

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
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
            avg_update: self.update_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.update_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        tracing::info!(window_width, window_height, "opening window");

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                let buttons = PointerButtons::poll();
                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));

                let metrics_before = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    &metrics_before,
                    Vec2::new(cursor_x, cursor_y),
                    buttons,
                    keyboard,
                );

                let update_start = Instant::now();
                let control = update_scene(frame_input, &mut scene);
                let update_duration = update_start.elapsed();
                if control == FrameControl::Exit {
                    break;
                }

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                draw_scene(&scene, &metrics);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(metrics) = fps_metrics {
                        tracing::info!(
                            fps = format_args!("{:.2}", metrics.per_second),
                            fps_10s = format_args!("{:.2}", metrics.trailing_ten_seconds),
                            update_ms = metrics.avg_update.as_secs_f64() * 1_000.0,
                            render_ms = metrics.avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        tracing::info!("window closed");
        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping the virtual canvas to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    canvas_width: f32,
    canvas_height: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        Self::for_canvas(scene.width(), scene.height(), screen_width, screen_height)
    }

    fn for_canvas(canvas_width: f32, canvas_height: f32, screen_width: f32, screen_height: f32) -> Self {
        let scale = if canvas_width <= f32::EPSILON || canvas_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / canvas_width).min(screen_height / canvas_height).max(0.0)
        };

        Self {
            scale,
            offset_x: ((screen_width - canvas_width * scale) * 0.5).max(0.0),
            offset_y: ((screen_height - canvas_height * scale) * 0.5).max(0.0),
            canvas_width,
            canvas_height,
        }
    }

    fn to_screen(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + point.y * self.scale,
        )
    }

    fn to_canvas(&self, screen: Vec2) -> Option<Vec2> {
        if self.scale <= f32::EPSILON {
            return None;
        }
        let point = Vec2::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        );
        let inside = point.x >= 0.0
            && point.y >= 0.0
            && point.x <= self.canvas_width
            && point.y <= self.canvas_height;
        inside.then_some(point)
    }
}

fn gather_frame_input_from_observations(
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    buttons: PointerButtons,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let pointer = metrics.to_canvas(cursor_position);
    let on_canvas = pointer.is_some();

    FrameInput {
        pointer,
        primary_pressed: buttons.primary_pressed && on_canvas,
        primary_released: buttons.primary_released,
        secondary_pressed: buttons.secondary_pressed,
        pause_pressed: keyboard.pause_pressed,
        quit_requested: keyboard.quit_requested,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec2_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() <= 1e-4,
            "expected {expected:?}, found {actual:?}"
        );
    }

    #[test]
    fn wide_window_letterboxes_horizontally() {
        let metrics = SceneMetrics::for_canvas(1280.0, 800.0, 1920.0, 800.0);

        assert!((metrics.scale - 1.0).abs() <= f32::EPSILON);
        assert!((metrics.offset_x - 320.0).abs() <= f32::EPSILON);
        assert_eq!(metrics.offset_y, 0.0);
    }

    #[test]
    fn tall_window_letterboxes_vertically() {
        let metrics = SceneMetrics::for_canvas(1280.0, 800.0, 640.0, 1000.0);

        assert!((metrics.scale - 0.5).abs() <= f32::EPSILON);
        assert_eq!(metrics.offset_x, 0.0);
        assert!((metrics.offset_y - 300.0).abs() <= f32::EPSILON);
    }

    #[test]
    fn canvas_mapping_inverts_screen_mapping() {
        let metrics = SceneMetrics::for_canvas(1280.0, 800.0, 1000.0, 900.0);
        let canvas_point = Vec2::new(640.0, 123.0);
        let screen = metrics.to_screen(canvas_point);

        let mapped = metrics.to_canvas(screen).expect("point on canvas");
        assert_vec2_close(mapped, canvas_point);
    }

    #[test]
    fn letterbox_bars_are_off_canvas() {
        let metrics = SceneMetrics::for_canvas(1280.0, 800.0, 1920.0, 800.0);
        assert!(metrics.to_canvas(Vec2::new(100.0, 400.0)).is_none());
        assert!(metrics.to_canvas(Vec2::new(1700.0, 400.0)).is_none());
    }

    #[test]
    fn presses_outside_canvas_are_dropped() {
        let metrics = SceneMetrics::for_canvas(1280.0, 800.0, 1920.0, 800.0);
        let buttons = PointerButtons {
            primary_pressed: true,
            primary_released: true,
            secondary_pressed: false,
        };
        let keyboard = KeyboardShortcuts {
            quit_requested: false,
            pause_pressed: true,
        };

        let outside =
            gather_frame_input_from_observations(&metrics, Vec2::new(10.0, 10.0), buttons, keyboard);
        assert!(outside.pointer.is_none());
        assert!(!outside.primary_pressed);
        assert!(outside.primary_released);
        assert!(outside.pause_pressed);

        let inside =
            gather_frame_input_from_observations(&metrics, Vec2::new(330.0, 10.0), buttons, keyboard);
        assert!(inside.primary_pressed);
        assert_vec2_close(inside.pointer.expect("on canvas"), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = |millis| FrameBreakdown {
            frame: Duration::from_millis(millis),
            ..FrameBreakdown::default()
        };
        assert!(counter.record_frame(frame(250)).is_none());
        assert!(counter.record_frame(frame(250)).is_none());
        assert!(counter.record_frame(frame(250)).is_none());

        let metrics = counter
            .record_frame(frame(250))
            .expect("should report FPS after one second of samples");
        assert!((metrics.per_second - 4.0).abs() <= 1e-3);
        assert!((metrics.trailing_ten_seconds - 4.0).abs() <= 1e-3);
        assert!(counter.record_frame(frame(250)).is_none());
    }
}
