//! Immediate-mode drawing of scene descriptors.

use glam::Vec2;
use macroquad::{
    shapes::{draw_circle, draw_circle_lines, draw_line, draw_rectangle, draw_rectangle_lines},
    text::{draw_text, measure_text},
};
use puzzle_defence_rendering::{
    ButtonPresentation, CirclePresentation, Color, LevelPresentation, MenuPresentation,
    OverlayPresentation, PathPresentation, QuestionPanelPresentation, Rect, Scene, SceneContent,
    SidePanelPresentation, TextAnchor, TextPresentation, TowerPresentation,
};

use crate::SceneMetrics;

const BUTTON_OUTLINE_THICKNESS: f32 = 3.0;
const RANGE_OUTLINE_THICKNESS: f32 = 1.0;

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

pub(crate) fn draw_scene(scene: &Scene, metrics: &SceneMetrics) {
    fill_rect(
        metrics,
        Rect::new(0.0, 0.0, scene.width(), scene.height()),
        scene.background,
    );

    match &scene.content {
        SceneContent::Menu(menu) => draw_menu(menu, metrics),
        SceneContent::Level(level) => draw_level(level, scene, metrics),
    }
}

fn draw_menu(menu: &MenuPresentation, metrics: &SceneMetrics) {
    for label in &menu.labels {
        draw_label(label, metrics);
    }
    for button in &menu.buttons {
        draw_button(button, metrics);
    }
}

fn draw_level(level: &LevelPresentation, scene: &Scene, metrics: &SceneMetrics) {
    draw_path(&level.path, metrics);
    for tower in &level.towers {
        draw_tower(tower, metrics);
    }
    for enemy in &level.enemies {
        draw_disc(enemy, metrics);
    }
    for bullet in &level.bullets {
        draw_disc(bullet, metrics);
    }
    if let Some(preview) = &level.preview {
        draw_tower(preview, metrics);
    }

    draw_side_panel(&level.side_panel, metrics);
    for label in &level.hud {
        draw_label(label, metrics);
    }

    if let Some(question) = &level.question {
        draw_question(question, metrics);
    }
    if let Some(overlay) = &level.overlay {
        draw_overlay(overlay, scene, metrics);
    }
}

fn draw_path(path: &PathPresentation, metrics: &SceneMetrics) {
    let color = to_macroquad_color(path.color);
    let thickness = path.thickness * metrics.scale;
    for pair in path.points.windows(2) {
        let start = metrics.to_screen(pair[0]);
        let end = metrics.to_screen(pair[1]);
        draw_line(start.x, start.y, end.x, end.y, thickness, color);
    }
}

fn draw_tower(tower: &TowerPresentation, metrics: &SceneMetrics) {
    let side = tower.half_extent * 2.0;
    fill_rect(
        metrics,
        Rect::centered(tower.center, side, side),
        tower.fill,
    );

    let center = metrics.to_screen(tower.center);
    draw_circle_lines(
        center.x,
        center.y,
        tower.range * metrics.scale,
        RANGE_OUTLINE_THICKNESS,
        to_macroquad_color(tower.range_color),
    );
}

fn draw_disc(circle: &CirclePresentation, metrics: &SceneMetrics) {
    let center = metrics.to_screen(circle.center);
    draw_circle(
        center.x,
        center.y,
        circle.radius * metrics.scale,
        to_macroquad_color(circle.color),
    );
}

fn draw_side_panel(panel: &SidePanelPresentation, metrics: &SceneMetrics) {
    fill_rect(metrics, panel.bounds, panel.fill);
    for button in &panel.buttons {
        draw_button(button, metrics);
    }
}

fn draw_question(question: &QuestionPanelPresentation, metrics: &SceneMetrics) {
    fill_rect(metrics, question.bounds, question.fill);
    draw_label(&question.prompt, metrics);
    for option in &question.options {
        draw_button(option, metrics);
    }
}

fn draw_overlay(overlay: &OverlayPresentation, scene: &Scene, metrics: &SceneMetrics) {
    fill_rect(
        metrics,
        Rect::new(0.0, 0.0, scene.width(), scene.height()),
        overlay.shade,
    );
    for label in &overlay.labels {
        draw_label(label, metrics);
    }
    for button in &overlay.buttons {
        draw_button(button, metrics);
    }
}

fn draw_button(button: &ButtonPresentation, metrics: &SceneMetrics) {
    fill_rect(metrics, button.bounds, button.fill);
    if let Some(outline) = button.outline {
        let origin = metrics.to_screen(Vec2::new(button.bounds.x, button.bounds.y));
        draw_rectangle_lines(
            origin.x,
            origin.y,
            button.bounds.width * metrics.scale,
            button.bounds.height * metrics.scale,
            BUTTON_OUTLINE_THICKNESS,
            to_macroquad_color(outline),
        );
    }
    draw_label(&button.label, metrics);
}

fn draw_label(label: &TextPresentation, metrics: &SceneMetrics) {
    if label.text.is_empty() {
        return;
    }

    let font_size = (label.font_size * metrics.scale).max(1.0);
    let dimensions = measure_text(&label.text, None, font_size.round() as u16, 1.0);
    let anchor = metrics.to_screen(label.position);
    // draw_text positions glyphs by their baseline.
    let (x, baseline) = match label.anchor {
        TextAnchor::TopLeft => (anchor.x, anchor.y + dimensions.offset_y),
        TextAnchor::Center => (
            anchor.x - dimensions.width / 2.0,
            anchor.y - dimensions.height / 2.0 + dimensions.offset_y,
        ),
    };

    let _ = draw_text(
        &label.text,
        x,
        baseline,
        font_size,
        to_macroquad_color(label.color),
    );
}

fn fill_rect(metrics: &SceneMetrics, rect: Rect, color: Color) {
    let origin = metrics.to_screen(Vec2::new(rect.x, rect.y));
    draw_rectangle(
        origin.x,
        origin.y,
        rect.width * metrics.scale,
        rect.height * metrics.scale,
        to_macroquad_color(color),
    );
}
