//! Fixed positions of interactive elements on the virtual canvas.
//!
//! Presentation and hit testing both read from here so that what is drawn is
//! exactly what is clickable.

use glam::Vec2;
use puzzle_defence_core::TowerKind;
use puzzle_defence_rendering::Rect;

/// Width of the virtual canvas.
pub const CANVAS_WIDTH: f32 = 1280.0;

/// Height of the virtual canvas.
pub const CANVAS_HEIGHT: f32 = 800.0;

/// Width of the tower menu along the right edge of a level.
pub const SIDE_MENU_WIDTH: f32 = 120.0;

/// Number of entries on the level select screen.
pub const LEVEL_COUNT: u32 = 10;

const LEVELS_PER_ROW: u32 = 5;
const LEVEL_BUTTON_SIZE: Vec2 = Vec2::new(200.0, 100.0);
const LEVEL_BUTTON_GAP: f32 = 40.0;

const QUESTION_OPTIONS_TOP: f32 = 290.0;
const QUESTION_OPTIONS_HEIGHT: f32 = 300.0;
const QUESTION_OPTION_PITCH: f32 = 70.0;

/// Left edge of the side menu; the play area ends here.
#[must_use]
pub fn side_menu_left() -> f32 {
    CANVAS_WIDTH - SIDE_MENU_WIDTH
}

/// Area covered by the side menu.
#[must_use]
pub fn side_menu() -> Rect {
    Rect::new(side_menu_left(), 0.0, SIDE_MENU_WIDTH, CANVAS_HEIGHT)
}

/// Button selecting `kind` in the side menu.
#[must_use]
pub fn tower_button(kind: TowerKind) -> Rect {
    let row = kind.index() as f32;
    Rect::new(side_menu_left() + 10.0, 60.0 + row * 70.0, 100.0, 60.0)
}

/// Button opening the pause overlay, at the foot of the side menu.
#[must_use]
pub fn pause_button() -> Rect {
    Rect::new(side_menu_left() + 10.0, CANVAS_HEIGHT - 70.0, 100.0, 50.0)
}

/// Modal box holding a pending question.
#[must_use]
pub fn question_panel() -> Rect {
    Rect::new(240.0, 180.0, 800.0, 440.0)
}

/// Anchor of the question prompt.
#[must_use]
pub fn question_prompt() -> Vec2 {
    Vec2::new(CANVAS_WIDTH / 2.0, 235.0)
}

/// Button for option `index` out of `count` stacked inside the question panel.
#[must_use]
pub fn question_option(index: usize, count: usize) -> Rect {
    let count = count.max(1) as f32;
    let pitch = (QUESTION_OPTIONS_HEIGHT / count).min(QUESTION_OPTION_PITCH);
    let panel = question_panel();
    Rect::new(
        panel.x + 80.0,
        QUESTION_OPTIONS_TOP + index as f32 * pitch,
        panel.width - 160.0,
        pitch - 10.0,
    )
}

/// Button `index` of a vertically stacked overlay menu.
#[must_use]
pub fn overlay_button(index: usize) -> Rect {
    Rect::centered(
        Vec2::new(CANVAS_WIDTH / 2.0, 330.0 + index as f32 * 80.0),
        320.0,
        60.0,
    )
}

/// Button `index` of the start menu.
#[must_use]
pub fn start_menu_button(index: usize) -> Rect {
    Rect::centered(
        Vec2::new(CANVAS_WIDTH / 2.0, 380.0 + index as f32 * 100.0),
        300.0,
        80.0,
    )
}

/// Button `index` of the settings screen.
#[must_use]
pub fn settings_button(index: usize) -> Rect {
    Rect::centered(
        Vec2::new(CANVAS_WIDTH / 2.0, 400.0 + index as f32 * 120.0),
        400.0,
        70.0,
    )
}

/// Button for the 1-based `level` on the level select screen.
#[must_use]
pub fn level_button(level: u32) -> Rect {
    let slot = level.saturating_sub(1);
    let row = (slot / LEVELS_PER_ROW) as f32;
    let column = (slot % LEVELS_PER_ROW) as f32;
    let per_row = LEVELS_PER_ROW as f32;
    let row_width = LEVEL_BUTTON_SIZE.x * per_row + LEVEL_BUTTON_GAP * (per_row - 1.0);
    let left = (CANVAS_WIDTH - row_width) / 2.0;
    let top = CANVAS_HEIGHT / 2.0 - LEVEL_BUTTON_SIZE.y - LEVEL_BUTTON_GAP / 2.0;

    Rect::new(
        left + column * (LEVEL_BUTTON_SIZE.x + LEVEL_BUTTON_GAP),
        top + row * (LEVEL_BUTTON_SIZE.y + LEVEL_BUTTON_GAP),
        LEVEL_BUTTON_SIZE.x,
        LEVEL_BUTTON_SIZE.y,
    )
}

/// Back button of the level select screen.
#[must_use]
pub fn back_button() -> Rect {
    Rect::new(40.0, 80.0, 120.0, 80.0)
}

/// Index of the first rectangle containing `point`.
pub(crate) fn hit_index<I>(rects: I, point: Vec2) -> Option<usize>
where
    I: IntoIterator<Item = Rect>,
{
    rects.into_iter().position(|rect| rect.contains(point))
}
