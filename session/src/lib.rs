#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Screens and level loop of Puzzle Defence.
//!
//! [`Level`] owns one play-through: the world, the gameplay systems and the
//! placement gate, stepped once per rendered frame. [`Shell`] owns the screen
//! state machine around it and the settings file.

pub mod layout;
mod level;
mod palette;
mod shell;

pub use level::{Level, LevelSignal, PauseChoice, FEEDBACK_TICKS};
pub use palette::Palette;
pub use shell::{ScreenKind, Shell, ShellControl, WIN_BANNER_TICKS};

/// Title of the game window.
pub const WINDOW_TITLE: &str = "Puzzle Defence";
