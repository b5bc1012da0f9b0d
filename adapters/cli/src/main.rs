#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Puzzle Defence experience.

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::Parser;
use puzzle_defence_rendering::{
    Color, FrameControl, MenuPresentation, Presentation, RenderingBackend, Scene, SceneContent,
};
use puzzle_defence_rendering_macroquad::MacroquadBackend;
use puzzle_defence_session::{
    layout::{CANVAS_HEIGHT, CANVAS_WIDTH},
    Shell, ShellControl, WINDOW_TITLE,
};
use puzzle_defence_settings::{SettingsStore, DEFAULT_SETTINGS_PATH};
use puzzle_defence_system_placement_gate::QuestionBank;
use tracing_subscriber::filter::EnvFilter;

/// Command-line arguments accepted by the Puzzle Defence binary.
#[derive(Debug, Parser)]
#[command(name = "puzzle-defence")]
#[command(about = "Tower defence where every tower costs a correct answer")]
struct Args {
    /// Settings file holding colour preference and unlocked levels
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,

    /// TOML question bank replacing the built-in questions
    #[arg(long)]
    questions: Option<PathBuf>,

    /// Seed for wave shuffles and question order; defaults to the clock
    #[arg(long)]
    seed: Option<u64>,

    /// Synchronise presentation with the display refresh rate
    #[arg(long, overrides_with = "no_vsync")]
    vsync: bool,

    /// Render as fast as possible
    #[arg(long, overrides_with = "vsync")]
    no_vsync: bool,

    /// Log frame timing once per second
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn vsync(&self) -> Option<bool> {
        if self.no_vsync {
            Some(false)
        } else if self.vsync {
            Some(true)
        } else {
            None
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Entry point for the Puzzle Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let bank = match &args.questions {
        Some(path) => QuestionBank::load(path)
            .with_context(|| format!("failed to load question bank {}", path.display()))?,
        None => QuestionBank::builtin(),
    };
    let seed = args.seed.unwrap_or_else(clock_seed);
    tracing::info!(seed, settings = %args.settings.display(), "starting Puzzle Defence");

    let mut shell = Shell::new(SettingsStore::new(&args.settings), bank, seed);
    let letterbox = Color::from_rgb_u8(0, 0, 0);
    let mut scene = Scene::new(
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        letterbox,
        SceneContent::Menu(MenuPresentation::default()),
    )
    .context("failed to create the game canvas")?;
    shell.present(&mut scene);

    let mut backend = MacroquadBackend::new().with_show_fps(args.show_fps);
    if let Some(enabled) = args.vsync() {
        backend = backend.with_vsync(enabled);
    }

    backend
        .run(
            Presentation::new(WINDOW_TITLE, letterbox, scene),
            move |input, scene| match shell.step(&input) {
                ShellControl::Quit => FrameControl::Exit,
                ShellControl::Continue => {
                    shell.present(scene);
                    FrameControl::Continue
                }
            },
        )
        .context("rendering backend failed")
}
