use std::mem;

use glam::Vec2;
use puzzle_defence_rendering::{
    ButtonPresentation, FrameInput, MenuPresentation, Scene, SceneContent, TextPresentation,
};
use puzzle_defence_settings::{Settings, SettingsStore};
use puzzle_defence_system_placement_gate::QuestionBank;
use puzzle_defence_world::query;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    layout::{self, hit_index, CANVAS_WIDTH, LEVEL_COUNT},
    level::{Level, LevelSignal, PauseChoice},
    palette::Palette,
};

/// Ticks the win banner stays up before returning to level select.
pub const WIN_BANNER_TICKS: u32 = 180;

/// Levels that have a playable layout.
const PLAYABLE_LEVELS: u32 = 1;

const START_MENU: [StartChoice; 3] = [StartChoice::Start, StartChoice::Settings, StartChoice::Quit];
const LOST_MENU: [PauseChoice; 3] = [
    PauseChoice::Restart,
    PauseChoice::LevelSelect,
    PauseChoice::MainMenu,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StartChoice {
    Start,
    Settings,
    Quit,
}

impl StartChoice {
    const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Settings => "Settings",
            Self::Quit => "Quit",
        }
    }
}

/// Screen currently owned by the shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenKind {
    /// Title screen with Start, Settings and Quit.
    StartMenu,
    /// Grid of levels.
    LevelSelect,
    /// Preference toggles.
    Settings,
    /// A level in progress.
    Playing,
    /// Win banner over the cleared level.
    Won,
    /// Game over screen.
    Lost,
}

/// Whether the process should keep running after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellControl {
    /// Present another frame.
    Continue,
    /// Close the window.
    Quit,
}

#[derive(Debug)]
enum Screen {
    StartMenu,
    LevelSelect { notice: Option<u32> },
    Settings,
    Playing(Box<Level>),
    Won { level: Box<Level>, remaining: u32 },
    Lost { level: u32, score: u32 },
}

impl Screen {
    fn kind(&self) -> ScreenKind {
        match self {
            Self::StartMenu => ScreenKind::StartMenu,
            Self::LevelSelect { .. } => ScreenKind::LevelSelect,
            Self::Settings => ScreenKind::Settings,
            Self::Playing(_) => ScreenKind::Playing,
            Self::Won { .. } => ScreenKind::Won,
            Self::Lost { .. } => ScreenKind::Lost,
        }
    }
}

enum Transition {
    Stay(Screen),
    Enter(Screen),
    Play(u32),
    Quit,
}

/// Screen state machine driving the whole game.
///
/// Every screen change discards the previous screen and re-reads the
/// settings file; the file is the only state shared between screens.
#[derive(Debug)]
pub struct Shell {
    store: SettingsStore,
    settings: Settings,
    bank: QuestionBank,
    seeds: ChaCha8Rng,
    screen: Screen,
}

impl Shell {
    /// Creates a shell on the start menu.
    #[must_use]
    pub fn new(store: SettingsStore, bank: QuestionBank, seed: u64) -> Self {
        let settings = store.load();
        Self {
            store,
            settings,
            bank,
            seeds: ChaCha8Rng::seed_from_u64(seed),
            screen: Screen::StartMenu,
        }
    }

    /// Screen currently shown.
    #[must_use]
    pub fn screen(&self) -> ScreenKind {
        self.screen.kind()
    }

    /// Settings as last read from disk.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Level being played or just won.
    #[must_use]
    pub fn level(&self) -> Option<&Level> {
        match &self.screen {
            Screen::Playing(level) | Screen::Won { level, .. } => Some(&**level),
            _ => None,
        }
    }

    /// Switches to playing `level`.
    pub fn play(&mut self, level: Level) {
        self.enter(Screen::Playing(Box::new(level)));
    }

    /// Handles one frame of input.
    pub fn step(&mut self, input: &FrameInput) -> ShellControl {
        if input.quit_requested {
            let on_start_menu = matches!(self.screen, Screen::StartMenu);
            return self.quit(on_start_menu);
        }

        let click = input.pointer.filter(|_| input.primary_pressed);
        let transition = match mem::replace(&mut self.screen, Screen::StartMenu) {
            Screen::StartMenu => Self::step_start_menu(click),
            Screen::LevelSelect { notice } => self.step_level_select(click, notice),
            Screen::Settings => self.step_settings(click),
            Screen::Playing(level) => self.step_playing(level, input),
            Screen::Won { level, remaining } => {
                if remaining <= 1 {
                    Transition::Enter(Screen::LevelSelect { notice: None })
                } else {
                    Transition::Stay(Screen::Won {
                        level,
                        remaining: remaining - 1,
                    })
                }
            }
            Screen::Lost { level, score } => Self::step_lost(click, level, score),
        };

        match transition {
            Transition::Stay(screen) => self.screen = screen,
            Transition::Enter(screen) => self.enter(screen),
            Transition::Play(number) => {
                let level = Level::new(number, self.bank.clone(), self.seeds.next_u64());
                self.play(level);
            }
            Transition::Quit => return self.quit(true),
        }
        ShellControl::Continue
    }

    fn step_start_menu(click: Option<Vec2>) -> Transition {
        let buttons = (0..START_MENU.len()).map(layout::start_menu_button);
        match click
            .and_then(|point| hit_index(buttons, point))
            .map(|index| START_MENU[index])
        {
            Some(StartChoice::Start) => Transition::Enter(Screen::LevelSelect { notice: None }),
            Some(StartChoice::Settings) => Transition::Enter(Screen::Settings),
            Some(StartChoice::Quit) => Transition::Quit,
            None => Transition::Stay(Screen::StartMenu),
        }
    }

    fn step_level_select(&self, click: Option<Vec2>, notice: Option<u32>) -> Transition {
        let Some(point) = click else {
            return Transition::Stay(Screen::LevelSelect { notice });
        };
        if layout::back_button().contains(point) {
            return Transition::Enter(Screen::StartMenu);
        }

        let buttons = (1..=LEVEL_COUNT).map(layout::level_button);
        let Some(level) = hit_index(buttons, point).and_then(|index| u32::try_from(index + 1).ok())
        else {
            return Transition::Stay(Screen::LevelSelect { notice });
        };

        if !self.settings.is_unlocked(level) {
            tracing::debug!(level, "level is locked");
            Transition::Stay(Screen::LevelSelect { notice })
        } else if level <= PLAYABLE_LEVELS {
            Transition::Play(level)
        } else {
            Transition::Stay(Screen::LevelSelect {
                notice: Some(level),
            })
        }
    }

    fn step_settings(&mut self, click: Option<Vec2>) -> Transition {
        let Some(point) = click else {
            return Transition::Stay(Screen::Settings);
        };

        if layout::settings_button(0).contains(point) {
            match self.store.update(Settings::toggle_invert) {
                Ok(settings) => self.settings = settings,
                Err(error) => {
                    tracing::warn!(%error, "could not save colour preference");
                    self.settings.toggle_invert();
                }
            }
            Transition::Stay(Screen::Settings)
        } else if layout::settings_button(1).contains(point) {
            Transition::Enter(Screen::StartMenu)
        } else {
            Transition::Stay(Screen::Settings)
        }
    }

    fn step_playing(&mut self, mut level: Box<Level>, input: &FrameInput) -> Transition {
        match level.step(input) {
            LevelSignal::Continue => Transition::Stay(Screen::Playing(level)),
            LevelSignal::Won => {
                self.record_win(level.number());
                Transition::Enter(Screen::Won {
                    level,
                    remaining: WIN_BANNER_TICKS,
                })
            }
            LevelSignal::Lost => Transition::Enter(Screen::Lost {
                level: level.number(),
                score: query::score(level.world()),
            }),
            LevelSignal::Restart => Transition::Play(level.number()),
            LevelSignal::LevelSelect => Transition::Enter(Screen::LevelSelect { notice: None }),
            LevelSignal::MainMenu => Transition::Enter(Screen::StartMenu),
        }
    }

    fn step_lost(click: Option<Vec2>, level: u32, score: u32) -> Transition {
        let buttons = (0..LOST_MENU.len()).map(layout::overlay_button);
        match click
            .and_then(|point| hit_index(buttons, point))
            .map(|index| LOST_MENU[index])
        {
            Some(PauseChoice::Restart) => Transition::Play(level),
            Some(PauseChoice::LevelSelect) => Transition::Enter(Screen::LevelSelect { notice: None }),
            Some(PauseChoice::MainMenu) => Transition::Enter(Screen::StartMenu),
            Some(PauseChoice::Resume) | None => Transition::Stay(Screen::Lost { level, score }),
        }
    }

    fn record_win(&mut self, level: u32) {
        match self
            .store
            .update(|settings| settings.record_level_complete(level))
        {
            Ok(settings) => {
                tracing::info!(level, unlocked = settings.unlocked_levels, "progress saved");
                self.settings = settings;
            }
            Err(error) => {
                tracing::warn!(level, %error, "could not save progress");
                self.settings.record_level_complete(level);
            }
        }
    }

    fn enter(&mut self, screen: Screen) {
        self.settings = self.store.load();
        tracing::info!(screen = ?screen.kind(), "entering screen");
        self.screen = screen;
    }

    fn quit(&mut self, from_start_menu: bool) -> ShellControl {
        if from_start_menu {
            if let Err(error) = self.store.update(|settings| settings.invert_colors = false) {
                tracing::warn!(%error, "could not reset colour preference");
            }
        }
        tracing::info!("quitting");
        ShellControl::Quit
    }

    /// Rewrites `scene` to show the current screen.
    pub fn present(&self, scene: &mut Scene) {
        let palette = Palette::from_settings(&self.settings);
        scene.background = palette.background();
        scene.content = match &self.screen {
            Screen::StartMenu => SceneContent::Menu(start_menu(palette)),
            Screen::LevelSelect { notice } => {
                SceneContent::Menu(level_select(palette, &self.settings, *notice))
            }
            Screen::Settings => SceneContent::Menu(settings_menu(palette, &self.settings)),
            Screen::Playing(level) | Screen::Won { level, .. } => {
                SceneContent::Level(level.present(palette))
            }
            Screen::Lost { level, score } => SceneContent::Menu(lost_menu(palette, *level, *score)),
        };
    }
}

fn title(text: &str, y: f32, palette: Palette) -> TextPresentation {
    TextPresentation::centered(text, Vec2::new(CANVAS_WIDTH / 2.0, y), 80.0, palette.foreground())
}

fn start_menu(palette: Palette) -> MenuPresentation {
    MenuPresentation {
        labels: vec![title("Puzzle Defence", 200.0, palette)],
        buttons: START_MENU
            .into_iter()
            .enumerate()
            .map(|(index, choice)| {
                ButtonPresentation::new(
                    layout::start_menu_button(index),
                    palette.panel(),
                    choice.label(),
                    48.0,
                    palette.foreground(),
                )
            })
            .collect(),
    }
}

fn level_select(palette: Palette, settings: &Settings, notice: Option<u32>) -> MenuPresentation {
    let mut labels = vec![title("Select Level", 170.0, palette)];
    let mut buttons = Vec::with_capacity(LEVEL_COUNT as usize + 1);

    for level in 1..=LEVEL_COUNT {
        let bounds = layout::level_button(level);
        let unlocked = settings.is_unlocked(level);
        let fill = if unlocked {
            palette.unlocked()
        } else {
            palette.disabled()
        };
        let mut button = ButtonPresentation::new(
            bounds,
            fill,
            format!("Level {level}"),
            40.0,
            palette.foreground(),
        );
        if !unlocked {
            button.label.position.y -= 15.0;
            labels.push(TextPresentation::centered(
                "Locked",
                bounds.center() + Vec2::new(0.0, 25.0),
                24.0,
                palette.warning(),
            ));
        }
        buttons.push(button);
    }

    buttons.push(
        ButtonPresentation::new(layout::back_button(), palette.panel(), "Back", 32.0, palette.back())
            .with_outline(palette.back()),
    );

    if let Some(level) = notice {
        labels.push(TextPresentation::centered(
            format!("Level {level} is coming soon"),
            Vec2::new(CANVAS_WIDTH / 2.0, 640.0),
            36.0,
            palette.foreground(),
        ));
    }

    MenuPresentation { labels, buttons }
}

fn settings_menu(palette: Palette, settings: &Settings) -> MenuPresentation {
    let invert = if settings.invert_colors { "On" } else { "Off" };
    let captions = [format!("Invert Colors: {invert}"), "Back".to_owned()];

    MenuPresentation {
        labels: vec![title("Settings", 220.0, palette)],
        buttons: captions
            .into_iter()
            .enumerate()
            .map(|(index, caption)| {
                ButtonPresentation::new(
                    layout::settings_button(index),
                    palette.panel(),
                    caption,
                    40.0,
                    palette.foreground(),
                )
            })
            .collect(),
    }
}

fn lost_menu(palette: Palette, level: u32, score: u32) -> MenuPresentation {
    MenuPresentation {
        labels: vec![
            TextPresentation::centered(
                "Game Over",
                Vec2::new(CANVAS_WIDTH / 2.0, 180.0),
                80.0,
                palette.warning(),
            ),
            TextPresentation::centered(
                format!("Level {level}  Score: {score}"),
                Vec2::new(CANVAS_WIDTH / 2.0, 250.0),
                36.0,
                palette.foreground(),
            ),
        ],
        buttons: LOST_MENU
            .into_iter()
            .enumerate()
            .map(|(index, choice)| {
                ButtonPresentation::new(
                    layout::overlay_button(index),
                    palette.panel(),
                    choice.label(),
                    32.0,
                    palette.foreground(),
                )
            })
            .collect(),
    }
}
