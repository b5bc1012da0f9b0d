use puzzle_defence_core::{Command, Position, TowerKind};
use puzzle_defence_rendering::{
    Color, FrameInput, MenuPresentation, Rect, Scene, SceneContent,
};
use puzzle_defence_session::{
    layout, Level, Palette, ScreenKind, Shell, ShellControl, WIN_BANNER_TICKS,
};
use puzzle_defence_settings::{Settings, SettingsStore};
use puzzle_defence_system_placement_gate::QuestionBank;
use puzzle_defence_world::{self as world, query, World};
use tempfile::TempDir;

fn shell_with(settings: Option<Settings>) -> (TempDir, SettingsStore, Shell) {
    let directory = tempfile::tempdir().expect("temp dir");
    let store = SettingsStore::new(directory.path().join("settings.toml"));
    if let Some(settings) = settings {
        store.save(&settings).expect("seed settings");
    }
    let shell = Shell::new(store.clone(), QuestionBank::builtin(), 42);
    (directory, store, shell)
}

fn click(rect: Rect) -> FrameInput {
    FrameInput {
        pointer: Some(rect.center()),
        primary_pressed: true,
        ..FrameInput::default()
    }
}

fn quit() -> FrameInput {
    FrameInput {
        quit_requested: true,
        ..FrameInput::default()
    }
}

fn blank_scene() -> Scene {
    Scene::new(
        layout::CANVAS_WIDTH,
        layout::CANVAS_HEIGHT,
        Color::new(0.0, 0.0, 0.0, 1.0),
        SceneContent::Menu(MenuPresentation::default()),
    )
    .expect("valid canvas")
}

fn menu_texts(shell: &Shell) -> Vec<String> {
    let mut scene = blank_scene();
    shell.present(&mut scene);
    let SceneContent::Menu(menu) = scene.content else {
        panic!("expected a menu scene");
    };
    menu.labels
        .into_iter()
        .map(|label| label.text)
        .chain(menu.buttons.into_iter().map(|button| button.label.text))
        .collect()
}

fn enter_level_one(shell: &mut Shell) {
    assert_eq!(shell.step(&click(layout::start_menu_button(0))), ShellControl::Continue);
    assert_eq!(shell.screen(), ScreenKind::LevelSelect);
    assert_eq!(shell.step(&click(layout::level_button(1))), ShellControl::Continue);
    assert_eq!(shell.screen(), ScreenKind::Playing);
}

#[test]
fn start_leads_to_level_one() {
    let (_directory, _store, mut shell) = shell_with(None);
    assert_eq!(shell.screen(), ScreenKind::StartMenu);

    enter_level_one(&mut shell);

    let level = shell.level().expect("level in progress");
    assert_eq!(level.number(), 1);
    assert_eq!(query::tick_index(level.world()), 0);
}

#[test]
fn quitting_from_start_menu_resets_inversion() {
    let (_directory, store, mut shell) = shell_with(Some(Settings {
        invert_colors: true,
        unlocked_levels: 3,
    }));

    assert_eq!(shell.step(&quit()), ShellControl::Quit);

    assert_eq!(
        store.load(),
        Settings {
            invert_colors: false,
            unlocked_levels: 3,
        }
    );
}

#[test]
fn quit_button_resets_inversion() {
    let (_directory, store, mut shell) = shell_with(Some(Settings {
        invert_colors: true,
        unlocked_levels: 1,
    }));

    assert_eq!(shell.step(&click(layout::start_menu_button(2))), ShellControl::Quit);
    assert!(!store.load().invert_colors);
}

#[test]
fn quitting_mid_level_keeps_inversion() {
    let (_directory, store, mut shell) = shell_with(Some(Settings {
        invert_colors: true,
        unlocked_levels: 1,
    }));
    enter_level_one(&mut shell);

    assert_eq!(shell.step(&quit()), ShellControl::Quit);
    assert!(store.load().invert_colors);
}

#[test]
fn settings_toggle_persists_and_repaints() {
    let (_directory, store, mut shell) = shell_with(None);
    let _ = shell.step(&click(layout::start_menu_button(1)));
    assert_eq!(shell.screen(), ScreenKind::Settings);
    assert!(menu_texts(&shell).contains(&"Invert Colors: Off".to_owned()));

    let _ = shell.step(&click(layout::settings_button(0)));
    assert!(store.load().invert_colors);
    assert!(menu_texts(&shell).contains(&"Invert Colors: On".to_owned()));

    let _ = shell.step(&click(layout::settings_button(1)));
    assert_eq!(shell.screen(), ScreenKind::StartMenu);
    let mut scene = blank_scene();
    shell.present(&mut scene);
    assert_eq!(scene.background, Palette::new(true).background());
}

#[test]
fn settings_edited_elsewhere_are_picked_up_on_screen_change() {
    let (_directory, store, mut shell) = shell_with(None);
    store
        .save(&Settings {
            invert_colors: false,
            unlocked_levels: 4,
        })
        .expect("save");

    let _ = shell.step(&click(layout::start_menu_button(0)));

    assert_eq!(shell.settings().unlocked_levels, 4);
}

#[test]
fn locked_levels_ignore_clicks() {
    let (_directory, _store, mut shell) = shell_with(None);
    let _ = shell.step(&click(layout::start_menu_button(0)));
    let texts = menu_texts(&shell);
    assert_eq!(texts.iter().filter(|text| *text == "Locked").count(), 9);

    let _ = shell.step(&click(layout::level_button(3)));

    assert_eq!(shell.screen(), ScreenKind::LevelSelect);
    assert!(!menu_texts(&shell)
        .iter()
        .any(|text| text.contains("coming soon")));
}

#[test]
fn unlocked_levels_without_layout_show_notice() {
    let (_directory, _store, mut shell) = shell_with(Some(Settings {
        invert_colors: false,
        unlocked_levels: 2,
    }));
    let _ = shell.step(&click(layout::start_menu_button(0)));

    let _ = shell.step(&click(layout::level_button(2)));

    assert_eq!(shell.screen(), ScreenKind::LevelSelect);
    assert!(menu_texts(&shell).contains(&"Level 2 is coming soon".to_owned()));

    let _ = shell.step(&click(layout::back_button()));
    assert_eq!(shell.screen(), ScreenKind::StartMenu);
}

#[test]
fn pause_menu_returns_to_start_menu() {
    let (_directory, _store, mut shell) = shell_with(None);
    enter_level_one(&mut shell);

    let _ = shell.step(&FrameInput {
        pause_pressed: true,
        ..FrameInput::default()
    });
    assert!(shell.level().expect("level").is_paused());

    let _ = shell.step(&click(layout::overlay_button(3)));
    assert_eq!(shell.screen(), ScreenKind::StartMenu);
}

#[test]
fn losing_offers_a_restart() {
    let (_directory, _store, mut shell) = shell_with(None);
    enter_level_one(&mut shell);

    for _ in 0..5_000 {
        let _ = shell.step(&FrameInput::default());
        if shell.screen() != ScreenKind::Playing {
            break;
        }
    }
    assert_eq!(shell.screen(), ScreenKind::Lost);
    assert!(menu_texts(&shell).contains(&"Game Over".to_owned()));

    let _ = shell.step(&click(layout::overlay_button(0)));
    assert_eq!(shell.screen(), ScreenKind::Playing);
    let level = shell.level().expect("fresh level");
    assert_eq!(query::tick_index(level.world()), 0);
    assert_eq!(query::lives(level.world()), 3);
}

fn fortified_world() -> World {
    let posts = [
        (150.0, 355.0),
        (250.0, 355.0),
        (350.0, 355.0),
        (150.0, 445.0),
        (250.0, 445.0),
        (445.0, 450.0),
        (445.0, 550.0),
        (445.0, 650.0),
        (355.0, 500.0),
        (355.0, 600.0),
        (500.0, 745.0),
        (600.0, 655.0),
        (700.0, 745.0),
        (800.0, 655.0),
        (900.0, 745.0),
        (955.0, 600.0),
        (1045.0, 500.0),
        (955.0, 400.0),
        (1045.0, 300.0),
        (955.0, 200.0),
    ];
    let mut world = World::new();
    let mut events = Vec::new();
    for (x, y) in posts {
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Rapid,
                position: Position::new(x, y),
            },
            &mut events,
        );
    }
    assert_eq!(query::tower_view(&world).iter().count(), posts.len());
    world
}

#[test]
fn winning_persists_progress_and_returns_to_level_select() {
    let (_directory, store, mut shell) = shell_with(None);
    shell.play(Level::with_world(
        1,
        fortified_world(),
        QuestionBank::builtin(),
        9,
    ));

    let mut transitions_to_won = 0;
    for _ in 0..20_000 {
        let before = shell.screen();
        let _ = shell.step(&FrameInput::default());
        if before == ScreenKind::Playing && shell.screen() == ScreenKind::Won {
            transitions_to_won += 1;
            break;
        }
    }
    assert_eq!(transitions_to_won, 1);
    assert!(store.load().unlocked_levels >= 2);
    assert!(shell.settings().is_unlocked(2));

    let mut scene = blank_scene();
    shell.present(&mut scene);
    let SceneContent::Level(level) = &scene.content else {
        panic!("win banner is drawn over the level");
    };
    assert!(level.overlay.is_some());

    for _ in 0..WIN_BANNER_TICKS {
        assert_eq!(shell.screen(), ScreenKind::Won);
        let _ = shell.step(&FrameInput::default());
    }
    assert_eq!(shell.screen(), ScreenKind::LevelSelect);
    let locked = menu_texts(&shell)
        .into_iter()
        .filter(|text| text == "Locked")
        .count();
    assert_eq!(locked, 8);

    let _ = shell.step(&click(layout::level_button(1)));
    assert_eq!(shell.screen(), ScreenKind::Playing);
}
