use glam::Vec2;
use puzzle_defence_core::{
    Command, Event, LevelOutcome, Position, TowerKind, BULLET_RADIUS, ENEMY_RADIUS,
    TICKS_PER_SECOND, TOWER_HALF_EXTENT,
};
use puzzle_defence_rendering::{
    ButtonPresentation, CirclePresentation, FrameInput, LevelPresentation, OverlayPresentation,
    PathPresentation, QuestionPanelPresentation, SidePanelPresentation, TextPresentation,
    TowerPresentation,
};
use puzzle_defence_system_placement_gate::{AnswerOutcome, GateState, PlacementGate, QuestionBank};
use puzzle_defence_system_slow_field::SlowField;
use puzzle_defence_system_tower_targeting::TowerTargeting;
use puzzle_defence_system_wave_director::{Config, WaveDirector};
use puzzle_defence_world::{self as world, query, World};

use crate::{
    layout::{self, hit_index},
    palette::Palette,
};

/// Ticks a placement feedback message stays on screen.
pub const FEEDBACK_TICKS: u32 = 90;

const PATH_THICKNESS: f32 = 8.0;

/// What the level asks of the shell after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelSignal {
    /// Keep playing.
    Continue,
    /// The final wave was cleared on this frame.
    Won,
    /// The last life was lost on this frame.
    Lost,
    /// The player asked to start the level over.
    Restart,
    /// The player asked for the level select screen.
    LevelSelect,
    /// The player asked for the start menu.
    MainMenu,
}

/// Entries of the pause overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseChoice {
    /// Close the overlay.
    Resume,
    /// Start the level over.
    Restart,
    /// Leave for the level select screen.
    LevelSelect,
    /// Leave for the start menu.
    MainMenu,
}

impl PauseChoice {
    /// Overlay entries in display order.
    pub const ALL: [Self; 4] = [Self::Resume, Self::Restart, Self::LevelSelect, Self::MainMenu];

    /// Button caption.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Resume => "Resume",
            Self::Restart => "Restart",
            Self::LevelSelect => "Level Select",
            Self::MainMenu => "Main Menu",
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Feedback {
    message: &'static str,
    remaining: u32,
}

/// One play-through of a level: world, systems and placement gate.
#[derive(Debug)]
pub struct Level {
    number: u32,
    world: World,
    director: WaveDirector,
    targeting: TowerTargeting,
    slow_field: SlowField,
    gate: PlacementGate,
    paused: bool,
    feedback: Option<Feedback>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Level {
    /// Creates level `number` with an empty first-level world.
    #[must_use]
    pub fn new(number: u32, bank: QuestionBank, seed: u64) -> Self {
        Self::with_world(number, World::new(), bank, seed)
    }

    /// Creates level `number` around an already populated world.
    #[must_use]
    pub fn with_world(number: u32, world: World, bank: QuestionBank, seed: u64) -> Self {
        Self {
            number,
            world,
            director: WaveDirector::new(Config::level_one(seed)),
            targeting: TowerTargeting::new(),
            slow_field: SlowField::new(),
            gate: PlacementGate::new(bank, seed.wrapping_add(1)),
            paused: false,
            feedback: None,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    /// 1-based level number.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Placement gate of the level.
    #[must_use]
    pub fn gate(&self) -> &PlacementGate {
        &self.gate
    }

    /// Wave director of the level.
    #[must_use]
    pub fn director(&self) -> &WaveDirector {
        &self.director
    }

    /// Reports whether the pause overlay is open.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Placement feedback currently shown, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<&'static str> {
        self.feedback.map(|feedback| feedback.message)
    }

    /// Handles one frame of input and advances the simulation by one tick.
    ///
    /// Once the level is won or lost it no longer changes.
    pub fn step(&mut self, input: &FrameInput) -> LevelSignal {
        if query::outcome(&self.world).is_terminal() {
            return LevelSignal::Continue;
        }

        if input.pause_pressed {
            self.paused = !self.paused;
        }
        if self.paused {
            return self.handle_pause_menu(input);
        }

        self.handle_pointer(input);
        if self.paused {
            return LevelSignal::Continue;
        }

        self.simulate_tick();
        match query::outcome(&self.world) {
            LevelOutcome::InProgress => LevelSignal::Continue,
            LevelOutcome::Won => LevelSignal::Won,
            LevelOutcome::Lost => LevelSignal::Lost,
        }
    }

    fn handle_pause_menu(&mut self, input: &FrameInput) -> LevelSignal {
        let Some(point) = input.pointer.filter(|_| input.primary_pressed) else {
            return LevelSignal::Continue;
        };
        let buttons = (0..PauseChoice::ALL.len()).map(layout::overlay_button);
        match hit_index(buttons, point).map(|index| PauseChoice::ALL[index]) {
            Some(PauseChoice::Resume) => {
                self.paused = false;
                LevelSignal::Continue
            }
            Some(PauseChoice::Restart) => LevelSignal::Restart,
            Some(PauseChoice::LevelSelect) => LevelSignal::LevelSelect,
            Some(PauseChoice::MainMenu) => LevelSignal::MainMenu,
            None => LevelSignal::Continue,
        }
    }

    fn handle_pointer(&mut self, input: &FrameInput) {
        if input.secondary_pressed && self.gate.cancel() {
            tracing::debug!(level = self.number, "placement preview cancelled");
        }
        if let Some(point) = input.pointer {
            self.gate.move_preview(to_position(point));
        }

        // Dragging a preview off the side menu and releasing it over the
        // field confirms like a click.
        let dropped_on_field = input.primary_released
            && input
                .pointer
                .is_some_and(|point| point.x < layout::side_menu_left());
        if dropped_on_field && self.gate.confirm() {
            tracing::debug!(level = self.number, "placement question presented");
            return;
        }

        let Some(point) = input.pointer.filter(|_| input.primary_pressed) else {
            return;
        };

        let pending_options = match self.gate.state() {
            GateState::AwaitingAnswer { question, .. } => Some(question.options().len()),
            GateState::Idle | GateState::Previewing { .. } => None,
        };
        if let Some(count) = pending_options {
            let buttons = (0..count).map(|index| layout::question_option(index, count));
            if let Some(option) = hit_index(buttons, point) {
                self.answer(option);
            }
            return;
        }

        if layout::pause_button().contains(point) {
            self.paused = true;
            return;
        }

        if let Some(kind) = TowerKind::ALL
            .into_iter()
            .find(|kind| layout::tower_button(*kind).contains(point))
        {
            if !self.gate.select(kind, to_position(point)) {
                tracing::debug!(kind = kind.name(), "tower kind is cooling down");
            }
            return;
        }

        if point.x < layout::side_menu_left() && self.gate.confirm() {
            tracing::debug!(level = self.number, "placement question presented");
        }
    }

    fn answer(&mut self, option: usize) {
        let world = &self.world;
        let outcome = self.gate.answer(
            option,
            |position| query::validate_placement(world, position),
            &mut self.commands,
        );

        let message = match outcome {
            AnswerOutcome::Committed { .. } => {
                self.feedback = None;
                None
            }
            AnswerOutcome::InvalidPosition { .. } => Some("Invalid position"),
            AnswerOutcome::WrongAnswer { .. } => Some("Wrong answer"),
            AnswerOutcome::Ignored => None,
        };
        if let Some(message) = message {
            self.feedback = Some(Feedback {
                message,
                remaining: FEEDBACK_TICKS,
            });
        }

        self.flush_commands();
    }

    fn simulate_tick(&mut self) {
        self.gate.tick();
        self.feedback = self.feedback.and_then(|feedback| {
            let remaining = feedback.remaining.saturating_sub(1);
            (remaining > 0).then_some(Feedback {
                remaining,
                ..feedback
            })
        });

        self.director
            .handle(query::live_enemy_count(&self.world), &mut self.commands);
        self.commands.push(Command::Tick);
        self.flush_commands();

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.slow_field.handle(&towers, &enemies, &mut self.commands);
        self.flush_commands();

        let bullets = query::bullet_view(&self.world);
        self.targeting
            .handle(&towers, &enemies, &bullets, &mut self.commands);
        self.flush_commands();

        self.commands.push(Command::AdvanceBullets);
        self.commands.push(Command::AdvanceEnemies);
        self.flush_commands();
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        for event in self.events.drain(..) {
            match event {
                Event::TowerPlaced { tower, kind, .. } => {
                    tracing::info!(
                        level = self.number,
                        tower = tower.get(),
                        kind = kind.name(),
                        "tower placed"
                    );
                }
                Event::TowerPlacementRejected { kind, reason, .. } => {
                    tracing::warn!(
                        level = self.number,
                        kind = kind.name(),
                        %reason,
                        "tower placement rejected"
                    );
                }
                Event::EnemyEscaped { lives, .. } => {
                    tracing::debug!(level = self.number, lives, "enemy escaped");
                }
                Event::LevelWon => tracing::info!(level = self.number, "level won"),
                Event::LevelLost => tracing::info!(level = self.number, "level lost"),
                _ => {}
            }
        }
    }

    /// Describes the current frame for rendering.
    #[must_use]
    pub fn present(&self, palette: Palette) -> LevelPresentation {
        let path = PathPresentation {
            points: query::path(&self.world)
                .waypoints()
                .iter()
                .copied()
                .map(to_vec2)
                .collect(),
            thickness: PATH_THICKNESS,
            color: palette.path(),
        };

        let towers = query::tower_view(&self.world)
            .iter()
            .map(|tower| tower_presentation(tower.kind, tower.position, palette))
            .collect();
        let enemies = query::enemy_view(&self.world)
            .iter()
            .map(|enemy| CirclePresentation {
                center: to_vec2(enemy.position),
                radius: ENEMY_RADIUS,
                color: palette.enemy(enemy.variant),
            })
            .collect();
        let bullets = query::bullet_view(&self.world)
            .iter()
            .map(|bullet| CirclePresentation {
                center: to_vec2(bullet.position),
                radius: BULLET_RADIUS,
                color: palette.bullet(),
            })
            .collect();

        LevelPresentation {
            path,
            towers,
            enemies,
            bullets,
            side_panel: self.side_panel(palette),
            hud: self.hud(palette),
            preview: self.preview(palette),
            question: self.question(palette),
            overlay: self.overlay(palette),
        }
    }

    fn side_panel(&self, palette: Palette) -> SidePanelPresentation {
        let selected = match self.gate.state() {
            GateState::Idle => None,
            GateState::Previewing { kind, .. } | GateState::AwaitingAnswer { kind, .. } => {
                Some(*kind)
            }
        };

        let mut buttons: Vec<ButtonPresentation> = TowerKind::ALL
            .into_iter()
            .map(|kind| {
                let cooldown = self.gate.cooldown(kind);
                let (fill, label) = if cooldown == 0 {
                    (palette.tower(kind), kind.name().to_owned())
                } else {
                    let seconds = cooldown.div_ceil(TICKS_PER_SECOND);
                    (palette.disabled(), format!("{} {seconds}s", kind.name()))
                };
                let button = ButtonPresentation::new(
                    layout::tower_button(kind),
                    fill,
                    label,
                    20.0,
                    palette.foreground(),
                );
                if selected == Some(kind) {
                    button.with_outline(palette.foreground())
                } else {
                    button
                }
            })
            .collect();
        buttons.push(ButtonPresentation::new(
            layout::pause_button(),
            palette.panel().lighten(0.2),
            "Pause",
            20.0,
            palette.foreground(),
        ));

        SidePanelPresentation {
            bounds: layout::side_menu(),
            fill: palette.panel(),
            buttons,
        }
    }

    fn hud(&self, palette: Palette) -> Vec<TextPresentation> {
        let wave = self.director.current_wave().min(self.director.max_wave());
        let mut hud = vec![
            TextPresentation::new(
                format!(
                    "Lives: {}  Score: {}",
                    query::lives(&self.world),
                    query::score(&self.world)
                ),
                Vec2::new(10.0, 10.0),
                32.0,
                palette.foreground(),
            ),
            TextPresentation::new(
                "ESC to quit, P to pause, click to place towers",
                Vec2::new(10.0, 50.0),
                20.0,
                palette.foreground(),
            ),
            TextPresentation::new(
                format!("Wave {wave}/{}", self.director.max_wave()),
                Vec2::new(10.0, 76.0),
                20.0,
                palette.foreground(),
            ),
        ];
        if let Some(feedback) = self.feedback {
            hud.push(TextPresentation::new(
                feedback.message,
                Vec2::new(10.0, 104.0),
                28.0,
                palette.warning(),
            ));
        }
        hud
    }

    fn preview(&self, palette: Palette) -> Option<TowerPresentation> {
        let (kind, position) = match self.gate.state() {
            GateState::Idle => return None,
            GateState::Previewing { kind, position }
            | GateState::AwaitingAnswer { kind, position, .. } => (*kind, *position),
        };

        let mut preview = tower_presentation(kind, position, palette);
        preview.fill = if query::validate_placement(&self.world, position).is_ok() {
            preview.fill.with_alpha(0.5)
        } else {
            palette.warning().with_alpha(0.5)
        };
        Some(preview)
    }

    fn question(&self, palette: Palette) -> Option<QuestionPanelPresentation> {
        let GateState::AwaitingAnswer { question, .. } = self.gate.state() else {
            return None;
        };

        let count = question.options().len();
        let options = question
            .options()
            .iter()
            .enumerate()
            .map(|(index, option)| {
                ButtonPresentation::new(
                    layout::question_option(index, count),
                    palette.panel().lighten(0.15),
                    option.as_str(),
                    28.0,
                    palette.foreground(),
                )
            })
            .collect();

        Some(QuestionPanelPresentation {
            bounds: layout::question_panel(),
            fill: palette.panel(),
            prompt: TextPresentation::centered(
                question.prompt(),
                layout::question_prompt(),
                32.0,
                palette.foreground(),
            ),
            options,
        })
    }

    fn overlay(&self, palette: Palette) -> Option<OverlayPresentation> {
        if query::outcome(&self.world) == LevelOutcome::Won {
            return Some(OverlayPresentation {
                shade: palette.shade(),
                labels: vec![TextPresentation::centered(
                    format!("Level {} complete!", self.number),
                    Vec2::new(layout::CANVAS_WIDTH / 2.0, layout::CANVAS_HEIGHT / 2.0),
                    72.0,
                    palette.foreground(),
                )],
                buttons: Vec::new(),
            });
        }
        if !self.paused {
            return None;
        }

        Some(OverlayPresentation {
            shade: palette.shade(),
            labels: vec![TextPresentation::centered(
                "Paused",
                Vec2::new(layout::CANVAS_WIDTH / 2.0, 220.0),
                64.0,
                palette.foreground(),
            )],
            buttons: PauseChoice::ALL
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
        })
    }
}

fn tower_presentation(kind: TowerKind, position: Position, palette: Palette) -> TowerPresentation {
    TowerPresentation {
        center: to_vec2(position),
        half_extent: TOWER_HALF_EXTENT,
        fill: palette.tower(kind),
        range: kind.range(),
        range_color: palette.range(),
    }
}

fn to_position(point: Vec2) -> Position {
    Position::new(point.x, point.y)
}

fn to_vec2(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}
