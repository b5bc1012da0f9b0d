#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Placement gate that turns a tower placement into a multiple-choice
//! challenge.
//!
//! A player selects a tower kind, drags a preview into the play area and
//! confirms. The gate then presents a question and only emits
//! [`Command::PlaceTower`] once it is answered correctly for a valid position.
//! Every resolved attempt arms a per-kind cooldown.

mod questions;

pub use questions::{PresentedQuestion, Question, QuestionBank, QuestionBankError};

use puzzle_defence_core::{Command, PlacementError, Position, TowerKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ticks a tower kind stays locked after a resolved placement attempt.
pub const PLACEMENT_COOLDOWN_TICKS: u32 = 120;

/// Current phase of a placement attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum GateState {
    /// No placement is in progress.
    Idle,
    /// A tower preview follows the pointer.
    Previewing {
        /// Kind being placed.
        kind: TowerKind,
        /// Current preview centre.
        position: Position,
    },
    /// The placement waits for the player to answer a question.
    AwaitingAnswer {
        /// Kind being placed.
        kind: TowerKind,
        /// Requested tower centre.
        position: Position,
        /// Question shown to the player.
        question: PresentedQuestion,
    },
}

/// Result of answering the pending question.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnswerOutcome {
    /// The answer was correct and a placement command was emitted.
    Committed {
        /// Kind that was placed.
        kind: TowerKind,
        /// Centre of the new tower.
        position: Position,
    },
    /// The answer was correct but the position is not buildable; a new
    /// question is pending.
    InvalidPosition {
        /// Reason the position was refused.
        reason: PlacementError,
    },
    /// The answer was wrong and the placement was abandoned.
    WrongAnswer {
        /// Kind whose cooldown was armed.
        kind: TowerKind,
    },
    /// No question was pending, or the option does not exist.
    Ignored,
}

/// State machine that gates tower placement behind questions.
#[derive(Debug)]
pub struct PlacementGate {
    state: GateState,
    bank: QuestionBank,
    rng: ChaCha8Rng,
    cooldowns: [u32; TowerKind::ALL.len()],
    cooldown_ticks: u32,
    last_question: Option<usize>,
}

impl PlacementGate {
    /// Creates an idle gate drawing questions from `bank`.
    #[must_use]
    pub fn new(bank: QuestionBank, rng_seed: u64) -> Self {
        Self::with_cooldown(bank, rng_seed, PLACEMENT_COOLDOWN_TICKS)
    }

    /// Creates an idle gate with a custom per-kind cooldown.
    #[must_use]
    pub fn with_cooldown(bank: QuestionBank, rng_seed: u64, cooldown_ticks: u32) -> Self {
        Self {
            state: GateState::Idle,
            bank,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            cooldowns: [0; TowerKind::ALL.len()],
            cooldown_ticks,
            last_question: None,
        }
    }

    /// Current phase of the gate.
    #[must_use]
    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Ticks remaining before `kind` may be selected again.
    #[must_use]
    pub fn cooldown(&self, kind: TowerKind) -> u32 {
        self.cooldowns[kind.index()]
    }

    /// Reports whether `kind` may be selected.
    #[must_use]
    pub fn is_ready(&self, kind: TowerKind) -> bool {
        self.cooldown(kind) == 0
    }

    /// Starts previewing `kind` at `position`.
    ///
    /// Only allowed while idle or previewing and when the kind is not cooling
    /// down. Returns whether the selection took effect.
    pub fn select(&mut self, kind: TowerKind, position: Position) -> bool {
        if matches!(self.state, GateState::AwaitingAnswer { .. }) || !self.is_ready(kind) {
            return false;
        }
        self.state = GateState::Previewing { kind, position };
        true
    }

    /// Moves the preview to follow the pointer.
    pub fn move_preview(&mut self, to: Position) {
        if let GateState::Previewing { position, .. } = &mut self.state {
            *position = to;
        }
    }

    /// Discards the preview without arming a cooldown.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self.state, GateState::Previewing { .. }) {
            return false;
        }
        self.state = GateState::Idle;
        true
    }

    /// Confirms the preview and presents a question.
    pub fn confirm(&mut self) -> bool {
        let GateState::Previewing { kind, position } = self.state else {
            return false;
        };
        let Some(question) = self.draw_question() else {
            return false;
        };
        self.state = GateState::AwaitingAnswer {
            kind,
            position,
            question,
        };
        true
    }

    /// Resolves the pending question with the display option `option`.
    ///
    /// `validate` decides whether the requested position is still buildable.
    /// A committed placement pushes a [`Command::PlaceTower`] into `out`.
    pub fn answer<F>(&mut self, option: usize, validate: F, out: &mut Vec<Command>) -> AnswerOutcome
    where
        F: FnOnce(Position) -> Result<(), PlacementError>,
    {
        let (kind, position, correct) = match &self.state {
            GateState::AwaitingAnswer {
                kind,
                position,
                question,
            } if option < question.options().len() => {
                (*kind, *position, question.is_correct(option))
            }
            _ => return AnswerOutcome::Ignored,
        };

        if !correct {
            self.resolve(kind);
            tracing::debug!(kind = kind.name(), "placement abandoned after wrong answer");
            return AnswerOutcome::WrongAnswer { kind };
        }

        match validate(position) {
            Ok(()) => {
                self.resolve(kind);
                out.push(Command::PlaceTower { kind, position });
                AnswerOutcome::Committed { kind, position }
            }
            Err(reason) => {
                tracing::debug!(kind = kind.name(), %reason, "placement position refused");
                if let Some(question) = self.draw_question() {
                    self.state = GateState::AwaitingAnswer {
                        kind,
                        position,
                        question,
                    };
                }
                AnswerOutcome::InvalidPosition { reason }
            }
        }
    }

    /// Advances every per-kind cooldown by one tick.
    pub fn tick(&mut self) {
        for cooldown in &mut self.cooldowns {
            *cooldown = cooldown.saturating_sub(1);
        }
    }

    fn resolve(&mut self, kind: TowerKind) {
        self.cooldowns[kind.index()] = self.cooldown_ticks;
        self.state = GateState::Idle;
    }

    fn draw_question(&mut self) -> Option<PresentedQuestion> {
        let count = self.bank.len();
        let index = match self.last_question {
            Some(previous) if count > 1 => {
                let pick = self.rng.gen_range(0..count - 1);
                if pick >= previous {
                    pick + 1
                } else {
                    pick
                }
            }
            _ => self.rng.gen_range(0..count.max(1)),
        };
        self.last_question = Some(index);
        self.bank.present(index, &mut self.rng)
    }
}
