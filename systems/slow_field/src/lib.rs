#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that applies the area slow of slow towers.
//!
//! The world restores every enemy to its base speed on each `Tick`, so this
//! system re-evaluates coverage every tick. Overlapping fields do not stack.

use puzzle_defence_core::{Command, EnemyView, TowerView};

/// Slow field system emitting one `SlowEnemy` command per covered enemy.
#[derive(Debug, Default)]
pub struct SlowField;

impl SlowField {
    /// Creates a new slow field system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits slow commands for every enemy inside any slow tower's range.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<Command>) {
        for enemy in enemies.iter() {
            let factor = towers
                .iter()
                .filter(|tower| tower.covers(enemy))
                .filter_map(|tower| tower.kind.slow_factor())
                .reduce(f32::min);

            if let Some(factor) = factor {
                out.push(Command::SlowEnemy {
                    enemy: enemy.id,
                    factor,
                });
            }
        }
    }
}
