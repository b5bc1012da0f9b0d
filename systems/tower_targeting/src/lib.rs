#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides, per tower and per tick, whether to release,
//! acquire, spin up toward or fire at a target.

use puzzle_defence_core::{BulletView, Command, EnemyId, EnemyView, TowerSnapshot, TowerView};

/// Tower targeting system that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    firing_towers: Vec<TowerSnapshot>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits targeting and firing commands for every tower that can fire.
    ///
    /// Towers are visited in identifier order and enemies in spawn order, so
    /// identical snapshots always yield identical command batches.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        bullets: &BulletView,
        out: &mut Vec<Command>,
    ) {
        self.firing_towers.clear();
        self.firing_towers.extend(
            towers
                .iter()
                .filter(|tower| tower.kind.fire_rate().is_some())
                .copied(),
        );

        for tower in &self.firing_towers {
            let target = retained_target(tower, enemies);
            if tower.target.is_some() && target.is_none() {
                out.push(Command::ReleaseTarget { tower: tower.id });
            }

            if tower.cooldown > 0 {
                out.push(Command::CoolDownTower { tower: tower.id });
                continue;
            }

            match target {
                None => {
                    if let Some(enemy) = enemies.iter().find(|enemy| tower.covers(enemy)) {
                        out.push(Command::LockTarget {
                            tower: tower.id,
                            enemy: enemy.id,
                        });
                    }
                }
                Some(_) if tower.acquisition_delay > 0 => {
                    out.push(Command::SpinUpTower { tower: tower.id });
                }
                Some(enemy) => {
                    if !bullets.in_flight(tower.id, enemy) {
                        out.push(Command::FireBullet {
                            tower: tower.id,
                            target: enemy,
                        });
                    }
                }
            }
        }
    }
}

fn retained_target(tower: &TowerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
    let id = tower.target?;
    enemies
        .get(id)
        .filter(|enemy| tower.covers(enemy))
        .map(|enemy| enemy.id)
}
