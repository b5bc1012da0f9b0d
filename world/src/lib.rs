#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Puzzle Defence.

mod towers;

use puzzle_defence_core::{
    BulletId, Command, EnemyId, EnemyVariant, Event, HitPoints, LevelOutcome, PlacementError,
    PlacementRules, Position, TowerId, WaypointPath, ACQUISITION_DELAY_TICKS, BULLET_HIT_THRESHOLD,
    BULLET_SPEED, STARTING_LIVES,
};

use towers::TowerRegistry;

/// Represents the authoritative Puzzle Defence world state.
#[derive(Debug)]
pub struct World {
    path: WaypointPath,
    rules: PlacementRules,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    towers: TowerRegistry,
    bullets: Vec<Bullet>,
    next_bullet_id: BulletId,
    lives: u32,
    score: u32,
    outcome: LevelOutcome,
    tick_index: u64,
}

impl World {
    /// Creates a world laid out for the first level.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(
            WaypointPath::level_one(),
            PlacementRules::default(),
            STARTING_LIVES,
        )
    }

    /// Creates a world using a custom path, placement rules and life count.
    #[must_use]
    pub fn with_layout(path: WaypointPath, rules: PlacementRules, lives: u32) -> Self {
        Self {
            path,
            rules,
            enemies: Vec::new(),
            next_enemy_id: EnemyId::new(0),
            towers: TowerRegistry::new(),
            bullets: Vec::new(),
            next_bullet_id: BulletId::new(0),
            lives,
            score: 0,
            outcome: LevelOutcome::InProgress,
            tick_index: 0,
        }
    }

    fn enemy_index(&self, id: EnemyId) -> Option<usize> {
        self.enemies.binary_search_by_key(&id, |enemy| enemy.id).ok()
    }

    fn validate_placement(&self, position: Position) -> Result<(), PlacementError> {
        if self.outcome.is_terminal() {
            return Err(PlacementError::LevelFinished);
        }
        self.rules
            .validate(position, self.towers.positions(), &self.path)
    }

    fn spawn_enemy(&mut self, variant: EnemyVariant, out_events: &mut Vec<Event>) {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        self.enemies.push(Enemy {
            id,
            variant,
            position: self.path.start(),
            path_index: 0,
            current_speed: variant.base_speed(),
            hit_points: variant.starting_hit_points(),
        });
        out_events.push(Event::EnemySpawned { enemy: id, variant });
    }

    fn fire_bullet(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemy_index(target).is_none() {
            return;
        }
        if self
            .bullets
            .iter()
            .any(|bullet| bullet.tower == tower && bullet.target == target)
        {
            return;
        }
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        let Some(fire_rate) = state.kind.fire_rate() else {
            return;
        };
        if state.cooldown > 0 || state.acquisition_delay > 0 || state.target != Some(target) {
            return;
        }

        state.cooldown = fire_rate;
        let origin = state.position;
        let id = self.next_bullet_id;
        self.next_bullet_id = BulletId::new(id.get().saturating_add(1));
        self.bullets.push(Bullet {
            id,
            tower,
            target,
            position: origin,
        });
        out_events.push(Event::BulletFired {
            bullet: id,
            tower,
            target,
        });
    }

    fn advance_bullets(&mut self, out_events: &mut Vec<Event>) {
        let in_flight = std::mem::take(&mut self.bullets);
        for mut bullet in in_flight {
            let Some(index) = self.enemy_index(bullet.target) else {
                out_events.push(Event::BulletDiscarded { bullet: bullet.id });
                continue;
            };

            let destination = self.enemies[index].position;
            let (next, _) = bullet.position.step_toward(destination, BULLET_SPEED);
            bullet.position = next;
            if next.distance_to(destination) >= BULLET_HIT_THRESHOLD {
                self.bullets.push(bullet);
                continue;
            }

            out_events.push(Event::BulletHit {
                bullet: bullet.id,
                enemy: bullet.target,
            });
            let enemy = &mut self.enemies[index];
            enemy.hit_points = enemy.hit_points.damaged(1);
            if enemy.hit_points.is_depleted() {
                let defeated = self.enemies.remove(index);
                self.score = self.score.saturating_add(1);
                out_events.push(Event::EnemyDefeated {
                    enemy: defeated.id,
                    variant: defeated.variant,
                    score: self.score,
                });
            }
        }
    }

    fn advance_enemies(&mut self, out_events: &mut Vec<Event>) {
        let final_index = self.path.final_index();
        let mut escaped: Vec<EnemyId> = Vec::new();

        for enemy in &mut self.enemies {
            let Some(waypoint) = self.path.waypoint(enemy.path_index + 1) else {
                escaped.push(enemy.id);
                continue;
            };
            let (position, arrived) = enemy.position.step_toward(waypoint, enemy.current_speed);
            enemy.position = position;
            if arrived {
                enemy.path_index += 1;
                if enemy.path_index >= final_index {
                    escaped.push(enemy.id);
                }
            }
        }

        for id in escaped {
            if let Some(index) = self.enemy_index(id) {
                let _ = self.enemies.remove(index);
            }
            self.lives = self.lives.saturating_sub(1);
            out_events.push(Event::EnemyEscaped {
                enemy: id,
                lives: self.lives,
            });
            if self.lives == 0 && self.outcome == LevelOutcome::InProgress {
                self.outcome = LevelOutcome::Lost;
                out_events.push(Event::LevelLost);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the level reached a terminal outcome every command is ignored, except
/// that tower placements are answered with a rejection.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.outcome.is_terminal() {
        if let Command::PlaceTower { kind, position } = command {
            out_events.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason: PlacementError::LevelFinished,
            });
        }
        return;
    }

    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            for enemy in &mut world.enemies {
                enemy.current_speed = enemy.variant.base_speed();
            }
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::SpawnEnemy { variant } => world.spawn_enemy(variant, out_events),
        Command::SlowEnemy { enemy, factor } => {
            if let Some(index) = world.enemy_index(enemy) {
                let enemy = &mut world.enemies[index];
                enemy.current_speed = enemy
                    .current_speed
                    .min(enemy.variant.base_speed() * factor.clamp(0.0, 1.0));
            }
        }
        Command::ReleaseTarget { tower } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.acquisition_delay = 0;
                if state.target.take().is_some() {
                    out_events.push(Event::TargetReleased { tower });
                }
            }
        }
        Command::CoolDownTower { tower } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.cooldown = state.cooldown.saturating_sub(1);
            }
        }
        Command::LockTarget { tower, enemy } => {
            if world.enemy_index(enemy).is_none() {
                return;
            }
            if let Some(state) = world.towers.get_mut(tower) {
                if state.kind.fire_rate().is_none() || state.target == Some(enemy) {
                    return;
                }
                state.target = Some(enemy);
                state.acquisition_delay = ACQUISITION_DELAY_TICKS;
                out_events.push(Event::TargetAcquired { tower, enemy });
            }
        }
        Command::SpinUpTower { tower } => {
            if let Some(state) = world.towers.get_mut(tower) {
                state.acquisition_delay = state.acquisition_delay.saturating_sub(1);
            }
        }
        Command::FireBullet { tower, target } => world.fire_bullet(tower, target, out_events),
        Command::AdvanceBullets => world.advance_bullets(out_events),
        Command::AdvanceEnemies => world.advance_enemies(out_events),
        Command::PlaceTower { kind, position } => match world.validate_placement(position) {
            Ok(()) => {
                let tower = world.towers.insert(kind, position);
                out_events.push(Event::TowerPlaced {
                    tower,
                    kind,
                    position,
                });
            }
            Err(reason) => out_events.push(Event::TowerPlacementRejected {
                kind,
                position,
                reason,
            }),
        },
        Command::DeclareVictory => {
            world.outcome = LevelOutcome::Won;
            out_events.push(Event::LevelWon);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use puzzle_defence_core::{
        BulletSnapshot, BulletView, EnemySnapshot, EnemyView, LevelOutcome, PlacementError,
        PlacementRules, Position, TowerView, WaypointPath,
    };

    use super::World;

    /// Provides read-only access to the path enemies walk.
    #[must_use]
    pub fn path(world: &World) -> &WaypointPath {
        &world.path
    }

    /// Placement rules enforced by the world.
    #[must_use]
    pub fn placement_rules(world: &World) -> &PlacementRules {
        &world.rules
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    variant: enemy.variant,
                    position: enemy.position,
                    path_index: enemy.path_index,
                    current_speed: enemy.current_speed,
                    hit_points: enemy.hit_points,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the towers placed in the level.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the bullets in flight.
    #[must_use]
    pub fn bullet_view(world: &World) -> BulletView {
        BulletView::from_snapshots(
            world
                .bullets
                .iter()
                .map(|bullet| BulletSnapshot {
                    id: bullet.id,
                    tower: bullet.tower,
                    target: bullet.target,
                    position: bullet.position,
                })
                .collect(),
        )
    }

    /// Number of enemies currently walking the path.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Enemies defeated so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Current terminal state of the level.
    #[must_use]
    pub fn outcome(world: &World) -> LevelOutcome {
        world.outcome
    }

    /// Number of ticks simulated since the level started.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Evaluates whether a tower could be placed at the provided centre.
    pub fn validate_placement(world: &World, position: Position) -> Result<(), PlacementError> {
        world.validate_placement(position)
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    variant: EnemyVariant,
    position: Position,
    path_index: usize,
    current_speed: f32,
    hit_points: HitPoints,
}

#[derive(Clone, Debug)]
struct Bullet {
    id: BulletId,
    tower: TowerId,
    target: EnemyId,
    position: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzle_defence_core::{PlayArea, TowerKind};

    fn short_path() -> WaypointPath {
        WaypointPath::new(vec![Position::new(0.0, 100.0), Position::new(20.0, 100.0)])
            .expect("valid path")
    }

    fn place(world: &mut World, kind: TowerKind, position: Position) -> TowerId {
        let mut events = Vec::new();
        apply(world, Command::PlaceTower { kind, position }, &mut events);
        match events.as_slice() {
            [Event::TowerPlaced { tower, .. }] => *tower,
            other => panic!("unexpected placement events: {other:?}"),
        }
    }

    #[test]
    fn tick_restores_base_speed_after_slow() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                variant: EnemyVariant::Basic,
            },
            &mut events,
        );
        let enemy = EnemyId::new(0);

        apply(&mut world, Command::SlowEnemy { enemy, factor: 0.35 }, &mut events);
        apply(&mut world, Command::SlowEnemy { enemy, factor: 0.35 }, &mut events);
        let slowed = query::enemy_view(&world).get(enemy).map(|e| e.current_speed);
        assert_eq!(slowed, Some(2.0 * 0.35));

        apply(&mut world, Command::Tick, &mut events);
        let restored = query::enemy_view(&world).get(enemy).map(|e| e.current_speed);
        assert_eq!(restored, Some(2.0));
    }

    #[test]
    fn enemy_walks_level_one_path_and_costs_a_life() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                variant: EnemyVariant::Fast,
            },
            &mut events,
        );

        let mut ticks = 0;
        while query::live_enemy_count(&world) > 0 {
            apply(&mut world, Command::Tick, &mut events);
            apply(&mut world, Command::AdvanceEnemies, &mut events);
            ticks += 1;
            assert!(ticks < 2_000, "enemy never escaped");
        }

        assert_eq!(query::lives(&world), STARTING_LIVES - 1);
        assert!(events.contains(&Event::EnemyEscaped {
            enemy: EnemyId::new(0),
            lives: STARTING_LIVES - 1,
        }));
        assert_eq!(query::outcome(&world), LevelOutcome::InProgress);
    }

    #[test]
    fn losing_last_life_ends_level_once() {
        let mut world = World::with_layout(short_path(), PlacementRules::default(), 1);
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SpawnEnemy {
                    variant: EnemyVariant::Basic,
                },
                &mut events,
            );
        }

        for _ in 0..20 {
            apply(&mut world, Command::AdvanceEnemies, &mut events);
        }

        assert_eq!(query::outcome(&world), LevelOutcome::Lost);
        assert_eq!(query::lives(&world), 0);
        let lost = events.iter().filter(|event| **event == Event::LevelLost).count();
        assert_eq!(lost, 1);
    }

    #[test]
    fn terminal_world_rejects_placement_and_ignores_commands() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::DeclareVictory, &mut events);
        assert_eq!(events, vec![Event::LevelWon]);

        events.clear();
        apply(&mut world, Command::DeclareVictory, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        let position = Position::new(600.0, 300.0);
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Pulse,
                position,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                kind: TowerKind::Pulse,
                position,
                reason: PlacementError::LevelFinished,
            }]
        );
        assert_eq!(query::tick_index(&world), 0);
    }

    #[test]
    fn placement_is_revalidated_against_existing_towers() {
        let mut world = World::new();
        let _ = place(&mut world, TowerKind::Pulse, Position::new(600.0, 300.0));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Sniper,
                position: Position::new(620.0, 300.0),
            },
            &mut events,
        );

        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::TooCloseToTower,
                ..
            }]
        ));
        assert_eq!(query::tower_view(&world).iter().count(), 1);
    }

    #[test]
    fn fire_requires_lock_and_finished_spin_up() {
        let rules = PlacementRules {
            play_area: PlayArea::new(400.0, 400.0),
            ..PlacementRules::default()
        };
        let path =
            WaypointPath::new(vec![Position::new(0.0, 100.0), Position::new(400.0, 100.0)])
                .expect("valid path");
        let mut world = World::with_layout(path, rules, 3);
        let tower = place(&mut world, TowerKind::Rapid, Position::new(0.0, 160.0));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                variant: EnemyVariant::Durable,
            },
            &mut events,
        );
        let enemy = EnemyId::new(0);

        events.clear();
        apply(&mut world, Command::FireBullet { tower, target: enemy }, &mut events);
        assert!(events.is_empty(), "tower without lock must not fire");

        apply(&mut world, Command::LockTarget { tower, enemy }, &mut events);
        apply(&mut world, Command::FireBullet { tower, target: enemy }, &mut events);
        assert_eq!(events, vec![Event::TargetAcquired { tower, enemy }]);

        for _ in 0..ACQUISITION_DELAY_TICKS {
            apply(&mut world, Command::SpinUpTower { tower }, &mut events);
        }
        events.clear();
        apply(&mut world, Command::FireBullet { tower, target: enemy }, &mut events);
        apply(&mut world, Command::FireBullet { tower, target: enemy }, &mut events);
        assert_eq!(
            events,
            vec![Event::BulletFired {
                bullet: BulletId::new(0),
                tower,
                target: enemy,
            }]
        );

        let snapshot = query::tower_view(&world).into_vec()[0];
        assert_eq!(snapshot.cooldown, 12);
        assert!(query::bullet_view(&world).in_flight(tower, enemy));
    }

    #[test]
    fn bullets_damage_then_defeat_and_discard_orphans() {
        let rules = PlacementRules {
            play_area: PlayArea::new(400.0, 400.0),
            ..PlacementRules::default()
        };
        let path =
            WaypointPath::new(vec![Position::new(0.0, 100.0), Position::new(400.0, 100.0)])
                .expect("valid path");
        let mut world = World::with_layout(path, rules, 3);
        let near = place(&mut world, TowerKind::Rapid, Position::new(0.0, 160.0));
        let far = place(&mut world, TowerKind::Pulse, Position::new(300.0, 300.0));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                variant: EnemyVariant::Basic,
            },
            &mut events,
        );
        let enemy = EnemyId::new(0);
        for tower in [near, far] {
            apply(&mut world, Command::LockTarget { tower, enemy }, &mut events);
            for _ in 0..ACQUISITION_DELAY_TICKS {
                apply(&mut world, Command::SpinUpTower { tower }, &mut events);
            }
            apply(&mut world, Command::FireBullet { tower, target: enemy }, &mut events);
        }
        assert_eq!(query::bullet_view(&world).iter().count(), 2);

        events.clear();
        for _ in 0..10 {
            apply(&mut world, Command::AdvanceBullets, &mut events);
        }

        assert!(events.contains(&Event::EnemyDefeated {
            enemy,
            variant: EnemyVariant::Basic,
            score: 1,
        }));
        assert!(events.contains(&Event::BulletDiscarded {
            bullet: BulletId::new(1),
        }));
        assert_eq!(query::score(&world), 1);
        assert_eq!(query::live_enemy_count(&world), 0);
        assert_eq!(query::bullet_view(&world).iter().count(), 0);
    }

    #[test]
    fn slow_tower_never_locks_targets() {
        let mut world = World::new();
        let tower = place(&mut world, TowerKind::Slow, Position::new(600.0, 300.0));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                variant: EnemyVariant::Basic,
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::LockTarget {
                tower,
                enemy: EnemyId::new(0),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
