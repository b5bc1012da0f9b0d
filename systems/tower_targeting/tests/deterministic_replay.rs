use puzzle_defence_core::{
    Command, EnemyVariant, Event, Position, TowerKind, ACQUISITION_DELAY_TICKS,
};
use puzzle_defence_system_tower_targeting::TowerTargeting;
use puzzle_defence_world::{self as world, query, World};

const TOWER_POSITION: Position = Position::new(250.0, 340.0);
const SPAWN_TICKS: [u64; 3] = [0, 20, 40];
const TICKS: u64 = 400;

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    fire_ticks: Vec<u64>,
    lock_ticks: Vec<u64>,
}

fn replay() -> ReplayOutcome {
    let mut world = World::new();
    let mut targeting = TowerTargeting::new();
    let mut events = Vec::new();
    let mut commands = Vec::new();
    let mut fire_ticks = Vec::new();
    let mut lock_ticks = Vec::new();

    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Pulse,
            position: TOWER_POSITION,
        },
        &mut events,
    );

    for tick in 0..TICKS {
        if SPAWN_TICKS.contains(&tick) {
            world::apply(
                &mut world,
                Command::SpawnEnemy {
                    variant: EnemyVariant::Basic,
                },
                &mut events,
            );
        }
        world::apply(&mut world, Command::Tick, &mut events);

        let towers = query::tower_view(&world);
        commands.clear();
        targeting.handle(
            &towers,
            &query::enemy_view(&world),
            &query::bullet_view(&world),
            &mut commands,
        );

        for command in &commands {
            match command {
                Command::FireBullet { tower, .. } => {
                    let snapshot = towers
                        .iter()
                        .find(|snapshot| snapshot.id == *tower)
                        .expect("firing tower exists");
                    assert_eq!(snapshot.cooldown, 0, "fired while cooling down");
                    assert_eq!(snapshot.acquisition_delay, 0, "fired while spinning up");
                    fire_ticks.push(tick);
                }
                Command::LockTarget { .. } => lock_ticks.push(tick),
                _ => {}
            }
        }

        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        world::apply(&mut world, Command::AdvanceBullets, &mut events);
        world::apply(&mut world, Command::AdvanceEnemies, &mut events);
    }

    ReplayOutcome {
        events,
        fire_ticks,
        lock_ticks,
    }
}

#[test]
fn replay_is_deterministic() {
    assert_eq!(replay(), replay());
}

#[test]
fn first_shot_follows_acquisition_delay() {
    let outcome = replay();
    let lock = *outcome.lock_ticks.first().expect("tower acquired a target");
    let shot = *outcome.fire_ticks.first().expect("tower fired");

    assert_eq!(shot, lock + u64::from(ACQUISITION_DELAY_TICKS) + 1);
}

#[test]
fn consecutive_shots_respect_fire_rate() {
    let outcome = replay();
    let fire_rate = u64::from(TowerKind::Pulse.fire_rate().expect("pulse fires"));

    for pair in outcome.fire_ticks.windows(2) {
        assert!(
            pair[1] - pair[0] > fire_rate,
            "shots at {} and {} are closer than the fire rate",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn pulse_tower_defends_against_basic_enemies() {
    let outcome = replay();
    let defeated = outcome
        .events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDefeated { .. }))
        .count();

    assert!(defeated >= 1, "tower never defeated an enemy");
    assert!(outcome
        .events
        .iter()
        .any(|event| matches!(event, Event::BulletFired { .. })));
}
