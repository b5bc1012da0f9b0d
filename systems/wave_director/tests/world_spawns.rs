use puzzle_defence_core::{Command, EnemyVariant, Event, WaypointPath};
use puzzle_defence_system_wave_director::{Config, WaveDirector, STAGGER_TICKS};
use puzzle_defence_world::{self as world, query, World};

#[test]
fn director_spawns_enter_world_at_path_start() {
    let mut world = World::new();
    let mut director = WaveDirector::new(Config::level_one(42));
    let mut commands = Vec::new();
    let mut events = Vec::new();

    for _ in 0..=STAGGER_TICKS {
        commands.clear();
        director.handle(query::live_enemy_count(&world), &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }

    let spawned: Vec<EnemyVariant> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { variant, .. } => Some(*variant),
            _ => None,
        })
        .collect();
    assert_eq!(spawned, vec![EnemyVariant::Basic, EnemyVariant::Basic]);

    let start = WaypointPath::level_one().start();
    for enemy in query::enemy_view(&world).iter() {
        assert_eq!(enemy.position, start);
        assert_eq!(enemy.hit_points, EnemyVariant::Basic.starting_hit_points());
    }
}

#[test]
fn director_never_declares_victory_while_enemies_live() {
    let mut director = WaveDirector::new(Config::new(0, 0, 1, 3));
    let mut commands = Vec::new();
    for _ in 0..50 {
        director.handle(1, &mut commands);
    }

    assert!(!commands.contains(&Command::DeclareVictory));
    assert_eq!(director.current_wave(), 1);
}
