#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for emitting enemy spawn commands.
//!
//! Each wave is built from a fixed recipe, shuffled with a seeded RNG so the
//! variants interleave, and released one enemy at a time. A wave only ends
//! once its pending queue is drained and the world reports no live enemies.

use std::collections::VecDeque;

use puzzle_defence_core::{Command, EnemyVariant};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Ticks between the spawn offsets of consecutive pending enemies.
pub const STAGGER_TICKS: u32 = 45;

/// Minimum number of ticks between two spawns.
pub const SPAWN_COOLDOWN_TICKS: u32 = 10;

/// Number of waves that must be cleared to win the first level.
pub const MAX_WAVE: u32 = 3;

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    stagger_ticks: u32,
    spawn_cooldown_ticks: u32,
    max_wave: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with explicit cadence, wave count and seed.
    #[must_use]
    pub const fn new(
        stagger_ticks: u32,
        spawn_cooldown_ticks: u32,
        max_wave: u32,
        rng_seed: u64,
    ) -> Self {
        Self {
            stagger_ticks,
            spawn_cooldown_ticks,
            max_wave,
            rng_seed,
        }
    }

    /// Configuration used by the first level.
    #[must_use]
    pub const fn level_one(rng_seed: u64) -> Self {
        Self::new(STAGGER_TICKS, SPAWN_COOLDOWN_TICKS, MAX_WAVE, rng_seed)
    }
}

/// Number of enemies of each variant that compose a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveRecipe {
    /// Basic enemies in the wave.
    pub basic: usize,
    /// Fast enemies in the wave.
    pub fast: usize,
    /// Durable enemies in the wave.
    pub durable: usize,
}

impl WaveRecipe {
    /// Recipe for the provided wave number.
    ///
    /// Waves beyond the recipe table reuse the final entry.
    #[must_use]
    pub const fn for_wave(wave: u32) -> Self {
        match wave {
            0 | 1 => Self {
                basic: 8,
                fast: 0,
                durable: 0,
            },
            2 => Self {
                basic: 8,
                fast: 4,
                durable: 0,
            },
            _ => Self {
                basic: 8,
                fast: 4,
                durable: 3,
            },
        }
    }

    /// Total number of enemies in the recipe.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.basic + self.fast + self.durable
    }

    /// Reports whether the recipe spawns nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of the provided variant within the recipe.
    #[must_use]
    pub const fn count(&self, variant: EnemyVariant) -> usize {
        match variant {
            EnemyVariant::Basic => self.basic,
            EnemyVariant::Fast => self.fast,
            EnemyVariant::Durable => self.durable,
        }
    }
}

/// Enemy waiting to enter the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingEnemy {
    /// Variant that will be spawned.
    pub variant: EnemyVariant,
    /// Ticks remaining before the enemy is eligible to spawn.
    pub spawn_delay: u32,
}

/// Builds the shuffled pending queue for wave `wave`.
///
/// Every enemy receives a delay of `shuffled_index * stagger_ticks`.
#[must_use]
pub fn start_wave<R>(wave: u32, stagger_ticks: u32, rng: &mut R) -> Vec<PendingEnemy>
where
    R: rand::Rng + ?Sized,
{
    let recipe = WaveRecipe::for_wave(wave);
    let mut variants: Vec<EnemyVariant> = Vec::with_capacity(recipe.len());
    for variant in EnemyVariant::ALL {
        variants.extend(std::iter::repeat(variant).take(recipe.count(variant)));
    }
    variants.shuffle(rng);

    variants
        .into_iter()
        .enumerate()
        .map(|(index, variant)| PendingEnemy {
            variant,
            spawn_delay: u32::try_from(index)
                .unwrap_or(u32::MAX)
                .saturating_mul(stagger_ticks),
        })
        .collect()
}

/// Stateful system that sequences waves and releases enemies over time.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    rng: ChaCha8Rng,
    current_wave: u32,
    pending: VecDeque<PendingEnemy>,
    cooldown: u32,
    victory_declared: bool,
}

impl WaveDirector {
    /// Creates a director and immediately starts the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut director = Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            current_wave: 0,
            pending: VecDeque::new(),
            cooldown: 0,
            victory_declared: false,
        };
        director.advance_wave();
        director
    }

    /// Number of the wave currently being played.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Final wave of the level.
    #[must_use]
    pub fn max_wave(&self) -> u32 {
        self.config.max_wave
    }

    /// Enemies of the current wave that have not spawned yet.
    pub fn pending(&self) -> impl Iterator<Item = &PendingEnemy> {
        self.pending.iter()
    }

    /// Reports whether the director already declared victory.
    #[must_use]
    pub fn victory_declared(&self) -> bool {
        self.victory_declared
    }

    /// Advances the director by one tick given the number of live enemies.
    pub fn handle(&mut self, live_enemies: usize, out: &mut Vec<Command>) {
        if self.victory_declared {
            return;
        }

        if self.pending.is_empty() && live_enemies == 0 {
            self.advance_wave();
            if self.current_wave > self.config.max_wave {
                self.victory_declared = true;
                tracing::info!(waves = self.config.max_wave, "all waves cleared");
                out.push(Command::DeclareVictory);
                return;
            }
        }

        let ready = self.cooldown == 0
            && self
                .pending
                .front()
                .is_some_and(|enemy| enemy.spawn_delay == 0);
        if ready {
            if let Some(enemy) = self.pending.pop_front() {
                self.cooldown = self.config.spawn_cooldown_ticks;
                out.push(Command::SpawnEnemy {
                    variant: enemy.variant,
                });
            }
        }

        // Aged after the spawn check: enemy i enters i * stagger ticks after
        // its wave starts.
        for enemy in &mut self.pending {
            enemy.spawn_delay = enemy.spawn_delay.saturating_sub(1);
        }
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    fn advance_wave(&mut self) {
        self.current_wave = self.current_wave.saturating_add(1);
        if self.current_wave > self.config.max_wave {
            return;
        }

        self.pending = start_wave(self.current_wave, self.config.stagger_ticks, &mut self.rng).into();
        self.cooldown = 0;
        tracing::info!(
            wave = self.current_wave,
            enemies = self.pending.len(),
            "wave started"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_drained(director: &mut WaveDirector) -> Vec<(u32, EnemyVariant)> {
        let mut spawns = Vec::new();
        let mut out = Vec::new();
        let wave = director.current_wave();
        for tick in 0..10_000 {
            if director.pending().next().is_none() {
                break;
            }
            out.clear();
            director.handle(1, &mut out);
            for command in &out {
                if let Command::SpawnEnemy { variant } = command {
                    spawns.push((tick, *variant));
                }
            }
        }
        assert_eq!(director.current_wave(), wave);
        spawns
    }

    #[test]
    fn recipes_match_wave_table() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for (wave, expected) in [(1, (8, 0, 0)), (2, (8, 4, 0)), (3, (8, 4, 3))] {
            let pending = start_wave(wave, STAGGER_TICKS, &mut rng);
            let count = |variant| pending.iter().filter(|e| e.variant == variant).count();
            assert_eq!(
                (
                    count(EnemyVariant::Basic),
                    count(EnemyVariant::Fast),
                    count(EnemyVariant::Durable)
                ),
                expected,
                "wave {wave}"
            );
        }
    }

    #[test]
    fn waves_beyond_table_reuse_last_recipe() {
        assert_eq!(WaveRecipe::for_wave(9), WaveRecipe::for_wave(3));
    }

    #[test]
    fn spawn_offsets_increase_by_stagger() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pending = start_wave(3, STAGGER_TICKS, &mut rng);
        for (index, enemy) in pending.iter().enumerate() {
            assert_eq!(enemy.spawn_delay, index as u32 * STAGGER_TICKS);
        }
    }

    #[test]
    fn same_seed_produces_same_order() {
        let first = start_wave(3, STAGGER_TICKS, &mut ChaCha8Rng::seed_from_u64(5));
        let second = start_wave(3, STAGGER_TICKS, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(first, second);
    }

    #[test]
    fn enemies_spawn_one_at_a_time_on_stagger() {
        let mut director = WaveDirector::new(Config::level_one(3));
        let spawns = run_until_drained(&mut director);

        assert_eq!(spawns.len(), 8);
        let ticks: Vec<u32> = spawns.iter().map(|(tick, _)| *tick).collect();
        let expected: Vec<u32> = (0..8).map(|index| index * STAGGER_TICKS).collect();
        assert_eq!(ticks, expected);
    }

    #[test]
    fn cooldown_spaces_spawns_when_stagger_is_short() {
        let mut director = WaveDirector::new(Config::new(1, 4, 1, 9));
        let spawns = run_until_drained(&mut director);

        let ticks: Vec<u32> = spawns.iter().map(|(tick, _)| *tick).collect();
        assert_eq!(ticks, vec![0, 4, 8, 12, 16, 20, 24, 28]);
    }

    #[test]
    fn wave_waits_for_live_enemies_before_advancing() {
        let mut director = WaveDirector::new(Config::level_one(1));
        let _ = run_until_drained(&mut director);

        let mut out = Vec::new();
        director.handle(2, &mut out);
        assert!(out.is_empty());
        assert_eq!(director.current_wave(), 1);

        director.handle(0, &mut out);
        assert_eq!(director.current_wave(), 2);
        assert_eq!(out.len(), 1, "next wave spawns its head immediately");
    }

    #[test]
    fn victory_is_declared_exactly_once() {
        let mut director = WaveDirector::new(Config::new(0, 0, 1, 2));
        let mut out = Vec::new();
        for _ in 0..20 {
            director.handle(0, &mut out);
        }

        let victories = out
            .iter()
            .filter(|command| **command == Command::DeclareVictory)
            .count();
        let spawns = out
            .iter()
            .filter(|command| matches!(command, Command::SpawnEnemy { .. }))
            .count();
        assert_eq!(victories, 1);
        assert_eq!(spawns, 8);
        assert!(director.victory_declared());
    }
}
