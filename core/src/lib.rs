#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Puzzle Defence engine.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what actually happened. Systems read immutable views ([`EnemyView`],
//! [`TowerView`], [`BulletView`]) and respond exclusively with new command
//! batches.

mod geometry;

pub use geometry::{distance_to_segment, PathError, PlayArea, Position, WaypointPath};

use serde::{Deserialize, Serialize};

/// Number of simulation ticks that make up one second of play.
pub const TICKS_PER_SECOND: u32 = 60;

/// Spin-up ticks a tower waits after locking a new target before its first shot.
pub const ACQUISITION_DELAY_TICKS: u32 = 15;

/// Radius of an enemy body in canvas units.
pub const ENEMY_RADIUS: f32 = 20.0;

/// Distance a bullet travels per tick.
pub const BULLET_SPEED: f32 = 8.0;

/// Radius of a bullet in canvas units.
pub const BULLET_RADIUS: f32 = 8.0;

/// Distance at which a bullet resolves against its target.
pub const BULLET_HIT_THRESHOLD: f32 = BULLET_RADIUS + ENEMY_RADIUS;

/// Half of the side length of the square drawn for a tower.
pub const TOWER_HALF_EXTENT: f32 = 20.0;

/// Lives granted at the start of a level.
pub const STARTING_LIVES: u32 = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by one tick and restores every enemy to
    /// its base speed so slow effects can be re-applied.
    Tick,
    /// Moves a new enemy of the given variant onto the first waypoint.
    SpawnEnemy {
        /// Variant of the enemy entering the level.
        variant: EnemyVariant,
    },
    /// Scales an enemy's current speed for the remainder of the tick.
    SlowEnemy {
        /// Enemy affected by the slow field.
        enemy: EnemyId,
        /// Multiplier applied to the enemy's base speed.
        factor: f32,
    },
    /// Drops the tower's current target and resets its acquisition delay.
    ReleaseTarget {
        /// Tower losing its target.
        tower: TowerId,
    },
    /// Decrements the tower's firing cooldown by one tick.
    CoolDownTower {
        /// Tower whose cooldown elapses.
        tower: TowerId,
    },
    /// Locks a live enemy as the tower's target and arms the acquisition delay.
    LockTarget {
        /// Tower acquiring the target.
        tower: TowerId,
        /// Enemy being tracked.
        enemy: EnemyId,
    },
    /// Decrements the tower's acquisition delay by one tick.
    SpinUpTower {
        /// Tower spinning up toward its first shot.
        tower: TowerId,
    },
    /// Requests that a tower launch a bullet at its locked target.
    FireBullet {
        /// Tower firing the bullet.
        tower: TowerId,
        /// Enemy the bullet chases.
        target: EnemyId,
    },
    /// Moves every bullet toward its target and resolves hits.
    AdvanceBullets,
    /// Moves every enemy along the waypoint path and resolves escapes.
    AdvanceEnemies,
    /// Requests construction of a tower centred on the provided position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Centre of the tower on the canvas.
        position: Position,
    },
    /// Marks the level as won once every wave has been cleared.
    DeclareVictory,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
    },
    /// Confirms that an enemy entered the level.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Variant of the spawned enemy.
        variant: EnemyVariant,
    },
    /// Reports that a tower locked a new target.
    TargetAcquired {
        /// Tower that acquired the target.
        tower: TowerId,
        /// Enemy being tracked.
        enemy: EnemyId,
    },
    /// Reports that a tower lost its target.
    TargetReleased {
        /// Tower that released its target.
        tower: TowerId,
    },
    /// Confirms that a tower launched a bullet.
    BulletFired {
        /// Identifier assigned to the bullet.
        bullet: BulletId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the bullet chases.
        target: EnemyId,
    },
    /// Reports that a bullet reached its target and dealt damage.
    BulletHit {
        /// Bullet that resolved.
        bullet: BulletId,
        /// Enemy that took the damage.
        enemy: EnemyId,
    },
    /// Reports that a bullet vanished because its target no longer exists.
    BulletDiscarded {
        /// Bullet that was discarded.
        bullet: BulletId,
    },
    /// Reports that an enemy ran out of hit points.
    EnemyDefeated {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Variant of the destroyed enemy.
        variant: EnemyVariant,
        /// Score after awarding the kill.
        score: u32,
    },
    /// Reports that an enemy reached the final waypoint.
    EnemyEscaped {
        /// Enemy that left the level.
        enemy: EnemyId,
        /// Lives remaining after the deduction.
        lives: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Centre of the tower.
        position: Position,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Requested centre of the tower.
        position: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the level has been won.
    LevelWon,
    /// Announces that the level has been lost.
    LevelLost,
}

/// Terminal state tracking for a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LevelOutcome {
    /// The level is still being played.
    #[default]
    InProgress,
    /// Every wave was cleared.
    Won,
    /// Lives reached zero.
    Lost,
}

impl LevelOutcome {
    /// Reports whether the level reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Unique identifier assigned to an enemy.
///
/// Identifiers are allocated in spawn order, so sorting by identifier yields
/// the order in which enemies entered the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BulletId(u32);

impl BulletId {
    /// Creates a new bullet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the bullet identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining hit points of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitPoints(u32);

impl HitPoints {
    /// Creates a hit point counter with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric hit point value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Returns the counter after absorbing `amount` points of damage.
    #[must_use]
    pub const fn damaged(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Enemy variants that differ in speed, durability and appearance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyVariant {
    /// Standard enemy.
    Basic,
    /// Quick but fragile enemy.
    Fast,
    /// Slow enemy that absorbs several hits.
    Durable,
}

impl EnemyVariant {
    /// Every variant in catalog order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Fast, Self::Durable];

    /// Distance travelled per tick when unaffected by slow fields.
    #[must_use]
    pub const fn base_speed(self) -> f32 {
        match self {
            Self::Basic => 2.0,
            Self::Fast => 3.5,
            Self::Durable => 1.4,
        }
    }

    /// Hit points the variant spawns with.
    #[must_use]
    pub const fn starting_hit_points(self) -> HitPoints {
        match self {
            Self::Basic | Self::Fast => HitPoints::new(1),
            Self::Durable => HitPoints::new(4),
        }
    }

    /// Human readable variant name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Fast => "Fast",
            Self::Durable => "Durable",
        }
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Area tower that slows every enemy inside its range instead of firing.
    Slow,
    /// Short range tower with a moderate rate of fire.
    Pulse,
    /// Long range tower that fires rarely.
    Sniper,
    /// Medium range tower that fires quickly.
    Rapid,
}

impl TowerKind {
    /// Every tower kind in side menu order.
    pub const ALL: [Self; 4] = [Self::Slow, Self::Pulse, Self::Sniper, Self::Rapid];

    /// Position of the kind inside [`TowerKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Slow => 0,
            Self::Pulse => 1,
            Self::Sniper => 2,
            Self::Rapid => 3,
        }
    }

    /// Targeting radius measured in canvas units.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            Self::Slow => 120.0,
            Self::Pulse => 80.0,
            Self::Sniper => 160.0,
            Self::Rapid => 100.0,
        }
    }

    /// Ticks between consecutive shots, or `None` for towers that never fire.
    #[must_use]
    pub const fn fire_rate(self) -> Option<u32> {
        match self {
            Self::Slow => None,
            Self::Pulse => Some(30),
            Self::Sniper => Some(75),
            Self::Rapid => Some(12),
        }
    }

    /// Speed multiplier applied to enemies in range, or `None` for firing towers.
    #[must_use]
    pub const fn slow_factor(self) -> Option<f32> {
        match self {
            Self::Slow => Some(0.35),
            Self::Pulse | Self::Sniper | Self::Rapid => None,
        }
    }

    /// Label shown in the side menu.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Pulse => "Pulse",
            Self::Sniper => "Sniper",
            Self::Rapid => "Rapid",
        }
    }
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// The requested centre lies outside the play area.
    #[error("position lies outside the play area")]
    OutOfBounds,
    /// The requested centre is too close to an existing tower.
    #[error("position is too close to another tower")]
    TooCloseToTower,
    /// The requested centre is too close to the enemy path.
    #[error("position is too close to the enemy path")]
    TooCloseToPath,
    /// The level already ended.
    #[error("the level has already finished")]
    LevelFinished,
}

/// Spacing rules that decide whether a tower may be placed at a position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementRules {
    /// Minimum distance between the centres of two towers.
    pub min_tower_spacing: f32,
    /// Minimum distance between a tower centre and any path segment.
    pub min_path_distance: f32,
    /// Region that may hold towers.
    pub play_area: PlayArea,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            min_tower_spacing: 50.0,
            min_path_distance: 40.0,
            play_area: PlayArea::level_one(),
        }
    }
}

impl PlacementRules {
    /// Checks a candidate tower centre against the bounds, existing towers and the path.
    ///
    /// A candidate is valid when it lies inside the play area, its distance to
    /// every tower centre is at least `min_tower_spacing`, and its distance to
    /// every path segment is at least `min_path_distance`.
    pub fn validate<I>(
        &self,
        candidate: Position,
        towers: I,
        path: &WaypointPath,
    ) -> Result<(), PlacementError>
    where
        I: IntoIterator<Item = Position>,
    {
        if !self.play_area.contains(candidate) {
            return Err(PlacementError::OutOfBounds);
        }

        if towers
            .into_iter()
            .any(|tower| tower.distance_to(candidate) < self.min_tower_spacing)
        {
            return Err(PlacementError::TooCloseToTower);
        }

        if path.distance_to(candidate) < self.min_path_distance {
            return Err(PlacementError::TooCloseToPath);
        }

        Ok(())
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Variant of the enemy.
    pub variant: EnemyVariant,
    /// Current location on the canvas.
    pub position: Position,
    /// Index of the waypoint most recently reached.
    pub path_index: usize,
    /// Speed applied during the current tick.
    pub current_speed: f32,
    /// Remaining hit points.
    pub hit_points: HitPoints,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemies in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a live enemy by identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Centre of the tower.
    pub position: Position,
    /// Ticks remaining before the tower may fire again.
    pub cooldown: u32,
    /// Enemy currently tracked by the tower.
    pub target: Option<EnemyId>,
    /// Ticks remaining before the first shot at the current target.
    pub acquisition_delay: u32,
}

impl TowerSnapshot {
    /// Reports whether the enemy lies within the tower's range.
    #[must_use]
    pub fn covers(&self, enemy: &EnemySnapshot) -> bool {
        self.position.distance_to(enemy.position) <= self.kind.range()
    }
}

/// Read-only snapshot describing all towers placed within the level.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single bullet in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletSnapshot {
    /// Identifier allocated to the bullet.
    pub id: BulletId,
    /// Tower that fired the bullet.
    pub tower: TowerId,
    /// Enemy the bullet chases.
    pub target: EnemyId,
    /// Current location on the canvas.
    pub position: Position,
}

/// Read-only snapshot describing all bullets in flight.
#[derive(Clone, Debug, Default)]
pub struct BulletView {
    snapshots: Vec<BulletSnapshot>,
}

impl BulletView {
    /// Creates a new bullet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BulletSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the bullets in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &BulletSnapshot> {
        self.snapshots.iter()
    }

    /// Reports whether a bullet from `tower` is already chasing `target`.
    #[must_use]
    pub fn in_flight(&self, tower: TowerId, target: EnemyId) -> bool {
        self.snapshots
            .iter()
            .any(|bullet| bullet.tower == tower && bullet.target == target)
    }
}
