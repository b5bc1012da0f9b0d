//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use puzzle_defence_core::{EnemyId, Position, TowerId, TowerKind, TowerSnapshot};

/// State of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Centre of the tower.
    pub(crate) position: Position,
    /// Ticks remaining before the tower may fire again.
    pub(crate) cooldown: u32,
    /// Enemy the tower is tracking.
    pub(crate) target: Option<EnemyId>,
    /// Ticks remaining before the first shot at `target`.
    pub(crate) acquisition_delay: u32,
}

impl TowerState {
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            cooldown: self.cooldown,
            target: self.target,
            acquisition_delay: self.acquisition_delay,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a freshly built tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, position: Position) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                position,
                cooldown: 0,
                target: None,
                acquisition_delay: 0,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Centres of every registered tower.
    pub(crate) fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.entries.values().map(|tower| tower.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = TowerRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_tower_id.get(), 0);
    }

    #[test]
    fn inserted_towers_receive_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let first = registry.insert(TowerKind::Pulse, Position::new(10.0, 10.0));
        let second = registry.insert(TowerKind::Slow, Position::new(90.0, 10.0));

        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));

        let snapshot = registry
            .get_mut(second)
            .map(|tower| tower.snapshot())
            .expect("tower registered");
        assert_eq!(snapshot.kind, TowerKind::Slow);
        assert_eq!(snapshot.cooldown, 0);
        assert!(snapshot.target.is_none());
        assert_eq!(registry.positions().count(), 2);
    }
}
