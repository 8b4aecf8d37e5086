//! Owning store for every entity in the scene, keyed by `EntityId`.
//!
//! Ids are handed out monotonically and never reused, so a stale id held by
//! a scheduled event or a chase target can only ever miss. Iteration is in id
//! order, which keeps queries reproducible.
//!
//! Removal is two-phase: `begin_removal` takes an entity out of gameplay
//! immediately (it stops matching `active_*` queries) while it stays in the
//! store for its fade-out; `purge` drops it for good.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::entity::{Entity, EntityId, EntityKind, Lifecycle};

#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.entities.insert(id, build(id));
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Only entities still taking part in gameplay.
    pub fn get_active_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .get_mut(&id)
            .filter(|entity| entity.is_interactable())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.values_mut()
    }

    pub fn active(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(move |entity| entity.kind() == kind && entity.is_interactable())
    }

    pub fn active_ids(&self, kind: EntityKind) -> Vec<EntityId> {
        self.active(kind).map(|entity| entity.id).collect()
    }

    pub fn active_positions(&self, kind: EntityKind) -> Vec<(EntityId, Vec2)> {
        self.active(kind)
            .map(|entity| (entity.id, entity.position))
            .collect()
    }

    pub fn count_active(&self, kind: EntityKind) -> usize {
        self.active(kind).count()
    }

    /// Returns false when the entity is missing or already leaving.
    pub fn begin_removal(&mut self, id: EntityId, now_ms: u64) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) if entity.is_active() => {
                entity.lifecycle = Lifecycle::Removing { since_ms: now_ms };
                entity.velocity = Vec2::ZERO;
                true
            }
            _ => false,
        }
    }

    /// Drops an entity that is already being removed; active ones are kept.
    pub fn purge(&mut self, id: EntityId) -> Option<Entity> {
        match self.entities.get(&id) {
            Some(entity) if !entity.is_active() => self.entities.remove(&id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn arena_with_trees(count: usize) -> (EntityArena, Vec<EntityId>) {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let ids = (0..count)
            .map(|i| arena.spawn(|id| Entity::tree(id, Vec2::new(i as f32 * 10.0, 0.0), &config)))
            .collect();
        (arena, ids)
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let (mut arena, ids) = arena_with_trees(3);
        assert_eq!(ids, vec![EntityId(0), EntityId(1), EntityId(2)]);
        assert!(arena.begin_removal(ids[2], 0));
        arena.purge(ids[2]);
        let config = GameConfig::default();
        let next = arena.spawn(|id| Entity::tree(id, Vec2::ZERO, &config));
        assert_eq!(next, EntityId(3));
    }

    #[test]
    fn removal_hides_from_queries_before_purge() {
        let (mut arena, ids) = arena_with_trees(3);
        assert!(arena.begin_removal(ids[1], 50));
        assert_eq!(arena.count_active(EntityKind::Tree), 2);
        assert_eq!(arena.len(), 3);
        assert!(arena.get_active_mut(ids[1]).is_none());
        assert!(matches!(
            arena.get(ids[1]).map(|e| e.lifecycle),
            Some(Lifecycle::Removing { since_ms: 50 })
        ));
    }

    #[test]
    fn begin_removal_is_idempotent() {
        let (mut arena, ids) = arena_with_trees(1);
        assert!(arena.begin_removal(ids[0], 0));
        assert!(!arena.begin_removal(ids[0], 10));
        assert!(!arena.begin_removal(EntityId(99), 10));
    }

    #[test]
    fn purge_requires_removal_first() {
        let (mut arena, ids) = arena_with_trees(2);
        assert!(arena.purge(ids[0]).is_none());
        assert_eq!(arena.len(), 2);
        arena.begin_removal(ids[0], 0);
        assert!(arena.purge(ids[0]).is_some());
        assert!(arena.purge(ids[0]).is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn active_positions_are_in_id_order() {
        let (arena, ids) = arena_with_trees(4);
        let listed: Vec<EntityId> = arena
            .active_positions(EntityKind::Tree)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(listed, ids);
        assert!(arena.active_ids(EntityKind::Cyclop).is_empty());
    }
}
