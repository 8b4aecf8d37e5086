//! Contact detection: which bodies overlap this tick.
//!
//! Only detection lives here. Pushing bodies apart is the host physics
//! step's job; the simulation just needs the same overlap reports a host
//! would raise (sword vs cyclop, cyclop vs player, cyclop vs tree).
//!
//! Bodies are axis-aligned boxes centred on the entity position. A box
//! touching another edge-to-edge does not count as overlapping.

use glam::Vec2;

use crate::arena::EntityArena;
use crate::entity::{Entity, EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn of(entity: &Entity) -> Self {
        Self {
            center: entity.position,
            half: entity.half_size,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let delta = (self.center - other.center).abs();
        let reach = self.half + other.half;
        delta.x < reach.x && delta.y < reach.y
    }
}

/// Every interactable `a`-kind entity paired with each interactable `b`-kind
/// entity it overlaps, in id order.
pub fn overlapping_pairs(
    arena: &EntityArena,
    a: EntityKind,
    b: EntityKind,
) -> Vec<(EntityId, EntityId)> {
    let others: Vec<(EntityId, Aabb)> = arena
        .active(b)
        .map(|entity| (entity.id, Aabb::of(entity)))
        .collect();

    let mut pairs = Vec::new();
    for entity in arena.active(a) {
        let body = Aabb::of(entity);
        for (other_id, other_body) in &others {
            if *other_id != entity.id && body.overlaps(other_body) {
                pairs.push((entity.id, *other_id));
            }
        }
    }
    pairs
}

/// First interactable `kind` entity overlapping `body`.
pub fn first_overlap(arena: &EntityArena, body: &Aabb, kind: EntityKind) -> Option<EntityId> {
    arena
        .active(kind)
        .find(|entity| body.overlaps(&Aabb::of(entity)))
        .map(|entity| entity.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn boxed(x: f32, y: f32, hw: f32, hh: f32) -> Aabb {
        Aabb {
            center: Vec2::new(x, y),
            half: Vec2::new(hw, hh),
        }
    }

    #[test]
    fn overlapping_boxes_report_contact() {
        assert!(boxed(0.0, 0.0, 10.0, 10.0).overlaps(&boxed(15.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        assert!(!boxed(0.0, 0.0, 10.0, 10.0).overlaps(&boxed(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn separated_on_one_axis_is_enough() {
        assert!(!boxed(0.0, 0.0, 10.0, 10.0).overlaps(&boxed(5.0, 40.0, 10.0, 10.0)));
    }

    #[test]
    fn pairs_skip_inactive_entities() {
        let config = GameConfig::default();
        let mut arena = EntityArena::new();
        let player = arena.spawn(|id| Entity::player(id, &config));
        let start = config.player.start;
        let near = arena.spawn(|id| Entity::cyclop(id, start + Vec2::new(5.0, 0.0), player, &config));
        let leaving =
            arena.spawn(|id| Entity::cyclop(id, start - Vec2::new(5.0, 0.0), player, &config));
        let _far = arena.spawn(|id| Entity::cyclop(id, start + Vec2::new(500.0, 0.0), player, &config));
        arena.begin_removal(leaving, 0);

        let pairs = overlapping_pairs(&arena, EntityKind::Cyclop, EntityKind::Player);
        assert_eq!(pairs, vec![(near, player)]);

        let body = Aabb::of(arena.get(player).expect("player"));
        assert_eq!(first_overlap(&arena, &body, EntityKind::Cyclop), Some(near));
    }
}
