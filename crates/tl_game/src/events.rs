use glam::Vec2;

use crate::entity::EntityId;

/// Things that happened during one tick, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    RangeToggled {
        visible: bool,
    },
    TreeHit {
        tree: EntityId,
        remaining: u32,
    },
    TreeFelled {
        tree: EntityId,
        planks: u32,
    },
    SwordThrown {
        sword: EntityId,
        angle: f32,
    },
    SwordHit {
        sword: EntityId,
        target: EntityId,
    },
    SwordExpired {
        sword: EntityId,
    },
    DashStarted {
        until_ms: u64,
    },
    EnemySpawned {
        enemy: EntityId,
        position: Vec2,
    },
    EnemyHit {
        enemy: EntityId,
        remaining: u32,
    },
    EnemyKilled {
        enemy: EntityId,
    },
    EnemySlowed {
        enemy: EntityId,
    },
    EnemySpeedRestored {
        enemy: EntityId,
    },
    PlayerHit {
        enemy: EntityId,
        planks: u32,
    },
    SpeedIncreased {
        move_speed: f32,
        cut_delay_ms: u64,
    },
    RangeIncreased {
        cutting_range: f32,
    },
    ForestRegrown {
        added: usize,
    },
}
