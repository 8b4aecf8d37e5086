//! Entity data: one struct for every simulated object, tagged by kind.
//!
//! Behaviour is dispatched on `EntityKind` through a small capability table
//! instead of per-kind overrides. Kind-specific state lives in `KindData`.

use std::collections::VecDeque;
use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use tl_core::cooldown::CooldownGate;
use tl_core::health::Health;

use crate::config::GameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Tree,
    Cyclop,
    Sword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Carries a `Health` and can be damaged.
    pub has_health: bool,
    /// Chases `pursuit_target` every tick.
    pub has_pursuit: bool,
    /// Clamped to the play area after integration.
    pub bounded: bool,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Player,
        EntityKind::Tree,
        EntityKind::Cyclop,
        EntityKind::Sword,
    ];

    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::Player => Capabilities {
                has_health: true,
                has_pursuit: false,
                bounded: true,
            },
            Self::Tree => Capabilities {
                has_health: true,
                has_pursuit: false,
                bounded: false,
            },
            Self::Cyclop => Capabilities {
                has_health: true,
                has_pursuit: true,
                bounded: true,
            },
            Self::Sword => Capabilities {
                has_health: false,
                has_pursuit: false,
                bounded: false,
            },
        }
    }

    pub fn texture_key(self) -> &'static str {
        match self {
            Self::Player => "character",
            Self::Tree => "tree",
            Self::Cyclop => "cyclop",
            Self::Sword => "sword",
        }
    }

    pub fn depth(self) -> i32 {
        match self {
            Self::Tree => 10,
            Self::Sword => 1000,
            Self::Player | Self::Cyclop => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    /// Out of gameplay, still visible until its fade completes.
    Removing { since_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseKind {
    /// Red flash with a horizontal stretch.
    Hit,
    /// Squeeze played by the player when cutting.
    Cut,
    /// Tree tilts and springs back.
    Sway,
    FadeOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub kind: PulseKind,
    pub started_ms: u64,
    pub duration_ms: u64,
}

impl Pulse {
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms);
        (elapsed as f32 / self.duration_ms as f32).min(1.0)
    }

    pub fn finished(&self, now_ms: u64) -> bool {
        now_ms >= self.started_ms + self.duration_ms
    }
}

/// Recent positions sampled while dashing; ghosts are read back at a fixed
/// tick spacing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashTrail {
    samples: VecDeque<Vec2>,
    ghost_count: usize,
    spacing: usize,
}

impl DashTrail {
    pub fn new(ghost_count: usize, spacing: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            ghost_count,
            spacing: spacing.max(1),
        }
    }

    fn capacity(&self) -> usize {
        (self.ghost_count + 1) * self.spacing
    }

    pub fn start(&mut self, position: Vec2) {
        self.samples.clear();
        self.samples.extend(std::iter::repeat(position).take(self.capacity()));
    }

    pub fn push(&mut self, position: Vec2) {
        if self.samples.is_empty() {
            return;
        }
        self.samples.push_front(position);
        self.samples.truncate(self.capacity());
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.samples.is_empty()
    }

    /// Ghost positions, nearest first.
    pub fn ghosts(&self) -> Vec<Vec2> {
        (0..self.ghost_count)
            .filter_map(|i| self.samples.get((i + 1) * self.spacing).copied())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashState {
    pub gate: CooldownGate,
    pub speed: f32,
    pub duration_ms: u64,
    pub active_until_ms: u64,
    pub trail: DashTrail,
}

impl DashState {
    pub fn is_dashing(&self, now_ms: u64) -> bool {
        now_ms < self.active_until_ms
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerData {
    pub cutting_range: f32,
    pub cut_gate: CooldownGate,
    pub sword_gate: CooldownGate,
    pub dash: DashState,
    pub range_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclopData {
    /// Non-owning; the target may be gone.
    pub target: EntityId,
    pub base_speed: f32,
    pub slowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwordData {
    /// Non-owning.
    pub thrower: EntityId,
    pub spent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindData {
    Player(PlayerData),
    Tree,
    Cyclop(CyclopData),
    Sword(SwordData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub half_size: Vec2,
    pub speed: f32,
    pub health: Option<Health>,
    pub damage: u32,
    pub facing_left: bool,
    pub scale: f32,
    pub rotation: f32,
    pub pulse: Option<Pulse>,
    pub lifecycle: Lifecycle,
    pub data: KindData,
}

impl Entity {
    pub fn player(id: EntityId, config: &GameConfig) -> Self {
        let player = &config.player;
        Self {
            id,
            position: player.start,
            velocity: Vec2::ZERO,
            half_size: player.half_size,
            speed: player.speed,
            health: health_for(EntityKind::Player, player.max_life),
            damage: player.damage,
            facing_left: false,
            scale: 2.0,
            rotation: 0.0,
            pulse: None,
            lifecycle: Lifecycle::Active,
            data: KindData::Player(PlayerData {
                cutting_range: player.cutting_range,
                cut_gate: CooldownGate::new(player.cut_delay_ms),
                sword_gate: CooldownGate::new(config.sword.cooldown_ms),
                dash: DashState {
                    gate: CooldownGate::new(config.dash.cooldown_ms),
                    speed: config.dash.speed,
                    duration_ms: config.dash.duration_ms,
                    active_until_ms: 0,
                    trail: DashTrail::new(config.dash.ghost_count, config.dash.ghost_spacing),
                },
                range_visible: false,
            }),
        }
    }

    pub fn tree(id: EntityId, position: Vec2, config: &GameConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            half_size: config.tree.half_size,
            speed: 0.0,
            health: health_for(EntityKind::Tree, config.tree.max_life),
            damage: 0,
            facing_left: false,
            scale: config.tree.scale,
            rotation: 0.0,
            pulse: None,
            lifecycle: Lifecycle::Active,
            data: KindData::Tree,
        }
    }

    pub fn cyclop(id: EntityId, position: Vec2, target: EntityId, config: &GameConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            half_size: config.enemy.half_size,
            speed: config.enemy.speed,
            health: health_for(EntityKind::Cyclop, config.enemy.max_life),
            damage: 1,
            facing_left: false,
            scale: 2.0,
            rotation: 0.0,
            pulse: None,
            lifecycle: Lifecycle::Active,
            data: KindData::Cyclop(CyclopData {
                target,
                base_speed: config.enemy.speed,
                slowed: false,
            }),
        }
    }

    /// Sword flying along `angle` (radians, 0 = +x).
    pub fn sword(
        id: EntityId,
        position: Vec2,
        angle: f32,
        thrower: EntityId,
        config: &GameConfig,
    ) -> Self {
        let direction = Vec2::from_angle(angle);
        Self {
            id,
            position,
            velocity: direction * config.sword.speed,
            half_size: config.sword.half_size,
            speed: config.sword.speed,
            health: health_for(EntityKind::Sword, 0),
            damage: config.sword.damage,
            facing_left: false,
            scale: 2.0,
            rotation: angle + FRAC_PI_2,
            pulse: None,
            lifecycle: Lifecycle::Active,
            data: KindData::Sword(SwordData {
                thrower,
                spent: false,
            }),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.data {
            KindData::Player(_) => EntityKind::Player,
            KindData::Tree => EntityKind::Tree,
            KindData::Cyclop(_) => EntityKind::Cyclop,
            KindData::Sword(_) => EntityKind::Sword,
        }
    }

    /// Who this entity chases, for kinds with pursuit.
    pub fn pursuit_target(&self) -> Option<EntityId> {
        if !self.kind().capabilities().has_pursuit {
            return None;
        }
        match &self.data {
            KindData::Cyclop(cyclop) => Some(cyclop.target),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Active and, when it has health, still alive.
    pub fn is_interactable(&self) -> bool {
        self.is_active() && self.health.map_or(true, |health| health.is_alive())
    }

    pub fn start_pulse(&mut self, kind: PulseKind, now_ms: u64, duration_ms: u64) {
        self.pulse = Some(Pulse {
            kind,
            started_ms: now_ms,
            duration_ms,
        });
    }

    pub fn as_player(&self) -> Option<&PlayerData> {
        match &self.data {
            KindData::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.data {
            KindData::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_cyclop_mut(&mut self) -> Option<&mut CyclopData> {
        match &mut self.data {
            KindData::Cyclop(cyclop) => Some(cyclop),
            _ => None,
        }
    }

    pub fn as_sword(&self) -> Option<&SwordData> {
        match &self.data {
            KindData::Sword(sword) => Some(sword),
            _ => None,
        }
    }

    pub fn as_sword_mut(&mut self) -> Option<&mut SwordData> {
        match &mut self.data {
            KindData::Sword(sword) => Some(sword),
            _ => None,
        }
    }
}

fn health_for(kind: EntityKind, max_life: u32) -> Option<Health> {
    kind.capabilities()
        .has_health
        .then(|| Health::new(max_life))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table_matches_kinds() {
        assert!(EntityKind::Cyclop.capabilities().has_pursuit);
        assert!(!EntityKind::Sword.capabilities().has_health);
        assert!(!EntityKind::Player.capabilities().has_pursuit);
        assert!(!EntityKind::Tree.capabilities().bounded);
        for kind in EntityKind::ALL {
            assert!(!kind.texture_key().is_empty());
        }
    }

    #[test]
    fn constructors_follow_capabilities() {
        let config = GameConfig::default();
        let entities = [
            Entity::player(EntityId(0), &config),
            Entity::tree(EntityId(1), Vec2::ZERO, &config),
            Entity::cyclop(EntityId(2), Vec2::ZERO, EntityId(0), &config),
            Entity::sword(EntityId(3), Vec2::ZERO, 0.0, EntityId(0), &config),
        ];
        for entity in &entities {
            assert_eq!(
                entity.health.is_some(),
                entity.kind().capabilities().has_health,
                "{:?}",
                entity.kind()
            );
            assert_eq!(
                entity.pursuit_target().is_some(),
                entity.kind().capabilities().has_pursuit,
                "{:?}",
                entity.kind()
            );
        }
    }

    #[test]
    fn sword_velocity_follows_angle() {
        let config = GameConfig::default();
        let sword = Entity::sword(
            EntityId(3),
            Vec2::ZERO,
            std::f32::consts::FRAC_PI_2,
            EntityId(0),
            &config,
        );
        assert!(sword.velocity.x.abs() < 1e-3);
        assert!((sword.velocity.y - config.sword.speed).abs() < 1e-3);
        assert!((sword.rotation - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn pulse_progress_saturates() {
        let pulse = Pulse {
            kind: PulseKind::Hit,
            started_ms: 100,
            duration_ms: 100,
        };
        assert_eq!(pulse.progress(100), 0.0);
        assert!((pulse.progress(150) - 0.5).abs() < 1e-6);
        assert_eq!(pulse.progress(400), 1.0);
        assert!(!pulse.finished(199));
        assert!(pulse.finished(200));
    }

    #[test]
    fn dash_trail_reads_ghosts_at_spacing() {
        let mut trail = DashTrail::new(4, 3);
        assert!(trail.ghosts().is_empty());
        trail.start(Vec2::ZERO);
        assert_eq!(trail.ghosts(), vec![Vec2::ZERO; 4]);
        for i in 1..=15 {
            trail.push(Vec2::new(i as f32, 0.0));
        }
        // Newest sample is 15; ghosts sit 3, 6, 9 and 12 ticks behind it.
        let xs: Vec<f32> = trail.ghosts().iter().map(|g| g.x).collect();
        assert_eq!(xs, vec![12.0, 9.0, 6.0, 3.0]);
        trail.clear();
        assert!(!trail.is_active());
    }

    #[test]
    fn dead_entity_is_not_interactable() {
        let config = GameConfig::default();
        let mut tree = Entity::tree(EntityId(1), Vec2::ZERO, &config);
        assert!(tree.is_interactable());
        if let Some(health) = tree.health.as_mut() {
            health.destroy();
        }
        assert!(tree.is_active());
        assert!(!tree.is_interactable());
    }
}
