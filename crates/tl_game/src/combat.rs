//! Interaction rules between the player, trees, cyclops and swords.
//!
//! Every rule is a free function over `GameState`. A rule whose
//! precondition fails (gate not ready, nothing in range, target gone) leaves
//! the state untouched and reports `false`/`None`.

use glam::Vec2;
use rand::Rng;
use tl_core::health::DamageOutcome;
use tl_core::spatial::{nearest, nearest_within};

use crate::collision::{first_overlap, overlapping_pairs, Aabb};
use crate::config::GameConfig;
use crate::controls::AimTarget;
use crate::entity::{Entity, EntityId, EntityKind, PulseKind};
use crate::events::SimEvent;
use crate::schedule::{DeferredAction, ScheduledEvent};
use crate::world::GameState;

/// Damages the nearest tree in cutting range. Returns whether a cut landed.
pub fn try_cut(state: &mut GameState, config: &GameConfig) -> bool {
    let now = state.now_ms;
    let Some(player) = state.arena.get(state.player).filter(|p| p.is_interactable()) else {
        return false;
    };
    let Some(data) = player.as_player() else {
        return false;
    };
    if !data.cut_gate.ready(now) {
        log::trace!("Cut ignored: ready in {} ms", data.cut_gate.remaining_ms(now));
        return false;
    }
    let origin = player.position;
    let damage = player.damage;
    let Some((tree, _)) = nearest_within(
        origin,
        state.arena.active_positions(EntityKind::Tree),
        data.cutting_range,
    ) else {
        log::trace!("Cut ignored: no tree within {:.0}", data.cutting_range);
        return false;
    };

    if let Some(player) = state.arena.get_active_mut(state.player) {
        if let Some(data) = player.as_player_mut() {
            data.cut_gate.trigger(now);
        }
        player.start_pulse(PulseKind::Cut, now, config.effects.pulse_ms);
    }
    apply_damage(state, config, tree, damage);
    true
}

/// Applies `amount` to a tree or cyclop and plays the matching reaction.
pub fn apply_damage(
    state: &mut GameState,
    config: &GameConfig,
    target: EntityId,
    amount: u32,
) -> DamageOutcome {
    let now = state.now_ms;
    let Some(entity) = state.arena.get_active_mut(target) else {
        return DamageOutcome::Ignored;
    };
    let kind = entity.kind();
    if !kind.capabilities().has_health {
        return DamageOutcome::Ignored;
    }
    let Some(health) = entity.health.as_mut() else {
        return DamageOutcome::Ignored;
    };
    let outcome = health.take_damage(amount);

    match (kind, outcome) {
        (_, DamageOutcome::Ignored) => {}
        (EntityKind::Tree, DamageOutcome::Hit { remaining }) => {
            entity.scale *= config.tree.hit_shrink;
            entity.start_pulse(PulseKind::Sway, now, config.effects.pulse_ms);
            state.events.push(SimEvent::TreeHit {
                tree: target,
                remaining,
            });
        }
        (EntityKind::Tree, DamageOutcome::Destroyed) => {
            let planks = state.progress.add_plank();
            log::debug!("Tree {target} felled, planks now {planks}");
            state.events.push(SimEvent::TreeFelled {
                tree: target,
                planks,
            });
            retire(state, config, target);
        }
        (EntityKind::Cyclop, DamageOutcome::Hit { remaining }) => {
            entity.start_pulse(PulseKind::Hit, now, config.effects.pulse_ms);
            state.events.push(SimEvent::EnemyHit {
                enemy: target,
                remaining,
            });
        }
        (EntityKind::Cyclop, DamageOutcome::Destroyed) => {
            log::debug!("Cyclop {target} killed");
            state.events.push(SimEvent::EnemyKilled { enemy: target });
            retire(state, config, target);
        }
        (_, DamageOutcome::Hit { .. }) => {
            entity.start_pulse(PulseKind::Hit, now, config.effects.pulse_ms);
        }
        (_, DamageOutcome::Destroyed) => {
            retire(state, config, target);
        }
    }
    outcome
}

/// Takes an entity out of play and fades it before it is dropped.
pub fn retire(state: &mut GameState, config: &GameConfig, id: EntityId) -> bool {
    let now = state.now_ms;
    if !state.arena.begin_removal(id, now) {
        return false;
    }
    if let Some(entity) = state.arena.get_mut(id) {
        entity.start_pulse(PulseKind::FadeOut, now, config.effects.fade_ms);
    }
    state
        .schedule
        .schedule(now + config.effects.fade_ms, id, DeferredAction::Despawn);
    true
}

fn resolve_aim(state: &GameState, origin: Vec2, aim: AimTarget) -> Option<Vec2> {
    match aim {
        AimTarget::Point(point) => Some(point),
        AimTarget::NearestEnemy => {
            nearest(origin, state.arena.active_positions(EntityKind::Cyclop))
                .and_then(|(id, _)| state.arena.get(id))
                .map(|enemy| enemy.position)
        }
    }
}

/// Throws a sword from the player toward `aim`. Without anything to aim at
/// the gate is left untouched.
pub fn throw_sword(state: &mut GameState, config: &GameConfig, aim: AimTarget) -> Option<EntityId> {
    let now = state.now_ms;
    let thrower = state.player;
    let player = state.arena.get(thrower).filter(|p| p.is_interactable())?;
    if !player.as_player()?.sword_gate.ready(now) {
        return None;
    }
    let origin = player.position;
    let target = resolve_aim(state, origin, aim)?;
    let offset = target - origin;
    let angle = if offset == Vec2::ZERO {
        0.0
    } else {
        offset.y.atan2(offset.x)
    };

    if let Some(data) = state.arena.get_active_mut(thrower).and_then(|p| p.as_player_mut()) {
        data.sword_gate.trigger(now);
    }
    let sword = state
        .arena
        .spawn(|id| Entity::sword(id, origin, angle, thrower, config));
    state.schedule.schedule(
        now + config.sword.lifetime_ms,
        sword,
        DeferredAction::ExpireSword,
    );
    log::debug!("Sword {sword} thrown at {:.2} rad", angle);
    state.events.push(SimEvent::SwordThrown { sword, angle });
    Some(sword)
}

pub fn try_dash(state: &mut GameState) -> bool {
    let now = state.now_ms;
    let Some(player) = state.arena.get_active_mut(state.player) else {
        return false;
    };
    let position = player.position;
    let Some(data) = player.as_player_mut() else {
        return false;
    };
    if !data.dash.gate.try_trigger(now) {
        return false;
    }
    data.dash.active_until_ms = now + data.dash.duration_ms;
    data.dash.trail.start(position);
    let until_ms = data.dash.active_until_ms;
    state.events.push(SimEvent::DashStarted { until_ms });
    true
}

/// Points every pursuing entity at its target. One whose target is gone
/// stops.
pub fn update_pursuit(state: &mut GameState) {
    let chasers: Vec<(EntityId, EntityId)> = state
        .arena
        .iter()
        .filter(|e| e.is_active())
        .filter_map(|e| Some((e.id, e.pursuit_target()?)))
        .collect();

    for (id, target) in chasers {
        let goal = state
            .arena
            .get(target)
            .filter(|t| t.is_interactable())
            .map(|t| t.position);
        let Some(chaser) = state.arena.get_active_mut(id) else {
            continue;
        };
        chaser.velocity = match goal {
            Some(goal) => (goal - chaser.position).normalize_or_zero() * chaser.speed,
            None => Vec2::ZERO,
        };
        if chaser.velocity.x != 0.0 {
            chaser.facing_left = chaser.velocity.x < 0.0;
        }
    }
}

/// Each live sword damages the first cyclop it overlaps, or failing that the
/// first tree, then leaves play.
pub fn resolve_sword_hits(state: &mut GameState, config: &GameConfig) {
    for sword_id in state.arena.active_ids(EntityKind::Sword) {
        let Some(sword) = state.arena.get(sword_id).filter(|s| s.is_interactable()) else {
            continue;
        };
        let body = Aabb::of(sword);
        let damage = sword.damage;
        let target = first_overlap(&state.arena, &body, EntityKind::Cyclop).or_else(|| {
            config
                .sword
                .hits_trees
                .then(|| first_overlap(&state.arena, &body, EntityKind::Tree))
                .flatten()
        });
        let Some(target) = target else {
            continue;
        };

        let Some(data) = state.arena.get_mut(sword_id).and_then(|s| s.as_sword_mut()) else {
            continue;
        };
        if data.spent {
            continue;
        }
        data.spent = true;
        log::debug!("Sword {sword_id} from {} hit {target}", data.thrower);
        state.events.push(SimEvent::SwordHit {
            sword: sword_id,
            target,
        });
        apply_damage(state, config, target, damage);
        retire(state, config, sword_id);
    }
}

/// A cyclop touching the player costs a plank and is replaced by a fresh one.
pub fn resolve_enemy_contacts(state: &mut GameState, config: &GameConfig) {
    let now = state.now_ms;
    for (enemy, player) in overlapping_pairs(&state.arena, EntityKind::Cyclop, EntityKind::Player) {
        if !retire(state, config, enemy) {
            continue;
        }
        let planks = state.progress.lose_plank();
        if let Some(player) = state.arena.get_active_mut(player) {
            player.start_pulse(PulseKind::Hit, now, config.effects.pulse_ms);
        }
        log::info!("Player hit by cyclop {enemy}, planks now {planks}");
        state.events.push(SimEvent::PlayerHit { enemy, planks });
        spawn_enemy(state, config);
    }
}

/// Cyclops wading through trees slow down for a moment.
pub fn resolve_tree_slows(state: &mut GameState, config: &GameConfig) {
    let now = state.now_ms;
    for (enemy, _tree) in overlapping_pairs(&state.arena, EntityKind::Cyclop, EntityKind::Tree) {
        let Some(cyclop) = state.arena.get_active_mut(enemy) else {
            continue;
        };
        let slowed_speed;
        match cyclop.as_cyclop_mut() {
            Some(data) if !data.slowed => {
                data.slowed = true;
                slowed_speed = data.base_speed * config.enemy.tree_slow_factor;
            }
            _ => continue,
        }
        cyclop.speed = slowed_speed;
        state.schedule.schedule(
            now + config.enemy.tree_slow_ms,
            enemy,
            DeferredAction::RestoreSpeed,
        );
        state.events.push(SimEvent::EnemySlowed { enemy });
    }
}

/// Spawns a cyclop at a random spot inside the spawn margin, chasing the
/// player.
pub fn spawn_enemy(state: &mut GameState, config: &GameConfig) -> EntityId {
    let bounds = config.world.bounds();
    let area = bounds.shrink(config.enemy.spawn_margin).unwrap_or(bounds);
    let position = Vec2::new(
        state.rng.random_range(area.min.x..=area.max.x),
        state.rng.random_range(area.min.y..=area.max.y),
    );
    spawn_enemy_at(state, config, position)
}

pub fn spawn_enemy_at(state: &mut GameState, config: &GameConfig, position: Vec2) -> EntityId {
    let target = state.player;
    let enemy = state
        .arena
        .spawn(|id| Entity::cyclop(id, position, target, config));
    log::debug!(
        "Cyclop {enemy} spawned at ({:.0}, {:.0})",
        position.x,
        position.y
    );
    state.events.push(SimEvent::EnemySpawned { enemy, position });
    enemy
}

/// Swords that flew off the play area are dropped.
pub fn remove_out_of_bounds_swords(state: &mut GameState, config: &GameConfig) {
    let bounds = config.world.bounds();
    let gone: Vec<EntityId> = state
        .arena
        .active(EntityKind::Sword)
        .filter(|sword| !bounds.contains(sword.position))
        .map(|sword| sword.id)
        .collect();
    for sword in gone {
        if retire(state, config, sword) {
            state.events.push(SimEvent::SwordExpired { sword });
        }
    }
}

/// Runs a scheduled action if its target is still in a state it applies to.
pub fn apply_deferred(state: &mut GameState, config: &GameConfig, event: ScheduledEvent) {
    let target = event.target;
    match event.action {
        DeferredAction::RestoreSpeed => {
            let Some(cyclop) = state.arena.get_active_mut(target) else {
                log::trace!("Speed restore for {target} dropped: not active");
                return;
            };
            let base_speed = match cyclop.as_cyclop_mut() {
                Some(data) if data.slowed => {
                    data.slowed = false;
                    data.base_speed
                }
                _ => return,
            };
            cyclop.speed = base_speed;
            state
                .events
                .push(SimEvent::EnemySpeedRestored { enemy: target });
        }
        DeferredAction::ExpireSword => {
            let is_sword = state
                .arena
                .get(target)
                .is_some_and(|e| e.kind() == EntityKind::Sword);
            if is_sword && retire(state, config, target) {
                state.events.push(SimEvent::SwordExpired { sword: target });
            }
        }
        DeferredAction::Despawn => {
            if state.arena.purge(target).is_none() {
                log::trace!("Despawn for {target} dropped: not pending removal");
            }
        }
    }
}
