//! One fixed tick of the game.
//!
//! `World::step` runs, in order:
//! 1. due scheduled events and the enemy spawn timer
//! 2. input mapping
//! 3. player movement
//! 4. discrete actions (range toggle, cut, throw, dash)
//! 5. enemy pursuit
//! 6. integration and overlap resolution
//! 7. forest regrowth
//! 8. range indicator
//! 9. difficulty steps and HUD text
//!
//! Scene time advances by one fixed step at the start of every tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tl_core::input::InputState;
use tl_core::placement::place_clusters;
use tl_core::spatial::nearest_within;
use tl_core::time::SimClock;

use crate::arena::EntityArena;
use crate::combat;
use crate::config::GameConfig;
use crate::controls::{ControlIntent, PlayerControls};
use crate::entity::{Entity, EntityId, EntityKind, PulseKind};
use crate::events::SimEvent;
use crate::progress::{Progress, ProgressStep};
use crate::schedule::{EventQueue, RepeatingTimer};

/// Everything the rules in `combat` read and mutate.
#[derive(Debug, Clone)]
pub struct GameState {
    pub now_ms: u64,
    pub arena: EntityArena,
    pub progress: Progress,
    pub schedule: EventQueue,
    pub rng: ChaCha8Rng,
    pub player: EntityId,
    /// Events raised during the current tick.
    pub events: Vec<SimEvent>,
}

impl GameState {
    /// Player only, no trees or enemies.
    pub fn new(config: &GameConfig) -> Self {
        let mut arena = EntityArena::new();
        let player = arena.spawn(|id| Entity::player(id, config));
        Self {
            now_ms: 0,
            arena,
            progress: Progress::new(&config.progression),
            schedule: EventQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(config.world.seed),
            player,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> Option<&Entity> {
        self.arena.get(self.player)
    }
}

/// Cutting-range circle around the player and the tree a cut would hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeIndicator {
    pub visible: bool,
    pub center: Vec2,
    pub radius: f32,
    pub highlighted: Option<EntityId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hud {
    pub planks: String,
    pub stats: String,
}

pub struct World {
    config: GameConfig,
    clock: SimClock,
    state: GameState,
    controls: PlayerControls,
    spawn_timer: RepeatingTimer,
    range: RangeIndicator,
    hud: Hud,
}

impl World {
    /// Fresh scene: player, a planted forest and the opening enemies.
    pub fn new(config: GameConfig) -> Self {
        let mut world = Self::empty(config);
        let planted = world.plant_forest();
        for _ in 0..world.config.enemy.initial_count {
            combat::spawn_enemy(&mut world.state, &world.config);
        }
        log::info!(
            "Scene ready: {} trees, {} cyclops, seed {:#x}",
            planted,
            world.config.enemy.initial_count,
            world.config.world.seed
        );
        world.state.events.clear();
        world
    }

    /// Only the player. Trees and enemies are added by the caller.
    pub fn empty(config: GameConfig) -> Self {
        let state = GameState::new(&config);
        let controls = PlayerControls::new(&config.controls);
        let clock = SimClock::new(config.world.fixed_dt_us);
        let spawn_timer = RepeatingTimer::new(config.enemy.spawn_interval_ms, 0);
        let mut world = Self {
            clock,
            state,
            controls,
            spawn_timer,
            range: RangeIndicator {
                visible: false,
                center: config.player.start,
                radius: config.player.cutting_range,
                highlighted: None,
            },
            hud: Hud::default(),
            config,
        };
        world.refresh_range();
        world.refresh_hud();
        world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn now_ms(&self) -> u64 {
        self.state.now_ms
    }

    pub fn step_count(&self) -> u64 {
        self.clock.step_count()
    }

    pub fn planks(&self) -> u32 {
        self.state.progress.planks()
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn range_indicator(&self) -> &RangeIndicator {
        &self.range
    }

    pub fn controls(&self) -> &PlayerControls {
        &self.controls
    }

    pub fn spawn_tree_at(&mut self, position: Vec2) -> EntityId {
        let config = &self.config;
        self.state
            .arena
            .spawn(|id| Entity::tree(id, position, config))
    }

    pub fn spawn_enemy_at(&mut self, position: Vec2) -> EntityId {
        combat::spawn_enemy_at(&mut self.state, &self.config, position)
    }

    pub fn step(&mut self, input: &InputState) -> Vec<SimEvent> {
        self.clock.advance();
        let now = self.clock.now_ms();
        let dt = self.clock.dt_secs();
        self.state.now_ms = now;

        // 1
        for event in self.state.schedule.drain_due(now) {
            combat::apply_deferred(&mut self.state, &self.config, event);
        }
        for _ in 0..self.spawn_timer.poll(now) {
            combat::spawn_enemy(&mut self.state, &self.config);
        }

        // 2, 3
        let intent = self.controls.read(input);
        self.apply_movement(&intent);

        // 4
        if intent.toggle_range {
            self.toggle_range();
        }
        if intent.cut {
            combat::try_cut(&mut self.state, &self.config);
        }
        if intent.throw {
            combat::throw_sword(&mut self.state, &self.config, intent.aim);
        }
        if intent.dash {
            combat::try_dash(&mut self.state);
        }

        // 5
        combat::update_pursuit(&mut self.state);

        // 6
        self.integrate(dt);
        combat::resolve_sword_hits(&mut self.state, &self.config);
        combat::resolve_tree_slows(&mut self.state, &self.config);
        combat::resolve_enemy_contacts(&mut self.state, &self.config);
        combat::remove_out_of_bounds_swords(&mut self.state, &self.config);
        self.clear_finished_pulses();

        // 7
        let live_trees = self.state.arena.count_active(EntityKind::Tree);
        if live_trees as u32 <= self.config.tree.regrow_watermark {
            let added = self.plant_forest();
            if added > 0 {
                self.state.events.push(SimEvent::ForestRegrown { added });
            }
        }

        // 8
        self.refresh_range();

        // 9
        self.apply_progress();
        self.refresh_hud();

        std::mem::take(&mut self.state.events)
    }

    fn apply_movement(&mut self, intent: &ControlIntent) {
        let now = self.state.now_ms;
        let Some(player) = self.state.arena.get_active_mut(self.state.player) else {
            return;
        };
        if let Some(facing_left) = intent.facing_left {
            player.facing_left = facing_left;
        }
        let base_speed = player.speed;
        let speed = match player.as_player_mut() {
            Some(data) if data.dash.is_dashing(now) => data.dash.speed,
            Some(data) => {
                if data.dash.trail.is_active() {
                    data.dash.trail.clear();
                }
                base_speed
            }
            None => base_speed,
        };
        player.velocity = intent.direction * speed;
    }

    fn toggle_range(&mut self) {
        let Some(data) = self
            .state
            .arena
            .get_active_mut(self.state.player)
            .and_then(|p| p.as_player_mut())
        else {
            return;
        };
        data.range_visible = !data.range_visible;
        let visible = data.range_visible;
        self.state.events.push(SimEvent::RangeToggled { visible });
    }

    fn integrate(&mut self, dt: f32) {
        let bounds = self.config.world.bounds();
        for entity in self.state.arena.iter_mut() {
            if !entity.is_active() || entity.velocity == Vec2::ZERO {
                continue;
            }
            entity.position += entity.velocity * dt;
            if entity.kind().capabilities().bounded {
                entity.position = bounds.clamp(entity.position);
            }
        }

        let now = self.state.now_ms;
        if let Some(player) = self.state.arena.get_active_mut(self.state.player) {
            let position = player.position;
            if let Some(data) = player.as_player_mut() {
                if data.dash.is_dashing(now) {
                    data.dash.trail.push(position);
                }
            }
        }
    }

    /// Fades stay until the entity is purged; every other pulse ends on time.
    fn clear_finished_pulses(&mut self) {
        let now = self.state.now_ms;
        for entity in self.state.arena.iter_mut() {
            let finished = entity
                .pulse
                .is_some_and(|pulse| pulse.kind != PulseKind::FadeOut && pulse.finished(now));
            if finished {
                entity.pulse = None;
            }
        }
    }

    fn plant_forest(&mut self) -> usize {
        let existing: Vec<Vec2> = self
            .state
            .arena
            .active_positions(EntityKind::Tree)
            .into_iter()
            .map(|(_, position)| position)
            .collect();
        let clusters = place_clusters(
            &mut self.state.rng,
            self.config.world.bounds(),
            &self.config.forest,
            &existing,
        );
        let mut added = 0;
        for cluster in clusters {
            for point in cluster.points {
                self.spawn_tree_at(point);
                added += 1;
            }
        }
        if added > 0 {
            log::debug!("Planted {added} trees next to {} survivors", existing.len());
        }
        added
    }

    fn refresh_range(&mut self) {
        let Some(player) = self.state.player() else {
            return;
        };
        let Some(data) = player.as_player() else {
            return;
        };
        let highlighted = nearest_within(
            player.position,
            self.state.arena.active_positions(EntityKind::Tree),
            data.cutting_range,
        )
        .map(|(id, _)| id);
        self.range = RangeIndicator {
            visible: data.range_visible,
            center: player.position,
            radius: data.cutting_range,
            highlighted,
        };
    }

    fn apply_progress(&mut self) {
        let rules = self.config.progression;
        for step in self.state.progress.take_steps() {
            let Some(player) = self.state.arena.get_mut(self.state.player) else {
                continue;
            };
            match step {
                ProgressStep::Speed => {
                    player.speed += rules.speed_step;
                    let move_speed = player.speed;
                    let Some(data) = player.as_player_mut() else {
                        continue;
                    };
                    let delay = data.cut_gate.delay_ms().saturating_sub(rules.delay_step_ms);
                    data.cut_gate.set_delay(delay);
                    log::info!("Speed up: move {move_speed:.0}, cut delay {delay} ms");
                    self.state.events.push(SimEvent::SpeedIncreased {
                        move_speed,
                        cut_delay_ms: delay,
                    });
                }
                ProgressStep::Range => {
                    let Some(data) = player.as_player_mut() else {
                        continue;
                    };
                    data.cutting_range += rules.range_step;
                    let cutting_range = data.cutting_range;
                    log::info!("Cutting range now {cutting_range:.0}");
                    self.state
                        .events
                        .push(SimEvent::RangeIncreased { cutting_range });
                }
            }
        }
    }

    fn refresh_hud(&mut self) {
        self.hud.planks = format!("Planks: {}", self.state.progress.planks());
        if let Some(player) = self.state.player() {
            if let Some(data) = player.as_player() {
                self.hud.stats = format!(
                    "Speed: {:.0} | Cooldown: {}ms | Range: {:.0}",
                    player.speed,
                    data.cut_gate.delay_ms(),
                    data.cutting_range
                );
            }
        }
    }
}
