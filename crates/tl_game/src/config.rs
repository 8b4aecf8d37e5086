//! Gameplay tuning loaded from JSON.
//!
//! Every section carries `#[serde(default)]`, so a config file only has to
//! name the values it changes. Defaults are the shipped game's numbers.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;
use tl_core::input::{Key, PointerBtn};
use tl_core::placement::PlacementParams;
use tl_core::spatial::Bounds;
use tl_core::time::DEFAULT_FIXED_DT_US;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config JSON {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config validation failed: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub dash: DashConfig,
    pub sword: SwordConfig,
    pub tree: TreeConfig,
    pub enemy: EnemyConfig,
    pub forest: PlacementParams,
    pub progression: ProgressionConfig,
    pub effects: EffectsConfig,
    pub controls: ControlsConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub fixed_dt_us: u64,
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1500.0,
            height: 1080.0,
            fixed_dt_us: DEFAULT_FIXED_DT_US,
            seed: 0x7157_b3e5,
        }
    }
}

impl WorldConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub start: Vec2,
    pub half_size: Vec2,
    pub max_life: u32,
    pub damage: u32,
    pub speed: f32,
    pub cut_delay_ms: u64,
    pub cutting_range: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Vec2::new(512.0, 384.0),
            half_size: Vec2::new(16.0, 16.0),
            max_life: 3,
            damage: 1,
            speed: 250.0,
            cut_delay_ms: 500,
            cutting_range: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub speed: f32,
    pub duration_ms: u64,
    pub cooldown_ms: u64,
    pub ghost_count: usize,
    /// Ticks between two ghosts in the trail.
    pub ghost_spacing: usize,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            speed: 800.0,
            duration_ms: 150,
            cooldown_ms: 1000,
            ghost_count: 4,
            ghost_spacing: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SwordConfig {
    pub speed: f32,
    pub cooldown_ms: u64,
    pub lifetime_ms: u64,
    pub damage: u32,
    pub hits_trees: bool,
    pub half_size: Vec2,
}

impl Default for SwordConfig {
    fn default() -> Self {
        Self {
            speed: 400.0,
            cooldown_ms: 2000,
            lifetime_ms: 2000,
            damage: 1,
            hits_trees: true,
            half_size: Vec2::new(8.0, 16.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub max_life: u32,
    pub scale: f32,
    pub hit_shrink: f32,
    pub half_size: Vec2,
    /// Forest regrows when live trees drop to this count or below.
    pub regrow_watermark: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_life: 5,
            scale: 3.0,
            hit_shrink: 0.8,
            half_size: Vec2::new(19.0, 29.0),
            regrow_watermark: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_life: u32,
    pub speed: f32,
    pub half_size: Vec2,
    pub spawn_margin: f32,
    pub spawn_interval_ms: u64,
    pub initial_count: u32,
    pub tree_slow_factor: f32,
    pub tree_slow_ms: u64,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_life: 3,
            speed: 50.0,
            half_size: Vec2::new(16.0, 16.0),
            spawn_margin: 100.0,
            spawn_interval_ms: 5000,
            initial_count: 1,
            tree_slow_factor: 0.4,
            tree_slow_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub starting_planks: u32,
    pub speed_every: u32,
    pub speed_step: f32,
    pub delay_step_ms: u64,
    pub range_every: u32,
    pub range_step: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            starting_planks: 0,
            speed_every: 5,
            speed_step: 50.0,
            delay_step_ms: 100,
            range_every: 10,
            range_step: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub pulse_ms: u64,
    pub fade_ms: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 100,
            fade_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlScheme {
    #[default]
    Keyboard,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AimMode {
    Pointer,
    NearestEnemy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub scheme: ControlScheme,
    /// Falls back to the scheme's natural aim when unset.
    pub aim: Option<AimMode>,
    pub bindings: KeyBindings,
    pub joystick: JoystickConfig,
}

impl ControlsConfig {
    pub fn aim_mode(&self) -> AimMode {
        self.aim.unwrap_or(match self.scheme {
            ControlScheme::Keyboard => AimMode::Pointer,
            ControlScheme::Touch => AimMode::NearestEnemy,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub move_left: Vec<Key>,
    pub move_right: Vec<Key>,
    pub move_up: Vec<Key>,
    pub move_down: Vec<Key>,
    pub cut: Vec<Key>,
    pub throw: Vec<Key>,
    /// Pointer buttons that also throw, keyboard scheme only.
    pub throw_buttons: Vec<PointerBtn>,
    pub dash: Vec<Key>,
    pub toggle_range: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_left: vec![Key::Q, Key::Left],
            move_right: vec![Key::D, Key::Right],
            move_up: vec![Key::Z, Key::Up],
            move_down: vec![Key::S, Key::Down],
            cut: vec![Key::Space],
            throw: vec![Key::E],
            throw_buttons: vec![PointerBtn::Left],
            dash: vec![Key::Shift],
            toggle_range: vec![Key::A],
        }
    }
}

/// Screen-space layout of the touch controls.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    pub base: Vec2,
    pub radius: f32,
    pub action_button: Vec2,
    pub throw_button: Vec2,
    pub range_button: Vec2,
    pub button_radius: f32,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            base: Vec2::new(100.0, 980.0),
            radius: 60.0,
            action_button: Vec2::new(1400.0, 980.0),
            throw_button: Vec2::new(1280.0, 980.0),
            range_button: Vec2::new(1400.0, 880.0),
            button_radius: 50.0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg)) };

        if self.world.width <= 0.0 || self.world.height <= 0.0 {
            return invalid("world width and height must be > 0".to_string());
        }
        if self.world.fixed_dt_us == 0 {
            return invalid("world.fixed_dt_us must be > 0".to_string());
        }
        if !self.world.bounds().contains(self.player.start) {
            return invalid(format!(
                "player.start {:?} lies outside the world",
                self.player.start
            ));
        }
        if self.player.speed <= 0.0 || self.enemy.speed <= 0.0 || self.sword.speed <= 0.0 {
            return invalid("player, enemy and sword speeds must be > 0".to_string());
        }
        if self.player.cutting_range <= 0.0 {
            return invalid("player.cutting_range must be > 0".to_string());
        }
        if self.tree.max_life == 0 || self.enemy.max_life == 0 || self.player.max_life == 0 {
            return invalid("max_life values must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.enemy.tree_slow_factor) {
            return invalid("enemy.tree_slow_factor must be within [0, 1]".to_string());
        }
        if self.enemy.spawn_interval_ms == 0 {
            return invalid("enemy.spawn_interval_ms must be > 0".to_string());
        }
        if self.world.bounds().shrink(self.enemy.spawn_margin).is_none() {
            return invalid("enemy.spawn_margin leaves no room to spawn".to_string());
        }
        if self.progression.speed_every == 0 || self.progression.range_every == 0 {
            return invalid("progression thresholds must be > 0".to_string());
        }
        if self.controls.joystick.radius <= 0.0 {
            return invalid("controls.joystick.radius must be > 0".to_string());
        }
        self.forest
            .validate()
            .map_err(|msg| ConfigError::Invalid(format!("forest: {msg}")))
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GameConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    log::info!("Loaded config {}", path.display());
    Ok(config)
}
