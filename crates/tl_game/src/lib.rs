pub mod arena;
pub mod collision;
pub mod combat;
pub mod config;
pub mod controls;
pub mod entity;
pub mod events;
pub mod progress;
pub mod render;
pub mod replay;
pub mod schedule;
pub mod world;

pub use config::{load_config_from_path, ConfigError, GameConfig};
pub use controls::{AimTarget, ControlIntent, PlayerControls};
pub use entity::{Entity, EntityId, EntityKind};
pub use events::SimEvent;
pub use render::RenderSnapshot;
pub use replay::{load_replay_from_path, play_replay, ReplaySequence};
pub use world::{GameState, Hud, World};
