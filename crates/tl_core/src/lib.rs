pub mod cooldown;
pub mod health;
pub mod input;
pub mod placement;
pub mod spatial;
pub mod time;

pub use cooldown::CooldownGate;
pub use health::{DamageOutcome, Health, HealthState};
pub use input::{InputState, Key, PointerBtn, TouchEvent};
pub use placement::{place_clusters, ClusterPlacement, PlacementParams};
pub use spatial::{nearest, nearest_within, Bounds};
pub use time::{FrameClock, SimClock, DEFAULT_FIXED_DT_US};
