//! Scripted input for headless runs.
//!
//! Each frame lists the keys and pointer buttons held and the fingers down
//! for `repeat` ticks.
//! Press and release edges are derived by diffing against the previous
//! frame, so a replay never has to spell them out.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;
use tl_core::input::{InputState, Key, PointerBtn};

use crate::config::GameConfig;
use crate::events::SimEvent;
use crate::world::World;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    /// Overrides `world.fixed_dt_us` when set.
    #[serde(default)]
    pub fixed_dt_us: Option<u64>,
    /// Overrides `world.seed` when set.
    #[serde(default)]
    pub seed: Option<u64>,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<Key>,
    #[serde(default)]
    pub buttons: Vec<PointerBtn>,
    /// Pointer world position; the previous one is kept when omitted.
    #[serde(default)]
    pub pointer: Option<Vec2>,
    #[serde(default)]
    pub touches: Vec<ReplayTouch>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ReplayTouch {
    pub id: u64,
    pub position: Vec2,
}

impl ReplaySequence {
    pub fn apply_overrides(&self, config: &mut GameConfig) {
        if let Some(fixed_dt_us) = self.fixed_dt_us {
            config.world.fixed_dt_us = fixed_dt_us;
        }
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
    }

    /// One entry per tick.
    pub fn expanded_frames(&self) -> Vec<&ReplayFrame> {
        self.frames
            .iter()
            .flat_map(|frame| std::iter::repeat(frame).take(frame.repeat.max(1) as usize))
            .collect()
    }

    pub fn tick_count(&self) -> u64 {
        self.frames
            .iter()
            .map(|frame| u64::from(frame.repeat.max(1)))
            .sum()
    }
}

impl ReplayFrame {
    /// Moves `input` to this frame's state, raising press/release edges for
    /// whatever changed.
    pub fn apply_to(&self, input: &mut InputState) {
        let wanted: BTreeSet<Key> = self.held.iter().copied().collect();
        let released: Vec<Key> = input.held_keys().filter(|k| !wanted.contains(k)).collect();
        for key in released {
            input.key_up(key);
        }
        for key in &wanted {
            input.key_down(*key);
        }

        let released: Vec<PointerBtn> = input
            .held_pointer_buttons()
            .filter(|btn| !self.buttons.contains(btn))
            .collect();
        for btn in released {
            input.pointer_up(btn);
        }
        for btn in &self.buttons {
            input.pointer_down(*btn);
        }

        if let Some(pointer) = self.pointer {
            input.pointer_world = pointer;
        }

        let lifted: Vec<(u64, Vec2)> = input
            .active_touches()
            .filter(|(id, _)| !self.touches.iter().any(|t| t.id == *id))
            .collect();
        for (id, position) in lifted {
            input.touch_up(id, position);
        }
        for touch in &self.touches {
            match input.active_touch(touch.id) {
                None => input.touch_down(touch.id, touch.position),
                Some(current) if current != touch.position => {
                    input.touch_move(touch.id, touch.position)
                }
                Some(_) => {}
            }
        }
    }
}

/// Runs every tick of `replay` through `world` and returns the events in
/// order.
pub fn play_replay(world: &mut World, replay: &ReplaySequence) -> Vec<SimEvent> {
    let mut input = InputState::new();
    let mut events = Vec::new();
    for frame in replay.expanded_frames() {
        frame.apply_to(&mut input);
        events.extend(world.step(&input));
        input.end_frame();
    }
    events
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt_us == Some(0) {
        return Err("Replay validation failed: fixed_dt_us must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_repeat() -> u32 {
    1
}
