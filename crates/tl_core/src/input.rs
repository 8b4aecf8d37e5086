//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every tick the key
//!   is physically down. Used for movement.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   tick the transition happened. Cleared by `end_frame()`, which the host
//!   calls after a simulation step has consumed them.
//!
//! Touch input is recorded as an ordered list of per-tick events plus the set
//! of currently active touches, so a virtual joystick can follow one finger
//! by id while other fingers press buttons.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Shift,
    Z,
    Q,
    S,
    D,
    W,
    A,
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointerBtn {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    Down { id: u64, position: Vec2 },
    Move { id: u64, position: Vec2 },
    Up { id: u64, position: Vec2 },
}

impl TouchEvent {
    pub fn id(&self) -> u64 {
        match *self {
            Self::Down { id, .. } | Self::Move { id, .. } | Self::Up { id, .. } => id,
        }
    }

    pub fn position(&self) -> Vec2 {
        match *self {
            Self::Down { position, .. }
            | Self::Move { position, .. }
            | Self::Up { position, .. } => position,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    pointer_held: HashSet<PointerBtn>,
    pointer_just_pressed: HashSet<PointerBtn>,
    pointer_just_released: HashSet<PointerBtn>,

    /// Pointer position in world coordinates.
    pub pointer_world: Vec2,

    touches: BTreeMap<u64, Vec2>,
    touch_events: Vec<TouchEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn pointer_down(&mut self, btn: PointerBtn) {
        if self.pointer_held.insert(btn) {
            self.pointer_just_pressed.insert(btn);
        }
    }

    pub fn pointer_up(&mut self, btn: PointerBtn) {
        if self.pointer_held.remove(&btn) {
            self.pointer_just_released.insert(btn);
        }
    }

    pub fn touch_down(&mut self, id: u64, position: Vec2) {
        if self.touches.insert(id, position).is_none() {
            self.touch_events.push(TouchEvent::Down { id, position });
        }
    }

    pub fn touch_move(&mut self, id: u64, position: Vec2) {
        if let Some(current) = self.touches.get_mut(&id) {
            *current = position;
            self.touch_events.push(TouchEvent::Move { id, position });
        }
    }

    pub fn touch_up(&mut self, id: u64, position: Vec2) {
        if self.touches.remove(&id).is_some() {
            self.touch_events.push(TouchEvent::Up { id, position });
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.is_held(*key))
    }

    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.is_just_pressed(*key))
    }

    pub fn is_pointer_held(&self, btn: PointerBtn) -> bool {
        self.pointer_held.contains(&btn)
    }

    pub fn is_pointer_just_pressed(&self, btn: PointerBtn) -> bool {
        self.pointer_just_pressed.contains(&btn)
    }

    pub fn is_pointer_just_released(&self, btn: PointerBtn) -> bool {
        self.pointer_just_released.contains(&btn)
    }

    pub fn any_pointer_just_pressed(&self, buttons: &[PointerBtn]) -> bool {
        buttons.iter().any(|btn| self.is_pointer_just_pressed(*btn))
    }

    pub fn held_pointer_buttons(&self) -> impl Iterator<Item = PointerBtn> + '_ {
        self.pointer_held.iter().copied()
    }

    pub fn held_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.held.iter().copied()
    }

    pub fn touch_events(&self) -> &[TouchEvent] {
        &self.touch_events
    }

    pub fn active_touch(&self, id: u64) -> Option<Vec2> {
        self.touches.get(&id).copied()
    }

    /// Fingers currently down, by id.
    pub fn active_touches(&self) -> impl Iterator<Item = (u64, Vec2)> + '_ {
        self.touches.iter().map(|(id, position)| (*id, *position))
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.pointer_just_pressed.clear();
        self.pointer_just_released.clear();
        self.touch_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_up(Key::A);
        assert!(!input.is_held(Key::A));
        assert!(input.is_just_released(Key::A));
    }

    #[test]
    fn test_key_down_repeat_does_not_double_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::E);
        input.end_frame();
        // Auto-repeat from the OS must not produce a second edge.
        input.key_down(Key::E);
        assert!(input.is_held(Key::E));
        assert!(!input.is_just_pressed(Key::E));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::Q);
        assert!(!input.is_just_released(Key::Q));
        assert!(!input.is_held(Key::Q));
    }

    #[test]
    fn test_end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.key_down(Key::Z);
        input.key_down(Key::Shift);
        input.pointer_down(PointerBtn::Left);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Z));
        assert!(!input.is_just_pressed(Key::Shift));
        assert!(!input.is_pointer_just_pressed(PointerBtn::Left));
        assert!(input.is_held(Key::Z));
        assert!(input.is_held(Key::Shift));
        assert!(input.is_pointer_held(PointerBtn::Left));
    }

    #[test]
    fn test_pointer_up_sets_just_released() {
        let mut input = InputState::new();
        input.pointer_down(PointerBtn::Left);
        input.pointer_up(PointerBtn::Left);
        assert!(input.is_pointer_just_released(PointerBtn::Left));
        assert!(!input.is_pointer_held(PointerBtn::Left));
    }

    #[test]
    fn test_any_pointer_just_pressed_checks_every_binding() {
        let mut input = InputState::new();
        input.pointer_down(PointerBtn::Right);
        assert!(input.any_pointer_just_pressed(&[PointerBtn::Left, PointerBtn::Right]));
        assert!(!input.any_pointer_just_pressed(&[PointerBtn::Left]));
        assert_eq!(
            input.held_pointer_buttons().collect::<Vec<_>>(),
            vec![PointerBtn::Right]
        );
    }

    #[test]
    fn test_any_held_checks_every_binding() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        assert!(input.any_held(&[Key::Q, Key::Left]));
        assert!(!input.any_held(&[Key::D, Key::Right]));
    }

    #[test]
    fn test_touch_lifecycle_records_events_in_order() {
        let mut input = InputState::new();
        input.touch_down(7, Vec2::new(10.0, 20.0));
        input.touch_move(7, Vec2::new(15.0, 20.0));
        input.touch_up(7, Vec2::new(15.0, 20.0));
        let events = input.touch_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], TouchEvent::Down { id: 7, .. }));
        assert!(matches!(events[1], TouchEvent::Move { id: 7, .. }));
        assert!(matches!(events[2], TouchEvent::Up { id: 7, .. }));
        assert!(input.active_touch(7).is_none());
    }

    #[test]
    fn test_touch_move_for_unknown_id_is_ignored() {
        let mut input = InputState::new();
        input.touch_move(3, Vec2::ONE);
        input.touch_up(3, Vec2::ONE);
        assert!(input.touch_events().is_empty());
    }

    #[test]
    fn test_active_touch_survives_end_frame() {
        let mut input = InputState::new();
        input.touch_down(1, Vec2::new(5.0, 5.0));
        input.end_frame();
        assert!(input.touch_events().is_empty());
        assert_eq!(input.active_touch(1), Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_default_state_is_empty() {
        let input = InputState::new();
        assert!(!input.is_held(Key::A));
        assert!(!input.is_just_pressed(Key::Space));
        assert!(!input.is_pointer_held(PointerBtn::Left));
        assert_eq!(input.pointer_world, Vec2::ZERO);
        assert_eq!(input.held_keys().count(), 0);
    }
}
