//! Maps raw input to what the player wants to do this tick.
//!
//! Movement comes from the bound direction keys (keyboard scheme) or from a
//! virtual joystick that follows one touch by id (touch scheme). Actions are
//! edge-triggered reads of the key bindings in both schemes. The keyboard
//! scheme also throws on a pointer click; the touch scheme adds screen-space
//! buttons.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;
use tl_core::input::{InputState, TouchEvent};

use crate::config::{AimMode, ControlScheme, ControlsConfig, JoystickConfig, KeyBindings};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimTarget {
    /// World-space point to throw toward.
    Point(Vec2),
    NearestEnemy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlIntent {
    /// Length is at most 1.
    pub direction: Vec2,
    /// `Some(true)` when horizontal input points left.
    pub facing_left: Option<bool>,
    pub cut: bool,
    pub throw: bool,
    pub dash: bool,
    pub toggle_range: bool,
    pub aim: AimTarget,
}

impl ControlIntent {
    pub fn idle(aim: AimTarget) -> Self {
        Self {
            direction: Vec2::ZERO,
            facing_left: None,
            cut: false,
            throw: false,
            dash: false,
            toggle_range: false,
            aim,
        }
    }
}

/// Thumb stick anchored at `base`. The first touch that starts inside the
/// radius owns it until that touch lifts. The thumb only follows moves, so a
/// fresh touch reads as centred until the finger slides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joystick {
    base: Vec2,
    radius: f32,
    thumb: Vec2,
    owner: Option<u64>,
}

impl Joystick {
    pub fn new(base: Vec2, radius: f32) -> Self {
        Self {
            base,
            radius,
            thumb: base,
            owner: None,
        }
    }

    pub fn thumb(&self) -> Vec2 {
        self.thumb
    }

    pub fn base(&self) -> Vec2 {
        self.base
    }

    pub fn is_captured(&self) -> bool {
        self.owner.is_some()
    }

    /// Returns true when the event was consumed by the stick.
    pub fn handle(&mut self, event: &TouchEvent) -> bool {
        match *event {
            TouchEvent::Down { id, position } => {
                if self.owner.is_none() && position.distance(self.base) <= self.radius {
                    self.owner = Some(id);
                    return true;
                }
                false
            }
            TouchEvent::Move { id, position } if self.owner == Some(id) => {
                self.place_thumb(position);
                true
            }
            TouchEvent::Up { id, .. } if self.owner == Some(id) => {
                self.owner = None;
                self.thumb = self.base;
                true
            }
            _ => false,
        }
    }

    fn place_thumb(&mut self, position: Vec2) {
        let offset = position - self.base;
        self.thumb = if offset.length() <= self.radius {
            position
        } else {
            self.base + offset.normalize_or_zero() * self.radius
        };
    }

    /// `(cos θ, sin θ)` scaled by how far the thumb sits from the base.
    pub fn direction(&self) -> Vec2 {
        if self.owner.is_none() {
            return Vec2::ZERO;
        }
        let offset = self.thumb - self.base;
        let distance = offset.length();
        if distance == 0.0 {
            return Vec2::ZERO;
        }
        let intensity = (distance / self.radius).clamp(0.0, 1.0);
        let angle = offset.y.atan2(offset.x);
        Vec2::new(angle.cos(), angle.sin()) * intensity
    }
}

#[derive(Debug, Clone)]
pub struct PlayerControls {
    scheme: ControlScheme,
    aim: AimMode,
    bindings: KeyBindings,
    layout: JoystickConfig,
    joystick: Joystick,
}

impl PlayerControls {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            scheme: config.scheme,
            aim: config.aim_mode(),
            bindings: config.bindings.clone(),
            layout: config.joystick,
            joystick: Joystick::new(config.joystick.base, config.joystick.radius),
        }
    }

    pub fn scheme(&self) -> ControlScheme {
        self.scheme
    }

    pub fn joystick(&self) -> &Joystick {
        &self.joystick
    }

    pub fn read(&mut self, input: &InputState) -> ControlIntent {
        let aim = match self.aim {
            AimMode::Pointer => AimTarget::Point(input.pointer_world),
            AimMode::NearestEnemy => AimTarget::NearestEnemy,
        };
        let bindings = &self.bindings;
        let mut intent = ControlIntent {
            cut: input.any_just_pressed(&bindings.cut),
            throw: input.any_just_pressed(&bindings.throw),
            dash: input.any_just_pressed(&bindings.dash),
            toggle_range: input.any_just_pressed(&bindings.toggle_range),
            ..ControlIntent::idle(aim)
        };

        match self.scheme {
            ControlScheme::Keyboard => {
                let (direction, facing_left) = keyboard_direction(input, bindings);
                intent.direction = direction;
                intent.facing_left = facing_left;
                intent.throw |= input.any_pointer_just_pressed(&bindings.throw_buttons);
            }
            ControlScheme::Touch => {
                for event in input.touch_events() {
                    if self.joystick.handle(event) {
                        continue;
                    }
                    if let TouchEvent::Down { position, .. } = *event {
                        let radius = self.layout.button_radius;
                        let hit = |center: Vec2| position.distance(center) <= radius;
                        if hit(self.layout.action_button) {
                            intent.cut = true;
                        } else if hit(self.layout.throw_button) {
                            intent.throw = true;
                        } else if hit(self.layout.range_button) {
                            intent.toggle_range = true;
                        }
                    }
                }
                intent.direction = self.joystick.direction();
                if intent.direction.x != 0.0 {
                    intent.facing_left = Some(intent.direction.x < 0.0);
                }
            }
        }
        intent
    }
}

/// Unit axes from the bound keys; diagonals are scaled so their length
/// matches a single axis.
fn keyboard_direction(input: &InputState, bindings: &KeyBindings) -> (Vec2, Option<bool>) {
    let mut dx = 0.0;
    let mut dy = 0.0;
    let mut facing_left = None;
    if input.any_held(&bindings.move_left) {
        dx -= 1.0;
        facing_left = Some(true);
    }
    if input.any_held(&bindings.move_right) {
        dx += 1.0;
        facing_left = Some(false);
    }
    if input.any_held(&bindings.move_down) {
        dy += 1.0;
    }
    if input.any_held(&bindings.move_up) {
        dy -= 1.0;
    }
    let mut direction = Vec2::new(dx, dy);
    if dx != 0.0 && dy != 0.0 {
        direction *= FRAC_1_SQRT_2;
    }
    (direction, facing_left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_core::input::{Key, PointerBtn};

    fn keyboard_controls() -> PlayerControls {
        PlayerControls::new(&ControlsConfig::default())
    }

    fn touch_controls() -> PlayerControls {
        PlayerControls::new(&ControlsConfig {
            scheme: ControlScheme::Touch,
            ..ControlsConfig::default()
        })
    }

    #[test]
    fn diagonal_has_axial_length() {
        let mut controls = keyboard_controls();
        let mut input = InputState::new();
        input.key_down(Key::Z);
        input.key_down(Key::D);
        let intent = controls.read(&input);
        assert!((intent.direction.length() - 1.0).abs() < 1e-6);
        assert!(intent.direction.x > 0.0 && intent.direction.y < 0.0);
        assert_eq!(intent.facing_left, Some(false));
    }

    #[test]
    fn arrow_keys_are_bound_alongside_azerty() {
        let mut controls = keyboard_controls();
        let mut input = InputState::new();
        input.key_down(Key::Left);
        let intent = controls.read(&input);
        assert_eq!(intent.direction, Vec2::new(-1.0, 0.0));
        assert_eq!(intent.facing_left, Some(true));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut controls = keyboard_controls();
        let mut input = InputState::new();
        input.key_down(Key::Q);
        input.key_down(Key::D);
        assert_eq!(controls.read(&input).direction, Vec2::ZERO);
    }

    #[test]
    fn actions_are_edge_triggered() {
        let mut controls = keyboard_controls();
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.key_down(Key::E);
        input.key_down(Key::Shift);
        input.key_down(Key::A);
        let first = controls.read(&input);
        assert!(first.cut && first.throw && first.dash && first.toggle_range);

        input.end_frame();
        let second = controls.read(&input);
        assert!(!second.cut && !second.throw && !second.dash && !second.toggle_range);
    }

    #[test]
    fn pointer_click_throws_toward_the_pointer() {
        let mut controls = keyboard_controls();
        let mut input = InputState::new();
        input.pointer_world = Vec2::new(700.0, 90.0);
        input.pointer_down(PointerBtn::Left);
        let intent = controls.read(&input);
        assert!(intent.throw);
        assert_eq!(intent.aim, AimTarget::Point(Vec2::new(700.0, 90.0)));

        input.end_frame();
        assert!(!controls.read(&input).throw);
        // Touch hosts report taps as touches, not clicks.
        input.pointer_up(PointerBtn::Left);
        input.pointer_down(PointerBtn::Left);
        assert!(!touch_controls().read(&input).throw);
    }

    #[test]
    fn keyboard_aims_at_pointer() {
        let mut controls = keyboard_controls();
        let mut input = InputState::new();
        input.pointer_world = Vec2::new(40.0, 50.0);
        assert_eq!(
            controls.read(&input).aim,
            AimTarget::Point(Vec2::new(40.0, 50.0))
        );
        assert_eq!(
            touch_controls().read(&input).aim,
            AimTarget::NearestEnemy
        );
    }

    #[test]
    fn joystick_clamps_thumb_and_scales_intensity() {
        let base = Vec2::new(100.0, 100.0);
        let mut stick = Joystick::new(base, 60.0);
        assert!(stick.handle(&TouchEvent::Down {
            id: 1,
            position: base + Vec2::new(30.0, 0.0),
        }));
        assert!(stick.is_captured());
        assert_eq!(stick.thumb(), base);
        assert_eq!(stick.direction(), Vec2::ZERO);

        stick.handle(&TouchEvent::Move {
            id: 1,
            position: base + Vec2::new(30.0, 0.0),
        });
        assert!((stick.direction() - Vec2::new(0.5, 0.0)).length() < 1e-5);

        stick.handle(&TouchEvent::Move {
            id: 1,
            position: base + Vec2::new(0.0, 300.0),
        });
        assert!((stick.thumb() - (base + Vec2::new(0.0, 60.0))).length() < 1e-4);
        assert!((stick.direction() - Vec2::new(0.0, 1.0)).length() < 1e-5);

        stick.handle(&TouchEvent::Up {
            id: 1,
            position: base,
        });
        assert_eq!(stick.thumb(), base);
        assert_eq!(stick.direction(), Vec2::ZERO);
    }

    #[test]
    fn joystick_ignores_touches_outside_and_other_ids() {
        let base = Vec2::new(100.0, 100.0);
        let mut stick = Joystick::new(base, 60.0);
        assert!(!stick.handle(&TouchEvent::Down {
            id: 1,
            position: base + Vec2::new(61.0, 0.0),
        }));
        assert!(stick.handle(&TouchEvent::Down {
            id: 2,
            position: base,
        }));
        assert!(!stick.handle(&TouchEvent::Move {
            id: 3,
            position: base + Vec2::new(20.0, 0.0),
        }));
        assert_eq!(stick.thumb(), base);
        assert!(!stick.handle(&TouchEvent::Down {
            id: 4,
            position: base,
        }));
    }

    #[test]
    fn touch_scheme_reads_stick_and_buttons() {
        let mut controls = touch_controls();
        let layout = JoystickConfig::default();
        let mut input = InputState::new();
        input.touch_down(1, layout.base - Vec2::new(20.0, 0.0));
        input.touch_down(2, layout.action_button);
        let intent = controls.read(&input);
        assert_eq!(intent.direction, Vec2::ZERO);
        assert_eq!(intent.facing_left, None);
        assert!(intent.cut);
        assert!(!intent.toggle_range);

        input.end_frame();
        input.touch_move(1, layout.base - Vec2::new(60.0, 0.0));
        input.touch_down(3, layout.range_button);
        let intent = controls.read(&input);
        assert!((intent.direction - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert_eq!(intent.facing_left, Some(true));
        assert!(intent.toggle_range);
        assert!(!intent.cut);

        input.end_frame();
        let intent = controls.read(&input);
        // The stick keeps its thumb between ticks while the finger is down.
        assert!((intent.direction - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!(!intent.toggle_range);
    }
}
