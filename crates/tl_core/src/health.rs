//! Life counter with a single terminal `Destroyed` state.
//!
//! `take_damage` reports what happened so the caller can react (hit pulse,
//! life bar refresh, removal) without the health value knowing about any of
//! it. Damage after destruction is ignored.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Alive,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already destroyed, nothing changed.
    Ignored,
    /// Survived with `remaining` life.
    Hit { remaining: u32 },
    /// This hit caused the one and only destroy transition.
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    life: u32,
    max_life: u32,
    state: HealthState,
}

impl Health {
    pub fn new(max_life: u32) -> Self {
        let max_life = max_life.max(1);
        Self {
            life: max_life,
            max_life,
            state: HealthState::Alive,
        }
    }

    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.state == HealthState::Destroyed {
            return DamageOutcome::Ignored;
        }
        self.life = self.life.saturating_sub(amount);
        if self.life == 0 {
            self.state = HealthState::Destroyed;
            DamageOutcome::Destroyed
        } else {
            DamageOutcome::Hit {
                remaining: self.life,
            }
        }
    }

    /// Forces the terminal state. Returns true if this call made the transition.
    pub fn destroy(&mut self) -> bool {
        if self.state == HealthState::Destroyed {
            return false;
        }
        self.life = 0;
        self.state = HealthState::Destroyed;
        true
    }

    pub fn is_alive(&self) -> bool {
        self.state == HealthState::Alive
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn life(&self) -> u32 {
        self.life
    }

    pub fn max_life(&self) -> u32 {
        self.max_life
    }

    /// Life bar fill in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        self.life as f32 / self.max_life as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surviving_hit_reports_remaining_life() {
        let mut health = Health::new(5);
        assert_eq!(health.take_damage(1), DamageOutcome::Hit { remaining: 4 });
        assert!(health.is_alive());
        assert!((health.fraction() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn lethal_damage_destroys_exactly_once() {
        let mut health = Health::new(3);
        assert_eq!(health.take_damage(2), DamageOutcome::Hit { remaining: 1 });
        assert_eq!(health.take_damage(1), DamageOutcome::Destroyed);
        assert_eq!(health.take_damage(1), DamageOutcome::Ignored);
        assert_eq!(health.take_damage(10), DamageOutcome::Ignored);
        assert_eq!(health.life(), 0);
        assert_eq!(health.state(), HealthState::Destroyed);
    }

    #[test]
    fn overkill_clamps_life_at_zero() {
        let mut health = Health::new(3);
        assert_eq!(health.take_damage(99), DamageOutcome::Destroyed);
        assert_eq!(health.life(), 0);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut health = Health::new(3);
        assert!(health.destroy());
        assert!(!health.destroy());
        assert_eq!(health.take_damage(1), DamageOutcome::Ignored);
    }

    #[test]
    fn zero_damage_keeps_entity_alive() {
        let mut health = Health::new(1);
        assert_eq!(health.take_damage(0), DamageOutcome::Hit { remaining: 1 });
    }
}
