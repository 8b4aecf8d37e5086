//! Timestamp cooldown gates ("can do X again at time T").
//!
//! The gate stores the next allowed time rather than the last trigger so a
//! runtime delay change only affects triggers made after it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownGate {
    delay_ms: u64,
    next_allowed_ms: u64,
}

impl CooldownGate {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            next_allowed_ms: 0,
        }
    }

    pub fn ready(&self, now_ms: u64) -> bool {
        now_ms >= self.next_allowed_ms
    }

    /// Next allowed time never moves backwards.
    pub fn trigger(&mut self, now_ms: u64) {
        let next = now_ms.saturating_add(self.delay_ms);
        self.next_allowed_ms = self.next_allowed_ms.max(next);
    }

    pub fn try_trigger(&mut self, now_ms: u64) -> bool {
        if !self.ready(now_ms) {
            return false;
        }
        self.trigger(now_ms);
        true
    }

    pub fn set_delay(&mut self, delay_ms: u64) {
        self.delay_ms = delay_ms;
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn next_allowed_ms(&self) -> u64 {
        self.next_allowed_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.next_allowed_ms.saturating_sub(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_gate_is_ready() {
        let gate = CooldownGate::new(500);
        assert!(gate.ready(0));
        assert_eq!(gate.remaining_ms(0), 0);
    }

    #[test]
    fn trigger_blocks_until_delay_elapses() {
        let mut gate = CooldownGate::new(500);
        gate.trigger(1_000);
        assert!(!gate.ready(1_000));
        assert!(!gate.ready(1_499));
        assert!(gate.ready(1_500));
        assert_eq!(gate.remaining_ms(1_200), 300);
    }

    #[test]
    fn try_trigger_only_fires_when_ready() {
        let mut gate = CooldownGate::new(2_000);
        assert!(gate.try_trigger(0));
        assert!(!gate.try_trigger(1_999));
        assert_eq!(gate.next_allowed_ms(), 2_000);
        assert!(gate.try_trigger(2_000));
        assert_eq!(gate.next_allowed_ms(), 4_000);
    }

    #[test]
    fn delay_change_is_not_retroactive() {
        let mut gate = CooldownGate::new(500);
        gate.trigger(100);
        gate.set_delay(200);
        assert!(!gate.ready(599));
        assert!(gate.ready(600));
        gate.trigger(600);
        assert!(gate.ready(800));
    }

    #[test]
    fn next_allowed_time_is_monotonic() {
        let mut gate = CooldownGate::new(1_000);
        gate.trigger(0);
        gate.set_delay(10);
        // An early trigger with a shorter delay must not pull the gate back.
        gate.trigger(5);
        assert_eq!(gate.next_allowed_ms(), 1_000);
    }
}
