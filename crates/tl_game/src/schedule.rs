//! Deferred actions keyed by entity id.
//!
//! Nothing here holds a reference to an entity. When an event comes due the
//! caller looks its target up again and drops the event if the target is
//! gone or no longer in a state the action applies to.

use std::collections::BTreeMap;

use crate::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Lift a cyclop's tree slow.
    RestoreSpeed,
    /// Sword lifetime ran out.
    ExpireSword,
    /// Fade finished, drop the entity from the arena.
    Despawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub fire_at_ms: u64,
    pub target: EntityId,
    pub action: DeferredAction,
}

/// Ordered by fire time, then by scheduling order.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    next_seq: u64,
    pending: BTreeMap<(u64, u64), ScheduledEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, fire_at_ms: u64, target: EntityId, action: DeferredAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(
            (fire_at_ms, seq),
            ScheduledEvent {
                fire_at_ms,
                target,
                action,
            },
        );
    }

    pub fn drain_due(&mut self, now_ms: u64) -> Vec<ScheduledEvent> {
        let later = self.pending.split_off(&(now_ms.saturating_add(1), 0));
        let due = std::mem::replace(&mut self.pending, later);
        due.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Fires every `interval_ms`, catching up if a tick spans several intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingTimer {
    interval_ms: u64,
    next_fire_ms: u64,
}

impl RepeatingTimer {
    pub fn new(interval_ms: u64, start_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            interval_ms,
            next_fire_ms: start_ms.saturating_add(interval_ms),
        }
    }

    /// Number of times the timer fired up to and including `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> u32 {
        let mut fired = 0;
        while now_ms >= self.next_fire_ms {
            fired += 1;
            self.next_fire_ms = self.next_fire_ms.saturating_add(self.interval_ms);
        }
        fired
    }

    pub fn next_fire_ms(&self) -> u64 {
        self.next_fire_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_events_in_order() {
        let mut queue = EventQueue::new();
        queue.schedule(300, EntityId(1), DeferredAction::Despawn);
        queue.schedule(100, EntityId(2), DeferredAction::RestoreSpeed);
        queue.schedule(100, EntityId(3), DeferredAction::ExpireSword);
        queue.schedule(200, EntityId(4), DeferredAction::Despawn);

        let due = queue.drain_due(200);
        let targets: Vec<EntityId> = due.iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![EntityId(2), EntityId(3), EntityId(4)]);
        assert_eq!(queue.len(), 1);
        assert!(queue.drain_due(299).is_empty());
        assert_eq!(queue.drain_due(300).len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn same_time_events_keep_scheduling_order() {
        let mut queue = EventQueue::new();
        for i in 0..5 {
            queue.schedule(10, EntityId(i), DeferredAction::Despawn);
        }
        let ids: Vec<u64> = queue.drain_due(10).iter().map(|e| e.target.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn repeating_timer_fires_each_interval() {
        let mut timer = RepeatingTimer::new(5_000, 0);
        assert_eq!(timer.poll(4_999), 0);
        assert_eq!(timer.poll(5_000), 1);
        assert_eq!(timer.poll(5_001), 0);
        assert_eq!(timer.poll(20_000), 3);
        assert_eq!(timer.next_fire_ms(), 25_000);
    }
}
