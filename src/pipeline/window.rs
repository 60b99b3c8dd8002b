use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

/// Sliding-window counter over event arrival instants.
///
/// Every observation evicts entries that are at least `duration` old, so the
/// retained set is always the trailing window ending at the latest `now`.
#[derive(Debug, Clone)]
pub struct EventWindow {
    duration: Duration,
    events: VecDeque<Instant>,
}

impl EventWindow {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            events: VecDeque::new(),
        }
    }

    pub fn record_and_count(&mut self, now: Instant) -> usize {
        self.events.push_back(now);
        self.evict(now);
        self.events.len()
    }

    pub fn count_at(&mut self, now: Instant) -> usize {
        self.evict(now);
        self.events.len()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn evict(&mut self, now: Instant) {
        let duration = self.duration;
        self.events
            .retain(|recorded| now.saturating_duration_since(*recorded) < duration);
    }
}
