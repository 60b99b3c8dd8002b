use std::time::{Duration, Instant};

/// Mute gate armed by every trigger. Never reset; it ages out.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    duration: Duration,
    last_trigger: Option<Instant>,
}

impl CooldownGate {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            last_trigger: None,
        }
    }

    pub fn is_muted(&self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last_trigger = self.last_trigger?;
        let elapsed = now.saturating_duration_since(last_trigger);
        (elapsed < self.duration).then(|| self.duration - elapsed)
    }

    pub fn arm(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }
}
