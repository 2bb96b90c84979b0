//! One-shot actions scheduled against the frame clock

use std::time::Duration;

/// Actions keyed by expiry time, polled once per tick.
///
/// Actions due at the same time come out in the order they were scheduled.
#[derive(Debug, Clone)]
pub struct DeferredQueue<A> {
    entries: Vec<(Duration, A)>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once the clock reaches `at`.
    pub fn schedule(&mut self, at: Duration, action: A) {
        let index = self.entries.partition_point(|(due, _)| *due <= at);
        self.entries.insert(index, (at, action));
    }

    /// Run `action` `delay` after `now`.
    pub fn schedule_after(&mut self, now: Duration, delay: Duration, action: A) {
        self.schedule(now + delay, action);
    }

    /// Remove and return every action due at or before `now`.
    pub fn poll(&mut self, now: Duration) -> Vec<A> {
        let due = self.entries.partition_point(|(at, _)| *at <= now);
        self.entries.drain(..due).map(|(_, action)| action).collect()
    }
}
