//! Monotonic frame clock

use std::time::Duration;

/// Accumulates frame delta times into a monotonic session time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClock {
    /// Time since the session started
    pub now: Duration,
    /// Time since last frame
    pub delta: Duration,
    /// Frames elapsed
    pub tick: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame.
    pub fn advance(&mut self, dt: Duration) -> Duration {
        self.delta = dt;
        self.now += dt;
        self.tick = self.tick.wrapping_add(1);
        self.now
    }

    /// Seconds elapsed since `since`, zero if `since` lies in the future.
    pub fn seconds_since(&self, since: Duration) -> f32 {
        self.now.saturating_sub(since).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(16));
        clock.advance(Duration::from_millis(17));
        assert_eq!(clock.now, Duration::from_millis(33));
        assert_eq!(clock.delta, Duration::from_millis(17));
        assert_eq!(clock.tick, 2);
    }

    #[test]
    fn test_seconds_since() {
        let mut clock = FrameClock::new();
        clock.advance(Duration::from_millis(1500));
        assert!((clock.seconds_since(Duration::from_millis(500)) - 1.0).abs() < 1e-6);
        assert_eq!(clock.seconds_since(Duration::from_secs(10)), 0.0);
    }
}
