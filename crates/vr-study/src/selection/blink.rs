//! Deliberate both-eye blink

use std::time::Duration;

use tracing::debug;

use crate::input::EyeClosure;

/// Fires once when both eyes stay closed for `hold`.
///
/// Closure time is accumulated from frame deltas; opening either eye
/// resets the timer and re-arms the detector.
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    threshold: f32,
    hold: Duration,
    closed_for: Duration,
    blinking: bool,
}

impl BlinkDetector {
    pub fn new(threshold: f32, hold: Duration) -> Self {
        Self {
            threshold,
            hold,
            closed_for: Duration::ZERO,
            blinking: false,
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    pub fn update(&mut self, eyes: EyeClosure, dt: Duration) -> bool {
        if !eyes.both_above(self.threshold) {
            if self.blinking {
                debug!("Blink ended after {:?}", self.closed_for);
            }
            self.reset();
            return false;
        }

        self.closed_for += dt;
        if self.closed_for >= self.hold && !self.blinking {
            self.blinking = true;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.closed_for = Duration::ZERO;
        self.blinking = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> BlinkDetector {
        BlinkDetector::new(0.1, Duration::from_millis(150))
    }

    fn run(detector: &mut BlinkDetector, eyes: EyeClosure, frames: usize) -> usize {
        (0..frames)
            .filter(|_| detector.update(eyes, Duration::from_millis(50)))
            .count()
    }

    #[test]
    fn test_long_closure_fires_once() {
        let mut d = detector();
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 2), 0);
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 1), 1);
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 20), 0);
        assert!(d.is_blinking());
    }

    #[test]
    fn test_short_closure_ignored() {
        let mut d = detector();
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 2), 0);
        assert_eq!(run(&mut d, EyeClosure::OPEN, 1), 0);
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 2), 0);
    }

    #[test]
    fn test_one_open_eye_resets() {
        let mut d = detector();
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 3), 1);
        assert_eq!(run(&mut d, EyeClosure::new(1.0, 0.05), 1), 0);
        assert!(!d.is_blinking());
        assert_eq!(run(&mut d, EyeClosure::CLOSED, 3), 1);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut d = detector();
        assert_eq!(run(&mut d, EyeClosure::new(0.1, 0.1), 10), 0);
    }
}
