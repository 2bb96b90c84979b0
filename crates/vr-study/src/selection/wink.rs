//! Single-eye wink

use std::time::Duration;

use tracing::debug;

use crate::input::EyeClosure;

/// Fires once when exactly one eye stays open for `hold`.
///
/// An eye counts as open while its closure weight is below
/// `open_threshold`. The hold is measured from the first asymmetric frame;
/// symmetry (both open or both closed) resets it.
#[derive(Debug, Clone)]
pub struct WinkDetector {
    open_threshold: f32,
    hold: Duration,
    started_at: Option<Duration>,
    winking: bool,
}

impl WinkDetector {
    pub fn new(open_threshold: f32, hold: Duration) -> Self {
        Self {
            open_threshold,
            hold,
            started_at: None,
            winking: false,
        }
    }

    pub fn is_winking(&self) -> bool {
        self.winking
    }

    pub fn update(&mut self, eyes: EyeClosure, now: Duration) -> bool {
        if !eyes.one_below(self.open_threshold) {
            self.reset();
            return false;
        }

        match self.started_at {
            None => {
                debug!("Eye asymmetry started at {:.3}s", now.as_secs_f32());
                self.started_at = Some(now);
                false
            }
            Some(start) => {
                if now.saturating_sub(start) >= self.hold && !self.winking {
                    self.winking = true;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.started_at = None;
        self.winking = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn left_wink() -> EyeClosure {
        EyeClosure::new(0.9, 0.0)
    }

    fn detector() -> WinkDetector {
        WinkDetector::new(0.05, ms(50))
    }

    #[test]
    fn test_sustained_wink_fires_once() {
        let mut d = detector();
        assert!(!d.update(left_wink(), ms(1_000)));
        assert!(!d.update(left_wink(), ms(1_030)));
        assert!(d.update(left_wink(), ms(1_050)));
        assert!(!d.update(left_wink(), ms(1_200)));
        assert!(d.is_winking());
    }

    #[test]
    fn test_first_asymmetric_frame_never_fires() {
        let mut d = WinkDetector::new(0.05, Duration::ZERO);
        assert!(!d.update(left_wink(), ms(0)));
        assert!(d.update(left_wink(), ms(10)));
    }

    #[test]
    fn test_symmetry_resets() {
        let mut d = detector();
        d.update(left_wink(), ms(0));
        assert!(!d.update(EyeClosure::OPEN, ms(40)));
        assert!(!d.update(left_wink(), ms(60)));
        assert!(!d.update(left_wink(), ms(100)));
        assert!(d.update(left_wink(), ms(110)));
    }

    #[test]
    fn test_both_closed_is_not_a_wink() {
        let mut d = detector();
        for t in 0..10 {
            assert!(!d.update(EyeClosure::CLOSED, ms(t * 20)));
        }
    }
}
