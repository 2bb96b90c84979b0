//! Head-nod selection

use std::time::Duration;

use tracing::debug;

/// Detects a nod from head pitch (degrees, positive looking down).
///
/// Tilting past `down_deg` arms the detector. While armed, a pitch below
/// `up_deg` completes the nod, which fires only when more than
/// `min_interval` has passed since the previous nod. The very first nod is
/// always allowed.
#[derive(Debug, Clone)]
pub struct NodDetector {
    down_deg: f32,
    up_deg: f32,
    min_interval: Duration,
    in_progress: bool,
    last_nod: Option<Duration>,
}

impl NodDetector {
    pub fn new(down_deg: f32, up_deg: f32, min_interval: Duration) -> Self {
        Self {
            down_deg,
            up_deg,
            min_interval,
            in_progress: false,
            last_nod: None,
        }
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn update(&mut self, pitch: f32, now: Duration) -> bool {
        // With the recorded study thresholds (10° / 50°) the bands overlap:
        // a pitch held between them arms and completes on the same frame,
        // so a held head nods again each time `min_interval` has passed.
        if !self.in_progress && pitch > self.down_deg {
            self.in_progress = true;
        }

        if !self.in_progress || pitch >= self.up_deg {
            return false;
        }
        self.in_progress = false;

        let allowed = self
            .last_nod
            .map_or(true, |last| now.saturating_sub(last) > self.min_interval);
        if allowed {
            self.last_nod = Some(now);
        } else {
            debug!("Nod at {:.3}s suppressed", now.as_secs_f32());
        }
        allowed
    }

    pub fn reset(&mut self) {
        self.in_progress = false;
        self.last_nod = None;
    }
}
