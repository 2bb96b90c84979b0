//! Dwell-time selection

use std::time::Duration;

use crate::input::{RegionEvent, RegionEventKind, RegionId};

/// Fires once when the pointer stays inside one region for `threshold`.
///
/// Entering a region (or a different one) restarts the timer; leaving the
/// hovered region re-arms the detector.
#[derive(Debug, Clone)]
pub struct DwellDetector {
    threshold: Duration,
    hovered: Option<RegionId>,
    entered_at: Duration,
    fired: bool,
}

impl DwellDetector {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            hovered: None,
            entered_at: Duration::ZERO,
            fired: false,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Process this frame's region events at session time `now`.
    pub fn update(&mut self, events: &[RegionEvent], now: Duration) -> bool {
        let mut fired = false;
        for event in events {
            match event.kind {
                RegionEventKind::Enter => {
                    self.hovered = Some(event.region.clone());
                    self.entered_at = now;
                    self.fired = false;
                }
                RegionEventKind::Stay => {
                    if self.hovered.as_deref() != Some(event.region.as_str()) || self.fired {
                        continue;
                    }
                    if now.saturating_sub(self.entered_at) >= self.threshold {
                        self.fired = true;
                        fired = true;
                    }
                }
                RegionEventKind::Exit => {
                    if self.hovered.as_deref() == Some(event.region.as_str()) {
                        self.reset();
                    }
                }
            }
        }
        fired
    }

    pub fn reset(&mut self) {
        self.hovered = None;
        self.fired = false;
    }

    /// Re-arm without leaving the hovered region; the hold counts from `now`.
    pub fn restart(&mut self, now: Duration) {
        self.entered_at = now;
        self.fired = false;
    }
}
