//! Explicit selection-button trigger

use crate::input::FrameInput;

/// Fires whenever the pointer hits the selection button.
///
/// Used by both the button-press and head-pointer modes; there is no
/// debounce because the button disappears once used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerDetector;

impl TriggerDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn update(&mut self, frame: &FrameInput) -> bool {
        frame.selection_trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_fires_on_trigger_only() {
        let mut detector = TriggerDetector::new();
        let dt = Duration::from_millis(16);
        assert!(!detector.update(&FrameInput::new(dt)));
        assert!(detector.update(&FrameInput::new(dt).with_trigger()));
    }
}
