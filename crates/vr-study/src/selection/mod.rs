//! Selection gesture detectors
//!
//! One detector is active per session, chosen from the configured
//! [`SelectionMode`]. A detector only decides *that* a select gesture
//! happened; which target it applies to is resolved by the session's
//! highlight state.

mod blink;
mod dwell;
mod nod;
mod trigger;
mod wink;

pub use blink::BlinkDetector;
pub use dwell::DwellDetector;
pub use nod::NodDetector;
pub use trigger::TriggerDetector;
pub use wink::WinkDetector;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SelectionConfig;
use crate::input::FrameInput;

/// How the participant confirms a highlighted target.
///
/// The numeric ids are the ones written to the UI log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Gaze pointer plus a separate selection button
    ButtonPress,
    /// Gaze pointer held on the target
    Dwell,
    /// Single-eye closure
    Wink,
    /// Both-eye closure
    Blink,
    /// Head nod
    Nod,
    /// Head-driven cursor plus the selection button
    HeadPointer,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 6] = [
        SelectionMode::ButtonPress,
        SelectionMode::Dwell,
        SelectionMode::Wink,
        SelectionMode::Blink,
        SelectionMode::Nod,
        SelectionMode::HeadPointer,
    ];

    pub fn id(&self) -> u8 {
        match self {
            SelectionMode::ButtonPress => 1,
            SelectionMode::Dwell => 2,
            SelectionMode::Wink => 3,
            SelectionMode::Blink => 4,
            SelectionMode::Nod => 5,
            SelectionMode::HeadPointer => 6,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.id() == id)
    }

    /// Whether the pointer is driven by eye gaze (everything but head pointing).
    pub fn uses_eye_gaze(&self) -> bool {
        !matches!(self, SelectionMode::HeadPointer)
    }

    /// Whether hovering a target slows the pointer down.
    pub fn uses_hover_smoothing(&self) -> bool {
        matches!(
            self,
            SelectionMode::Wink | SelectionMode::Blink | SelectionMode::Nod
        )
    }

    /// Whether hovering a target reveals the selection button.
    pub fn uses_selection_button(&self) -> bool {
        matches!(self, SelectionMode::ButtonPress | SelectionMode::HeadPointer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::ButtonPress => "button-press",
            SelectionMode::Dwell => "dwell",
            SelectionMode::Wink => "wink",
            SelectionMode::Blink => "blink",
            SelectionMode::Nod => "nod",
            SelectionMode::HeadPointer => "head-pointer",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A qualifying select gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub mode: SelectionMode,
    /// Session time the gesture completed
    pub at: Duration,
}

/// The active detector, one variant per selection mode.
#[derive(Debug, Clone)]
pub enum SelectionDetector {
    ButtonPress(TriggerDetector),
    Dwell(DwellDetector),
    Wink(WinkDetector),
    Blink(BlinkDetector),
    Nod(NodDetector),
    HeadPointer(TriggerDetector),
}

impl SelectionDetector {
    /// Build the detector for `config.mode`.
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self::for_mode(config.mode, config)
    }

    pub fn for_mode(mode: SelectionMode, config: &SelectionConfig) -> Self {
        match mode {
            SelectionMode::ButtonPress => Self::ButtonPress(TriggerDetector::new()),
            SelectionMode::Dwell => Self::Dwell(DwellDetector::new(config.dwell())),
            SelectionMode::Wink => {
                Self::Wink(WinkDetector::new(config.wink_open_threshold, config.wink()))
            }
            SelectionMode::Blink => {
                Self::Blink(BlinkDetector::new(config.blink_threshold, config.blink()))
            }
            SelectionMode::Nod => Self::Nod(NodDetector::new(
                config.nod_down_deg,
                config.nod_up_deg,
                config.nod_interval(),
            )),
            SelectionMode::HeadPointer => Self::HeadPointer(TriggerDetector::new()),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        match self {
            Self::ButtonPress(_) => SelectionMode::ButtonPress,
            Self::Dwell(_) => SelectionMode::Dwell,
            Self::Wink(_) => SelectionMode::Wink,
            Self::Blink(_) => SelectionMode::Blink,
            Self::Nod(_) => SelectionMode::Nod,
            Self::HeadPointer(_) => SelectionMode::HeadPointer,
        }
    }

    /// Feed one frame; `now` is the session time after this frame's delta.
    pub fn update(&mut self, frame: &FrameInput, now: Duration) -> Option<Gesture> {
        let fired = match self {
            Self::ButtonPress(d) | Self::HeadPointer(d) => d.update(frame),
            Self::Dwell(d) => d.update(&frame.regions, now),
            Self::Wink(d) => frame.eyes.map_or(false, |eyes| d.update(eyes, now)),
            Self::Blink(d) => frame.eyes.map_or(false, |eyes| d.update(eyes, frame.dt)),
            Self::Nod(d) => d.update(frame.head_pitch(), now),
        };

        if fired {
            let mode = self.mode();
            debug!("{} gesture at {:.3}s", mode, now.as_secs_f32());
            Some(Gesture { mode, at: now })
        } else {
            None
        }
    }

    /// Forget any half-finished gesture at session time `now`.
    ///
    /// A dwell keeps its hovered region and starts timing again.
    pub fn reset(&mut self, now: Duration) {
        match self {
            Self::ButtonPress(_) | Self::HeadPointer(_) => {}
            Self::Dwell(d) => d.restart(now),
            Self::Wink(d) => d.reset(),
            Self::Blink(d) => d.reset(),
            Self::Nod(d) => d.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{EyeClosure, RegionEvent};

    #[test]
    fn test_mode_ids_round_trip() {
        for mode in SelectionMode::ALL {
            assert_eq!(SelectionMode::from_id(mode.id()), Some(mode));
        }
        assert_eq!(SelectionMode::from_id(0), None);
        assert_eq!(SelectionMode::from_id(7), None);
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(!SelectionMode::HeadPointer.uses_eye_gaze());
        assert!(SelectionMode::Nod.uses_hover_smoothing());
        assert!(!SelectionMode::Dwell.uses_hover_smoothing());
        assert!(SelectionMode::ButtonPress.uses_selection_button());
        assert!(!SelectionMode::Blink.uses_selection_button());
    }

    #[test]
    fn test_dispatch_builds_configured_mode() {
        let mut config = SelectionConfig::default();
        for mode in SelectionMode::ALL {
            config.mode = mode;
            assert_eq!(SelectionDetector::from_config(&config).mode(), mode);
        }
    }

    #[test]
    fn test_dispatch_reports_gesture() {
        let mut detector =
            SelectionDetector::for_mode(SelectionMode::Dwell, &SelectionConfig::default());
        let dt = Duration::from_millis(100);
        let enter = FrameInput::new(dt).with_region(RegionEvent::enter("1"));
        assert_eq!(detector.update(&enter, Duration::from_millis(100)), None);

        let stay = FrameInput::new(dt).with_region(RegionEvent::stay("1"));
        assert_eq!(detector.update(&stay, Duration::from_millis(200)), None);
        let gesture = detector.update(&stay, Duration::from_millis(400));
        assert_eq!(
            gesture,
            Some(Gesture {
                mode: SelectionMode::Dwell,
                at: Duration::from_millis(400)
            })
        );
    }

    #[test]
    fn test_reset_clears_blink_accumulation() {
        let mut detector =
            SelectionDetector::for_mode(SelectionMode::Blink, &SelectionConfig::default());
        let closed = FrameInput::new(Duration::from_millis(100)).with_eyes(EyeClosure::CLOSED);
        assert_eq!(detector.update(&closed, Duration::from_millis(100)), None);
        detector.reset(Duration::from_millis(100));
        assert_eq!(detector.update(&closed, Duration::from_millis(200)), None);
        assert!(detector.update(&closed, Duration::from_millis(300)).is_some());
    }

    #[test]
    fn test_eye_modes_ignore_frames_without_face_tracking() {
        let mut detector =
            SelectionDetector::for_mode(SelectionMode::Blink, &SelectionConfig::default());
        let frame = FrameInput::new(Duration::from_secs(1));
        assert_eq!(detector.update(&frame, Duration::from_secs(1)), None);
    }
}
