//! vr-study: controllers for eye-tracking VR user studies
//!
//! This crate provides the logic behind two head-mounted display studies:
//! - Nine-point gaze calibration and smoothed gaze projection
//! - Selection detectors for button press, dwell, wink, blink, nod and head pointer
//! - A depth-of-field focus study scored against known image distances
//! - A UI selection study with false-positive counting
//! - Countdown sequencing, shuffled target schedules and CSV logging
//!
//! Rendering, audio and tracking hardware stay behind [`SceneBridge`] and
//! [`FrameInput`], so the controllers run the same against a headset, a
//! recorded trace or a terminal simulator.

pub mod bridge;
pub mod config;
pub mod error;
pub mod gaze;
pub mod input;
pub mod record;
pub mod selection;
pub mod session;
pub mod spatial;
pub mod study;

// Re-export commonly used types
pub use bridge::{Cue, NullSceneBridge, SceneBridge};
pub use config::StudyConfig;
pub use error::{ConfigError, LogError, Result, StudyError};
pub use gaze::{GazeCalibrator, GazeCorrection, GazeProjector, Pointer};
pub use input::{EyeClosure, FrameInput, RegionEvent, RegionEventKind};
pub use record::{FileLogSink, LogRecord, LogSink};
pub use selection::{SelectionDetector, SelectionMode};
pub use session::{SelectOutcome, SelectionEvent, SessionState};
pub use spatial::{Point3D, Quaternion, Transform, Vec2, Vector3D};
pub use study::{launch, FocusStudy, StudyController, StudyKind, StudyPhase, UiStudy};
