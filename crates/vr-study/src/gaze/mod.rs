//! Gaze calibration, projection and pointer smoothing
//!
//! Raw eye-tracker directions are projected onto a plane in front of the
//! head, corrected with the offset/scale derived from a nine-point
//! calibration, and smoothed into the pointer the participant sees. The
//! head-pointer mode bypasses all of this and drives a canvas cursor from
//! head angles instead.

mod calibration;
mod head_cursor;
mod projector;
mod smoothing;

pub use calibration::{
    CalibrationSample, CalibrationState, CalibrationStep, GazeCalibrator, GazeCorrection,
    CALIBRATION_POINTS,
};
pub use head_cursor::HeadCursor;
pub use projector::{GazeProjector, PointerState};
pub use smoothing::{Smoothing, SmoothingKind};

use crate::spatial::Point3D;

/// Where the visible pointer is this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    /// Smoothed gaze pointer in world space
    World(Point3D),
    /// Head cursor in canvas-local coordinates
    Canvas(Point3D),
}
