//! Calibration pass shared by both studies

use tracing::{info, warn};

use crate::bridge::SceneBridge;
use crate::gaze::{CalibrationStep, GazeCalibrator, GazeProjector};
use crate::input::FrameInput;

/// Begin a pass: hide the pointer and show the first calibration point.
pub(crate) fn begin<B: SceneBridge>(calibrator: &mut GazeCalibrator, bridge: &mut B) {
    calibrator.start();
    bridge.set_pointer_visible(false);
    bridge.set_center_mark_visible(false);
    bridge.show_calibration_point(calibrator.current_target());
}

/// Record the raw gaze for the shown point when the primary key goes down.
///
/// Returns true once the pass completes with a usable correction.
pub(crate) fn on_frame<B: SceneBridge>(
    calibrator: &mut GazeCalibrator,
    projector: &mut GazeProjector,
    frame: &FrameInput,
    bridge: &mut B,
) -> bool {
    if !frame.primary_pressed {
        return false;
    }
    let Some(index) = calibrator.next_index() else {
        return false;
    };
    let Some(direction) = frame.gaze_direction else {
        warn!("Calibration point {} not recorded: no gaze sample", index);
        return false;
    };

    let raw = projector.raw_local_point(direction, &frame.head);
    match calibrator.record_sample(index, raw) {
        CalibrationStep::Ignored => false,
        CalibrationStep::Recorded { .. } => {
            bridge.show_calibration_point(calibrator.current_target());
            false
        }
        CalibrationStep::Calibrated(correction) => {
            projector.set_correction(correction);
            projector.recenter(&frame.head);
            bridge.show_calibration_point(None);
            bridge.set_center_mark_visible(true);
            bridge.set_pointer_visible(true);
            info!("Calibration accepted");
            true
        }
        CalibrationStep::Rejected(_) => {
            // collection restarted at the first point
            bridge.show_calibration_point(calibrator.current_target());
            false
        }
    }
}
