//! Nine-point gaze calibration
//!
//! The participant fixates nine known targets in a fixed order; for each one
//! the raw (uncorrected) head-local gaze point is recorded. Once all nine are
//! in, an offset and a per-axis scale are derived:
//!
//! - offset = mean over all samples of `target - raw`, per axis
//! - scale  = mean of two estimates taken from the widely separated target
//!   pairs (3, 4) and (5, 6):
//!   `(target_a - target_b) / ((raw_a + offset) - (raw_b + offset))`
//!
//! A pair whose corrected raw points nearly coincide would divide by zero;
//! such a pass is rejected and collection restarts.

use tracing::{debug, info, warn};

use crate::error::{Axis, CalibrationError, ConfigError};
use crate::spatial::Vec2;

/// Number of calibration targets in one pass.
pub const CALIBRATION_POINTS: usize = 9;

/// Target pairs whose separation drives the scale estimate.
const SCALE_PAIRS: [(usize, usize); 2] = [(3, 4), (5, 6)];

/// Smallest raw separation accepted as a scale denominator.
const MIN_DENOMINATOR: f32 = 1e-3;

/// One recorded (known target, measured gaze) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    pub index: usize,
    pub target: Vec2,
    pub raw: Vec2,
}

/// Affine per-axis correction applied to raw head-local gaze points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeCorrection {
    pub offset_x: f32,
    pub offset_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl GazeCorrection {
    /// No correction
    pub const IDENTITY: Self = Self {
        offset_x: 0.0,
        offset_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Offset first, then scale.
    pub fn apply(&self, raw: Vec2) -> Vec2 {
        Vec2::new(
            (raw.x + self.offset_x) * self.scale_x,
            (raw.y + self.offset_y) * self.scale_y,
        )
    }

    /// Derive the correction from a complete, ordered sample set.
    pub fn compute(samples: &[CalibrationSample; CALIBRATION_POINTS]) -> Result<Self, CalibrationError> {
        let count = samples.len() as f32;
        let (sum_x, sum_y) = samples.iter().fold((0.0f32, 0.0f32), |(sx, sy), s| {
            (sx + (s.target.x - s.raw.x), sy + (s.target.y - s.raw.y))
        });
        let offset_x = sum_x / count;
        let offset_y = sum_y / count;

        let scale_x = Self::axis_scale(samples, Axis::X, offset_x)?;
        let scale_y = Self::axis_scale(samples, Axis::Y, offset_y)?;

        Ok(Self {
            offset_x,
            offset_y,
            scale_x,
            scale_y,
        })
    }

    fn axis_scale(
        samples: &[CalibrationSample; CALIBRATION_POINTS],
        axis: Axis,
        offset: f32,
    ) -> Result<f32, CalibrationError> {
        let component = |v: Vec2| match axis {
            Axis::X => v.x,
            Axis::Y => v.y,
        };

        let mut sum = 0.0f32;
        for (a, b) in SCALE_PAIRS {
            let numerator = component(samples[a].target) - component(samples[b].target);
            let denominator =
                (component(samples[a].raw) + offset) - (component(samples[b].raw) + offset);
            if !denominator.is_finite() || denominator.abs() < MIN_DENOMINATOR {
                return Err(CalibrationError::DegenerateDenominator {
                    axis,
                    a,
                    b,
                    denominator,
                });
            }
            sum += numerator / denominator;
        }

        let scale = sum / SCALE_PAIRS.len() as f32;
        if !scale.is_finite() || scale.abs() < f32::EPSILON {
            return Err(CalibrationError::InvalidScale { axis, value: scale });
        }
        Ok(scale)
    }
}

impl Default for GazeCorrection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Calibration state machine
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationState {
    /// Not calibrating, no correction yet
    Idle,
    /// Collecting samples in index order
    Collecting { samples: Vec<CalibrationSample> },
    /// A correction is available
    Calibrated(GazeCorrection),
}

/// Result of feeding one sample to the calibrator
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationStep {
    /// Out of range, out of order, or not collecting
    Ignored,
    /// Stored; the next target index to fixate
    Recorded { next: usize },
    /// Ninth sample stored and a correction derived
    Calibrated(GazeCorrection),
    /// Ninth sample stored but the pass was degenerate; collection restarted
    Rejected(CalibrationError),
}

/// Collects calibration samples and derives the gaze correction.
#[derive(Debug, Clone)]
pub struct GazeCalibrator {
    targets: [Vec2; CALIBRATION_POINTS],
    state: CalibrationState,
}

impl GazeCalibrator {
    pub fn new(targets: [Vec2; CALIBRATION_POINTS]) -> Self {
        Self {
            targets,
            state: CalibrationState::Idle,
        }
    }

    /// Build from a configured target list, which must hold exactly nine points.
    pub fn from_targets(targets: &[Vec2]) -> Result<Self, ConfigError> {
        let targets: [Vec2; CALIBRATION_POINTS] = targets.try_into().map_err(|_| {
            ConfigError::Invalid(format!(
                "expected {} calibration targets, got {}",
                CALIBRATION_POINTS,
                targets.len()
            ))
        })?;
        Ok(Self::new(targets))
    }

    /// Begin a pass, discarding any samples in flight.
    pub fn start(&mut self) {
        self.state = CalibrationState::Collecting {
            samples: Vec::with_capacity(CALIBRATION_POINTS),
        };
        info!("Gaze calibration started ({} points)", CALIBRATION_POINTS);
    }

    /// Restart from the first target; the previous correction is dropped.
    pub fn recalibrate(&mut self) {
        self.start();
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.state, CalibrationState::Collecting { .. })
    }

    /// Index of the target the participant should fixate next.
    pub fn next_index(&self) -> Option<usize> {
        match &self.state {
            CalibrationState::Collecting { samples } => Some(samples.len()),
            _ => None,
        }
    }

    /// Position of the target to display next.
    pub fn current_target(&self) -> Option<Vec2> {
        self.next_index().map(|i| self.targets[i])
    }

    pub fn targets(&self) -> &[Vec2; CALIBRATION_POINTS] {
        &self.targets
    }

    pub fn correction(&self) -> Option<GazeCorrection> {
        match self.state {
            CalibrationState::Calibrated(correction) => Some(correction),
            _ => None,
        }
    }

    /// Record the raw gaze point for calibration target `index`.
    pub fn record_sample(&mut self, index: usize, raw: Vec2) -> CalibrationStep {
        let CalibrationState::Collecting { samples } = &mut self.state else {
            warn!("Calibration sample {} ignored: not calibrating", index);
            return CalibrationStep::Ignored;
        };

        if index >= CALIBRATION_POINTS || index != samples.len() {
            warn!(
                "Calibration sample {} ignored: expected index {}",
                index,
                samples.len()
            );
            return CalibrationStep::Ignored;
        }

        samples.push(CalibrationSample {
            index,
            target: self.targets[index],
            raw,
        });
        debug!("Calibration sample {}: raw=({:.1}, {:.1})", index, raw.x, raw.y);

        if samples.len() < CALIBRATION_POINTS {
            return CalibrationStep::Recorded {
                next: samples.len(),
            };
        }

        let complete: [CalibrationSample; CALIBRATION_POINTS] = match samples.as_slice().try_into() {
            Ok(complete) => complete,
            Err(_) => return CalibrationStep::Ignored,
        };

        match GazeCorrection::compute(&complete) {
            Ok(correction) => {
                info!(
                    "Gaze calibration complete: offset=({:.2}, {:.2}) scale=({:.4}, {:.4})",
                    correction.offset_x, correction.offset_y, correction.scale_x, correction.scale_y
                );
                self.state = CalibrationState::Calibrated(correction);
                CalibrationStep::Calibrated(correction)
            }
            Err(err) => {
                warn!("Gaze calibration rejected, please retry: {}", err);
                self.start();
                CalibrationStep::Rejected(err)
            }
        }
    }
}
