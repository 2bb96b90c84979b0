//! Error types for study configuration, calibration and logging.

use std::path::PathBuf;

/// Which axis of the gaze plane an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Errors raised while loading or validating a study configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Reasons a calibration pass is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalibrationError {
    #[error("Calibration pair ({a}, {b}) has a degenerate {axis} denominator ({denominator})")]
    DegenerateDenominator {
        axis: Axis,
        a: usize,
        b: usize,
        denominator: f32,
    },

    #[error("Calibration produced an unusable {axis} scale ({value})")]
    InvalidScale { axis: Axis, value: f32 },
}

/// Errors raised by a log sink.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Log I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log sink is not open")]
    NotOpen,
}

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Log(#[from] LogError),
}

pub type Result<T> = std::result::Result<T, StudyError>;
