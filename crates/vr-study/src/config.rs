//! Study configuration loaded from TOML.
//!
//! Every field has a default reproducing the constants the studies were run
//! with, so an empty file yields a usable configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::gaze::{SmoothingKind, CALIBRATION_POINTS};
use crate::selection::SelectionMode;
use crate::spatial::Vec2;
use crate::study::FocusMode;

/// Complete configuration for one study session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub study: SessionConfig,
    pub gaze: GazeConfig,
    pub selection: SelectionConfig,
    pub focus: FocusConfig,
    pub ui: UiConfig,
}

/// Participant and output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Participant id, used as the log file prefix
    pub id: u32,
    /// Directory the CSV log is appended to
    pub log_dir: PathBuf,
    /// Fixed seed for the target shuffle; random when absent
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: 0,
            log_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

/// Gaze projection and calibration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Distance of the projection plane in front of the head
    pub plane_distance: f32,
    /// Head-local depth the corrected pointer is pinned to
    pub fixed_depth: f32,
    /// Regular pointer smoothing rate (per second)
    pub smoothing_rate: f32,
    /// Smoothing rate while hovering a target in gesture modes
    pub hover_smoothing_rate: f32,
    /// Pointer smoothing filter
    pub filter: SmoothingKind,
    /// Head-local positions of the nine calibration targets, in order
    pub calibration_targets: Vec<Vec2>,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            plane_distance: 2300.0,
            fixed_depth: 2300.0,
            smoothing_rate: 10.0,
            hover_smoothing_rate: 4.0,
            filter: SmoothingKind::FrameLerp,
            calibration_targets: default_calibration_targets(),
        }
    }
}

/// Center, top, bottom, then the two diagonals used for scale, then left and right.
fn default_calibration_targets() -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 600.0),
        Vec2::new(0.0, -600.0),
        Vec2::new(-800.0, 600.0),
        Vec2::new(800.0, -600.0),
        Vec2::new(800.0, 600.0),
        Vec2::new(-800.0, -600.0),
        Vec2::new(-800.0, 0.0),
        Vec2::new(800.0, 0.0),
    ]
}

/// Selection detector thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub mode: SelectionMode,
    pub dwell_ms: u64,
    /// Closure weight above which an eye counts as shut for a blink
    pub blink_threshold: f32,
    pub blink_ms: u64,
    /// Closure weight below which an eye counts as open for a wink
    pub wink_open_threshold: f32,
    pub wink_ms: u64,
    /// Pitch (degrees, positive down) that arms a nod
    pub nod_down_deg: f32,
    /// Pitch below which an armed nod completes
    pub nod_up_deg: f32,
    pub nod_interval_ms: u64,
    /// Head-pointer pitch range mapped onto the full canvas height
    pub head_pitch_range_deg: f32,
    /// Head-pointer yaw range mapped onto the full canvas width
    pub head_yaw_range_deg: f32,
    pub canvas_half_width: f32,
    pub canvas_half_height: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Dwell,
            dwell_ms: 300,
            blink_threshold: 0.1,
            blink_ms: 150,
            wink_open_threshold: 0.05,
            wink_ms: 50,
            nod_down_deg: 10.0,
            nod_up_deg: 50.0,
            nod_interval_ms: 500,
            head_pitch_range_deg: 30.0,
            head_yaw_range_deg: 53.0,
            canvas_half_width: 1920.0,
            canvas_half_height: 1080.0,
        }
    }
}

impl SelectionConfig {
    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn wink(&self) -> Duration {
        Duration::from_millis(self.wink_ms)
    }

    pub fn nod_interval(&self) -> Duration {
        Duration::from_millis(self.nod_interval_ms)
    }
}

/// Timing of the pre-study countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Time before the first cue
    pub start_ms: u64,
    /// Second cue, measured from the first
    pub countdown_offset_ms: u64,
    /// Study start, measured from the first cue
    pub running_offset_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            start_ms: 30_000,
            countdown_offset_ms: 3_000,
            running_offset_ms: 5_000,
        }
    }
}

/// Focus study settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub mode: FocusMode,
    pub sequence: SequenceConfig,
    /// Holds at or below this are not counted as focus attempts
    pub min_hold_ms: u64,
    pub min_pitch_deg: f32,
    pub max_pitch_deg: f32,
    pub near_distance: f32,
    pub far_distance: f32,
    /// Depth of field distance the focus resets to between trials
    pub center_distance: f32,
    /// Distance of the reference plane for gaze-contingent focus
    pub reference_distance: f32,
    pub startup_reset_ms: u64,
    pub countdown_reset_ms: u64,
    pub trial_reset_ms: u64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            mode: FocusMode::HeadPitch,
            sequence: SequenceConfig {
                start_ms: 40_000,
                countdown_offset_ms: 2_000,
                running_offset_ms: 3_500,
            },
            min_hold_ms: 250,
            min_pitch_deg: -5.0,
            max_pitch_deg: 20.0,
            near_distance: 3650.0,
            far_distance: 4900.0,
            center_distance: 4300.0,
            reference_distance: 5.0,
            startup_reset_ms: 2_000,
            countdown_reset_ms: 1_000,
            trial_reset_ms: 1_500,
        }
    }
}

/// UI selection study settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sequence: SequenceConfig,
    /// Pause between a selection and the next target indication
    pub next_target_delay_ms: u64,
    /// Vertical offset applied to the corrected gaze point
    pub vertical_shift: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sequence: SequenceConfig::default(),
            next_target_delay_ms: 2_000,
            vertical_shift: -350.0,
        }
    }
}

impl StudyConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded study config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the session misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gaze = &self.gaze;
        if !(gaze.smoothing_rate > 0.0) || !(gaze.hover_smoothing_rate > 0.0) {
            return Err(ConfigError::Invalid(
                "smoothing rates must be positive".to_string(),
            ));
        }
        if gaze.plane_distance <= 0.0 {
            return Err(ConfigError::Invalid(
                "plane_distance must be positive".to_string(),
            ));
        }

        let targets = &gaze.calibration_targets;
        if targets.len() != CALIBRATION_POINTS {
            return Err(ConfigError::Invalid(format!(
                "expected {} calibration targets, got {}",
                CALIBRATION_POINTS,
                targets.len()
            )));
        }
        for (a, b) in [(3, 4), (5, 6)] {
            if targets[a].x == targets[b].x || targets[a].y == targets[b].y {
                return Err(ConfigError::Invalid(format!(
                    "calibration targets {} and {} must differ on both axes",
                    a, b
                )));
            }
        }

        let selection = &self.selection;
        if !(0.0..=1.0).contains(&selection.blink_threshold)
            || !(0.0..=1.0).contains(&selection.wink_open_threshold)
        {
            return Err(ConfigError::Invalid(
                "eye closure thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if selection.head_pitch_range_deg <= 0.0 || selection.head_yaw_range_deg <= 0.0 {
            return Err(ConfigError::Invalid(
                "head pointer ranges must be positive".to_string(),
            ));
        }

        if self.focus.max_pitch_deg <= self.focus.min_pitch_deg {
            return Err(ConfigError::Invalid(
                "focus max_pitch_deg must exceed min_pitch_deg".to_string(),
            ));
        }

        Ok(())
    }
}
