//! Study controllers and their building blocks
//!
//! Both studies share the same skeleton: a nine-point calibration pass,
//! then a timed countdown into a running phase that draws targets from a
//! shuffled schedule until it is exhausted.

mod calibration;
mod deferred;
mod focus;
mod focus_error;
mod scheduler;
mod sequencer;
mod target;
mod ui;

pub use deferred::DeferredQueue;
pub use focus::{FocusMode, FocusStudy};
pub use focus_error::{FocusErrorEvaluator, ImageCoord};
pub use scheduler::TargetScheduler;
pub use sequencer::{StudyPhase, StudySequencer};
pub use target::{Direction, DIRECTION_REPEATS, FOCUS_IMAGE_COUNT};
pub use ui::UiStudy;

use std::fmt;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bridge::SceneBridge;
use crate::config::StudyConfig;
use crate::input::FrameInput;
use crate::record::{FileLogSink, LocalClock};

/// Which of the two studies a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyKind {
    Focus,
    Ui,
}

impl StudyKind {
    /// Log file name for participant `id`.
    pub fn log_file_name(&self, id: u32) -> String {
        match self {
            StudyKind::Focus => format!("{}_focus_log.csv", id),
            StudyKind::Ui => format!("{}_UI_log.csv", id),
        }
    }

    pub fn log_path(&self, dir: &Path, id: u32) -> PathBuf {
        dir.join(self.log_file_name(id))
    }
}

impl fmt::Display for StudyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudyKind::Focus => f.write_str("focus"),
            StudyKind::Ui => f.write_str("ui"),
        }
    }
}

/// A study controller advanced once per frame.
pub trait StudyController {
    /// Advance one frame; returns the phase entered this frame, if any.
    fn update(&mut self, frame: &FrameInput) -> Option<StudyPhase>;

    fn phase(&self) -> StudyPhase;

    fn is_calibrating(&self) -> bool;

    /// Trials written to the log so far
    fn trials_completed(&self) -> usize;

    /// One-line human-readable progress summary
    fn summary(&self) -> String;
}

/// Build a controller for `kind` that logs to the participant's CSV file
/// under the configured log directory.
pub fn launch<B: SceneBridge + 'static>(
    kind: StudyKind,
    config: &StudyConfig,
    bridge: B,
) -> crate::Result<Box<dyn StudyController>> {
    config.validate()?;
    let path = kind.log_path(&config.study.log_dir, config.study.id);
    let sink = FileLogSink::new(&path);
    tracing::info!(
        "Participant {}: {} study, log {}",
        config.study.id,
        kind,
        path.display()
    );

    let controller: Box<dyn StudyController> = match kind {
        StudyKind::Focus => Box::new(FocusStudy::new(config, bridge, sink, Box::new(LocalClock))?),
        StudyKind::Ui => Box::new(UiStudy::new(config, bridge, sink, Box::new(LocalClock))?),
    };
    Ok(controller)
}

/// Target shuffle RNG, fixed when a seed is configured.
pub(crate) fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_names() {
        assert_eq!(StudyKind::Focus.log_file_name(12), "12_focus_log.csv");
        assert_eq!(StudyKind::Ui.log_file_name(3), "3_UI_log.csv");
        assert_eq!(
            StudyKind::Ui.log_path(Path::new("/tmp/logs"), 3),
            PathBuf::from("/tmp/logs/3_UI_log.csv")
        );
    }

    #[test]
    fn test_launch_rejects_invalid_config() {
        let mut config = StudyConfig::default();
        config.gaze.smoothing_rate = -1.0;
        let result = launch(StudyKind::Ui, &config, crate::bridge::NullSceneBridge);
        assert!(matches!(result, Err(crate::StudyError::Config(_))));
    }

    #[test]
    fn test_launch_starts_calibrating() {
        let controller = launch(
            StudyKind::Focus,
            &StudyConfig::default(),
            crate::bridge::NullSceneBridge,
        )
        .unwrap();
        assert!(controller.is_calibrating());
        assert_eq!(controller.phase(), StudyPhase::WaitingToStart);
    }
}
