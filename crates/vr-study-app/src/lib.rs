//! vr-study-app: run the focus and UI-selection studies without a headset
//!
//! - Replay recorded tracking traces through a study controller
//! - Drive a study interactively from the keyboard in the terminal
//! - Validate study configuration files

pub mod runner;
pub mod scene;
pub mod simulator;
pub mod trace;

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use vr_study::study::launch;
use vr_study::{SelectionMode, StudyConfig, StudyKind};

pub use runner::{replay, RunReport, StudyRunner};
pub use scene::{SharedScene, TracingScene};
pub use simulator::InputSimulator;

/// Command line overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub participant: Option<u32>,
    pub log_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub selection: Option<SelectionMode>,
}

/// Load the configuration (defaults when no file is given) and apply overrides.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<StudyConfig> {
    let mut config = match path {
        Some(path) => StudyConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StudyConfig::default(),
    };

    if let Some(id) = overrides.participant {
        config.study.id = id;
    }
    if let Some(dir) = &overrides.log_dir {
        config.study.log_dir = dir.clone();
    }
    if overrides.seed.is_some() {
        config.study.seed = overrides.seed;
    }
    if let Some(mode) = overrides.selection {
        config.selection.mode = mode;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Parse a selection mode by name (`dwell`, `head-pointer`, ...) or id (1-6).
pub fn parse_selection_mode(value: &str) -> std::result::Result<SelectionMode, String> {
    if let Ok(id) = value.parse::<u8>() {
        return SelectionMode::from_id(id).ok_or_else(|| format!("no selection mode with id {}", id));
    }
    SelectionMode::ALL
        .into_iter()
        .find(|mode| mode.as_str() == value)
        .ok_or_else(|| format!("unknown selection mode '{}'", value))
}

/// Open (appending) the diagnostic log an interactive session writes next to its CSV log.
pub fn open_session_log(config: &StudyConfig) -> Result<(PathBuf, File)> {
    let dir = &config.study.log_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let path = dir.join(format!("{}_session.log", config.study.id));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open session log {}", path.display()))?;
    Ok((path, file))
}

/// Replay a trace file and return the final report.
pub fn run_replay(config: &StudyConfig, kind: StudyKind, trace: &Path) -> Result<RunReport> {
    let frames = trace::read_trace(trace)?;
    info!("Replaying {} frames from {}", frames.len(), trace.display());
    let mut controller = launch(kind, config, TracingScene)?;
    Ok(replay(controller.as_mut(), &frames))
}

/// Run a study from the keyboard until the user quits.
pub fn run_interactive(config: &StudyConfig, kind: StudyKind) -> Result<RunReport> {
    let scene = SharedScene::new();
    let controller = launch(kind, config, scene.clone())?;
    let mut runner = StudyRunner::new(controller, scene).with_tick_rate(Duration::from_millis(16));
    runner.run().context("Terminal session failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_selection_mode() {
        assert_eq!(parse_selection_mode("head-pointer"), Ok(SelectionMode::HeadPointer));
        assert_eq!(parse_selection_mode("4"), Ok(SelectionMode::Blink));
        assert!(parse_selection_mode("7").is_err());
        assert!(parse_selection_mode("squint").is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = Overrides {
            participant: Some(9),
            seed: Some(1),
            selection: Some(SelectionMode::Wink),
            ..Default::default()
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.study.id, 9);
        assert_eq!(config.study.seed, Some(1));
        assert_eq!(config.selection.mode, SelectionMode::Wink);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.toml");
        fs::write(&path, "[study]\nid = 4\n\n[focus]\nmode = \"eye-gaze\"\n").unwrap();
        let config = load_config(Some(&path), &Overrides::default()).unwrap();
        assert_eq!(config.study.id, 4);
        assert_eq!(config.focus.mode, vr_study::study::FocusMode::EyeGaze);
    }

    #[test]
    fn test_replay_writes_nothing_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let trace = dir.path().join("trace.jsonl");
        fs::write(&trace, "{\"dt_ms\": 100}\n{\"dt_ms\": 100, \"primary\": \"down\"}\n").unwrap();

        let overrides = Overrides {
            log_dir: Some(dir.path().join("logs")),
            participant: Some(2),
            ..Default::default()
        };
        let config = load_config(None, &overrides).unwrap();
        let report = run_replay(&config, StudyKind::Ui, &trace).unwrap();
        assert_eq!(report.frames, 2);
        assert_eq!(report.trials, 0);
        assert!(!dir.path().join("logs").join("2_UI_log.csv").exists());
    }

    #[test]
    fn test_session_log_appends_in_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            log_dir: Some(dir.path().join("logs")),
            participant: Some(5),
            ..Default::default()
        };
        let config = load_config(None, &overrides).unwrap();

        let (path, mut file) = open_session_log(&config).unwrap();
        assert_eq!(path, dir.path().join("logs").join("5_session.log"));
        writeln!(file, "first").unwrap();
        drop(file);

        let (_, mut file) = open_session_log(&config).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_missing_trace_is_an_error() {
        let config = StudyConfig::default();
        let err = run_replay(&config, StudyKind::Focus, Path::new("/nonexistent/trace.jsonl"))
            .unwrap_err();
        assert!(err.to_string().contains("trace"));
    }
}
