//! vr-study command line
//!
//! Usage:
//!   vr-study check-config --config study.toml
//!   vr-study replay --study ui --trace session.jsonl --participant 7
//!   vr-study interactive --study focus --selection dwell
//!
//! Interactive controls:
//! - Arrows: move gaze, WASD: move head
//! - Space: press/release the primary key
//! - E: selection button
//! - Z/X: close left/right eye, B: close both
//! - 1-4: move the pointer onto a button, 0: leave it
//! - C: look straight ahead
//! - Ctrl+Q or Esc: quit

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vr_study::{SelectionMode, StudyKind};
use vr_study_app::{
    load_config, open_session_log, parse_selection_mode, run_interactive, run_replay, Overrides,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Run eye-tracking VR study controllers")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Feed a recorded JSON Lines trace through a study
    Replay {
        #[command(flatten)]
        session: SessionArgs,

        /// Trace file, one frame per line
        #[arg(long)]
        trace: PathBuf,
    },
    /// Run a study from the keyboard
    Interactive {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Validate a configuration file and print the effective settings
    CheckConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StudyArg {
    Focus,
    Ui,
}

impl From<StudyArg> for StudyKind {
    fn from(arg: StudyArg) -> Self {
        match arg {
            StudyArg::Focus => StudyKind::Focus,
            StudyArg::Ui => StudyKind::Ui,
        }
    }
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Study configuration (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    study: StudyArg,

    /// Participant id, used as the log file prefix
    #[arg(long)]
    participant: Option<u32>,

    /// Directory the CSV log is written to
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Fixed target shuffle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Selection mode for the UI study, by name or id
    #[arg(long, value_parser = parse_selection_mode)]
    selection: Option<SelectionMode>,
}

impl SessionArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            participant: self.participant,
            log_dir: self.log_dir.clone(),
            seed: self.seed,
            selection: self.selection,
        }
    }
}

/// Log to stderr, or to `file` while the terminal is taken over by the runner.
fn init_logging(verbose: bool, file: Option<File>) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Replay { session, trace } => {
            init_logging(cli.verbose, None);
            let config = load_config(session.config.as_deref(), &session.overrides())?;
            let report = run_replay(&config, session.study.into(), &trace)?;
            println!("{}", report.summary);
            println!("{} frames replayed, final phase {}", report.frames, report.final_phase);
        }
        Command::Interactive { session } => {
            let config = load_config(session.config.as_deref(), &session.overrides())?;
            let (path, file) = open_session_log(&config)?;
            init_logging(cli.verbose, Some(file));
            eprintln!("Logging to {}", path.display());
            let report = run_interactive(&config, session.study.into())?;
            println!("{}", report.summary);
        }
        Command::CheckConfig { config } => {
            init_logging(cli.verbose, None);
            let config = load_config(config.as_deref(), &Overrides::default())?;
            let json =
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("{}", json);
        }
    }
    Ok(())
}
