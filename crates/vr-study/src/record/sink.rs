//! Log sinks

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::LogRecord;
use crate::error::LogError;

/// Destination for log lines. Lines are only accepted once opened.
pub trait LogSink {
    /// Prepare the destination; called once when the study starts running.
    fn open(&mut self) -> Result<(), LogError>;

    /// Append one line.
    fn append(&mut self, line: &str) -> Result<(), LogError>;

    fn is_open(&self) -> bool;

    fn write_record(&mut self, record: &LogRecord) -> Result<(), LogError> {
        self.append(&record.to_string())
    }
}

/// Appends lines to a file on disk, creating it (and its directory) on open.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn open(&mut self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        info!("Logging to {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn append(&mut self, line: &str) -> Result<(), LogError> {
        let file = self.file.as_mut().ok_or(LogError::NotOpen)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        debug!("Log: {}", line);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

/// Keeps lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<String>,
    open: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl LogSink for MemorySink {
    fn open(&mut self) -> Result<(), LogError> {
        self.open = true;
        Ok(())
    }

    fn append(&mut self, line: &str) -> Result<(), LogError> {
        if !self.open {
            return Err(LogError::NotOpen);
        }
        self.lines.push(line.to_string());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_sink_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("7_UI_log.csv");

        let mut sink = FileLogSink::new(&path);
        assert!(matches!(sink.append("early"), Err(LogError::NotOpen)));
        sink.open().unwrap();
        sink.append("first").unwrap();
        sink.write_record(&LogRecord::FalsePositives(2)).unwrap();

        // a second session appends to the same file
        let mut again = FileLogSink::new(&path);
        again.open().unwrap();
        again.append("second").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "first\nFalsePositives;2\nsecond\n");
    }

    #[test]
    fn test_memory_sink_requires_open() {
        let mut sink = MemorySink::new();
        assert!(sink.append("x").is_err());
        sink.open().unwrap();
        sink.append("x").unwrap();
        assert_eq!(sink.lines(), ["x".to_string()]);
    }
}
