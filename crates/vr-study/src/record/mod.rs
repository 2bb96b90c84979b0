//! Append-only study log
//!
//! Controllers emit [`LogRecord`]s; a [`LogSink`] turns them into
//! `;`-delimited lines. Timestamps come from a [`WallClock`] so tests can
//! pin them.

mod clock;
mod line;
mod sink;

pub use clock::{FixedClock, LocalClock, WallClock, TIMESTAMP_FORMAT};
pub use line::{FocusRecord, LogRecord, UiRecord};
pub use sink::{FileLogSink, LogSink, MemorySink};
