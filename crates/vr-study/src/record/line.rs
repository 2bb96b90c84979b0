//! Log record formats

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

use super::clock::TIMESTAMP_FORMAT;
use crate::selection::SelectionMode;
use crate::study::FocusMode;

const UI_COLUMNS: &str = "selectionMode;timestamp;timeOnTarget;duration;selectionTime;selectedButton;targetButton;correctSelection;";

/// One completed focus trial.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusRecord {
    pub mode: FocusMode,
    pub timestamp: NaiveDateTime,
    pub image: u8,
    /// How long the stimulus was held
    pub duration: Duration,
    pub error: i32,
}

/// One completed UI selection trial.
#[derive(Debug, Clone, PartialEq)]
pub struct UiRecord {
    pub mode: SelectionMode,
    pub timestamp: NaiveDateTime,
    /// From trial start to the last time a target was entered
    pub time_on_target: Duration,
    /// From trial start to the selection
    pub duration: Duration,
    pub selected: String,
    pub target: u8,
}

impl UiRecord {
    /// Time between reaching the target and confirming it.
    pub fn selection_time(&self) -> f32 {
        self.duration.as_secs_f32() - self.time_on_target.as_secs_f32()
    }

    pub fn was_correct(&self) -> bool {
        self.selected == self.target.to_string()
    }
}

/// Everything a study writes to its log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    FocusStarted(NaiveDateTime),
    FocusColumns(NaiveDateTime),
    Focus(FocusRecord),
    FocusEnded(NaiveDateTime),
    UiStarted(NaiveDateTime),
    UiColumns,
    Ui(UiRecord),
    FalsePositives(u32),
    UiEnded(NaiveDateTime),
}

struct Timestamp<'a>(&'a NaiveDateTime);

impl fmt::Display for Timestamp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

fn capitalized(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRecord::FocusStarted(at) => write!(f, "Focus Study Started;{}", Timestamp(at)),
            LogRecord::FocusColumns(at) => write!(
                f,
                "focusmode;timestamp;targetImg;duration;error;;{}",
                Timestamp(at)
            ),
            LogRecord::Focus(r) => write!(
                f,
                "{};{};{};{};{}",
                r.mode.id(),
                Timestamp(&r.timestamp),
                r.image,
                r.duration.as_secs_f32(),
                r.error
            ),
            LogRecord::FocusEnded(at) => write!(f, "StudyEnded;{}", Timestamp(at)),
            LogRecord::UiStarted(at) => write!(f, "UI Study Started;{}", Timestamp(at)),
            LogRecord::UiColumns => f.write_str(UI_COLUMNS),
            LogRecord::Ui(r) => write!(
                f,
                "{};{};{};{};{};{};{};{}",
                r.mode.id(),
                Timestamp(&r.timestamp),
                r.time_on_target.as_secs_f32(),
                r.duration.as_secs_f32(),
                r.selection_time(),
                r.selected,
                r.target,
                capitalized(r.was_correct())
            ),
            LogRecord::FalsePositives(count) => write!(f, "FalsePositives;{}", count),
            LogRecord::UiEnded(at) => write!(f, "StudyEnd;{}", Timestamp(at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 2))
            .unwrap()
    }

    #[test]
    fn test_focus_lines() {
        assert_eq!(
            LogRecord::FocusStarted(at()).to_string(),
            "Focus Study Started;2025-03-07 09:05:02"
        );
        assert_eq!(
            LogRecord::FocusColumns(at()).to_string(),
            "focusmode;timestamp;targetImg;duration;error;;2025-03-07 09:05:02"
        );
        let record = LogRecord::Focus(FocusRecord {
            mode: FocusMode::EyeGaze,
            timestamp: at(),
            image: 5,
            duration: Duration::from_millis(1250),
            error: -12,
        });
        assert_eq!(record.to_string(), "2;2025-03-07 09:05:02;5;1.25;-12");
        assert_eq!(
            LogRecord::FocusEnded(at()).to_string(),
            "StudyEnded;2025-03-07 09:05:02"
        );
    }

    #[test]
    fn test_ui_lines() {
        let record = UiRecord {
            mode: SelectionMode::Nod,
            timestamp: at(),
            time_on_target: Duration::from_millis(500),
            duration: Duration::from_millis(2000),
            selected: "3".to_string(),
            target: 3,
        };
        assert!(record.was_correct());
        assert_eq!(
            LogRecord::Ui(record).to_string(),
            "5;2025-03-07 09:05:02;0.5;2;1.5;3;3;True"
        );
        assert_eq!(LogRecord::FalsePositives(4).to_string(), "FalsePositives;4");
        assert_eq!(
            LogRecord::UiEnded(at()).to_string(),
            "StudyEnd;2025-03-07 09:05:02"
        );
        assert!(LogRecord::UiColumns.to_string().starts_with("selectionMode;"));
    }

    #[test]
    fn test_incorrect_selection() {
        let record = UiRecord {
            mode: SelectionMode::Dwell,
            timestamp: at(),
            time_on_target: Duration::ZERO,
            duration: Duration::from_millis(800),
            selected: "1".to_string(),
            target: 2,
        };
        assert!(LogRecord::Ui(record).to_string().ends_with(";1;2;False"));
    }
}
