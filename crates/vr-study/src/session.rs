//! Per-session selection state
//!
//! Owns the single highlighted target and the false-positive counter that
//! every detector and button resolves selections against.

use std::time::Duration;

use tracing::{debug, warn};

use crate::input::{RegionEvent, RegionEventKind, RegionId};
use crate::selection::SelectionMode;

/// A completed selection, consumed immediately by the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    /// Session time of the gesture
    pub timestamp: Duration,
    pub mode: SelectionMode,
    /// Label of the region that was highlighted
    pub selected_target_id: RegionId,
    /// Whether the label matches the indicated target
    pub was_correct: bool,
}

/// Result of resolving a select gesture against the highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(SelectionEvent),
    /// No highlight while measuring; the counter was incremented
    FalsePositive,
    /// No highlight outside measurement; nothing recorded
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    highlighted: Option<RegionId>,
    hovered: Option<RegionId>,
    false_positives: u32,
    measuring: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Highlight `region`, replacing any previous highlight.
    ///
    /// Returns the region that lost its highlight, if any.
    pub fn highlight(&mut self, region: impl Into<RegionId>) -> Option<RegionId> {
        let region = region.into();
        if self.highlighted.as_ref() == Some(&region) {
            return None;
        }
        debug!("Highlight {}", region);
        self.highlighted.replace(region)
    }

    /// Region the pointer is currently inside, highlighted or not
    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn clear_highlight(&mut self) -> Option<RegionId> {
        self.highlighted.take()
    }

    /// Apply this frame's region events; the last enter wins.
    ///
    /// Leaving a region keeps it highlighted until something else takes over.
    pub fn apply_region_events(&mut self, events: &[RegionEvent]) -> Vec<RegionId> {
        let mut unhighlighted = Vec::new();
        for event in events {
            match event.kind {
                RegionEventKind::Enter => {
                    self.hovered = Some(event.region.clone());
                    unhighlighted.extend(self.highlight(event.region.clone()));
                }
                RegionEventKind::Exit if self.hovered.as_ref() == Some(&event.region) => {
                    self.hovered = None;
                }
                RegionEventKind::Stay | RegionEventKind::Exit => {}
            }
        }
        unhighlighted
    }

    pub fn false_positives(&self) -> u32 {
        self.false_positives
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    /// Whether a select without a highlight counts as a false positive.
    pub fn set_measuring(&mut self, measuring: bool) {
        self.measuring = measuring;
    }

    /// Resolve a select gesture against the current highlight.
    ///
    /// A successful selection consumes the highlight. `target` is the
    /// indicated target id used for the correctness flag.
    pub fn select(
        &mut self,
        mode: SelectionMode,
        target: Option<u8>,
        timestamp: Duration,
    ) -> SelectOutcome {
        match self.highlighted.take() {
            Some(label) => {
                let was_correct = target.map_or(false, |t| label == t.to_string());
                SelectOutcome::Selected(SelectionEvent {
                    timestamp,
                    mode,
                    selected_target_id: label,
                    was_correct,
                })
            }
            None if self.measuring => {
                self.false_positives += 1;
                warn!(
                    "{} selection without a highlighted target (false positives: {})",
                    mode, self.false_positives
                );
                SelectOutcome::FalsePositive
            }
            None => {
                debug!("{} selection without a highlighted target ignored", mode);
                SelectOutcome::Ignored
            }
        }
    }
}
