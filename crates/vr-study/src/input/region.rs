//! Pointer/region collision notifications

/// Opaque identity of a selectable region as reported by the engine.
///
/// UI study buttons are named after their direction id (`"1"`..`"4"`).
pub type RegionId = String;

/// What happened between the pointer and a region this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionEventKind {
    /// Pointer entered the region
    Enter,
    /// Pointer is still inside the region
    Stay,
    /// Pointer left the region
    Exit,
}

/// A collision notification for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEvent {
    pub kind: RegionEventKind,
    pub region: RegionId,
}

impl RegionEvent {
    pub fn enter(region: impl Into<RegionId>) -> Self {
        Self {
            kind: RegionEventKind::Enter,
            region: region.into(),
        }
    }

    pub fn stay(region: impl Into<RegionId>) -> Self {
        Self {
            kind: RegionEventKind::Stay,
            region: region.into(),
        }
    }

    pub fn exit(region: impl Into<RegionId>) -> Self {
        Self {
            kind: RegionEventKind::Exit,
            region: region.into(),
        }
    }
}
