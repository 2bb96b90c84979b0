//! Per-frame input from the engine layer
//!
//! Everything a controller consumes in one tick arrives in a [`FrameInput`]:
//! - Frame delta time and head pose
//! - Raw gaze direction (absent while eye tracking is unavailable)
//! - Per-eye closure weights from face tracking
//! - Pointer/region collision notifications
//! - Key edges and the selection-button trigger

mod clock;
mod eyes;
mod frame;
mod region;

pub use clock::FrameClock;
pub use eyes::EyeClosure;
pub use frame::FrameInput;
pub use region::{RegionEvent, RegionEventKind, RegionId};
