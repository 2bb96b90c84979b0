//! Head-gaze cursor for the head-pointer selection mode

use crate::config::SelectionConfig;
use crate::spatial::Point3D;

/// Canvas-local depth the head cursor sits at, just in front of the buttons.
const CURSOR_DEPTH: f32 = 3.0;

/// Maps head pitch/yaw onto a canvas-local cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadCursor {
    pitch_range: f32,
    yaw_range: f32,
    half_width: f32,
    half_height: f32,
}

impl HeadCursor {
    pub fn new(config: &SelectionConfig) -> Self {
        Self {
            pitch_range: config.head_pitch_range_deg,
            yaw_range: config.head_yaw_range_deg,
            half_width: config.canvas_half_width,
            half_height: config.canvas_half_height,
        }
    }

    /// Cursor position for signed head angles in degrees.
    ///
    /// Looking down moves the cursor down; angles beyond the configured
    /// ranges pin it to the canvas edge.
    pub fn position(&self, pitch: f32, yaw: f32) -> Point3D {
        let pitch = (pitch / self.pitch_range).clamp(-1.0, 1.0);
        let yaw = (yaw / self.yaw_range).clamp(-1.0, 1.0);
        Point3D::new(yaw * self.half_width, -pitch * self.half_height, CURSOR_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_edges() {
        let cursor = HeadCursor::new(&SelectionConfig::default());
        assert_eq!(cursor.position(0.0, 0.0), Point3D::new(0.0, 0.0, 3.0));
        assert_eq!(cursor.position(15.0, 0.0).y, -540.0);
        assert_eq!(cursor.position(-90.0, 90.0), Point3D::new(1920.0, 1080.0, 3.0));
    }
}
