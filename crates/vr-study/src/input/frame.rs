//! One tick of engine input

use std::time::Duration;

use super::{EyeClosure, RegionEvent};
use crate::spatial::{Point3D, Transform, Vector3D};

/// Input delivered to a study controller once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    /// Time since last frame
    pub dt: Duration,
    /// Head (center eye) pose in world space
    pub head: Transform,
    /// Raw eye-gaze forward direction; `None` while eye tracking is disabled
    pub gaze_direction: Option<Vector3D>,
    /// Eye closure weights; `None` without face tracking
    pub eyes: Option<EyeClosure>,
    /// Pointer collision notifications, in arrival order
    pub regions: Vec<RegionEvent>,
    /// Primary key went down this frame
    pub primary_pressed: bool,
    /// Primary key went up this frame
    pub primary_released: bool,
    /// The pointer hit the selection button this frame
    pub selection_trigger: bool,
    /// Where the ray from the head through the pointer hit the focus plane
    pub focus_hit: Option<Point3D>,
}

impl FrameInput {
    /// An empty frame with identity head pose
    pub fn new(dt: Duration) -> Self {
        Self {
            dt,
            head: Transform::identity(),
            gaze_direction: None,
            eyes: None,
            regions: Vec::new(),
            primary_pressed: false,
            primary_released: false,
            selection_trigger: false,
            focus_hit: None,
        }
    }

    pub fn with_head(mut self, head: Transform) -> Self {
        self.head = head;
        self
    }

    pub fn with_gaze(mut self, direction: Vector3D) -> Self {
        self.gaze_direction = Some(direction);
        self
    }

    pub fn with_eyes(mut self, eyes: EyeClosure) -> Self {
        self.eyes = Some(eyes);
        self
    }

    pub fn with_region(mut self, event: RegionEvent) -> Self {
        self.regions.push(event);
        self
    }

    pub fn pressed(mut self) -> Self {
        self.primary_pressed = true;
        self
    }

    pub fn released(mut self) -> Self {
        self.primary_released = true;
        self
    }

    pub fn with_trigger(mut self) -> Self {
        self.selection_trigger = true;
        self
    }

    pub fn with_focus_hit(mut self, hit: Point3D) -> Self {
        self.focus_hit = Some(hit);
        self
    }

    /// Head pitch in degrees, positive when looking down
    pub fn head_pitch(&self) -> f32 {
        self.head.rotation.pitch_degrees()
    }

    /// Head yaw in degrees, positive when looking right
    pub fn head_yaw(&self) -> f32 {
        self.head.rotation.yaw_degrees()
    }
}
