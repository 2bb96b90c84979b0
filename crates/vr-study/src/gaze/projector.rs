//! Gaze-to-pointer projection
//!
//! Per frame: rotate the raw gaze direction by the head, intersect with a
//! plane at `plane_distance` in front of the head, express the hit in
//! head-local space, apply the calibration correction, pin the depth, go
//! back to world space and smooth the pointer toward the result.

use std::time::Duration;

use tracing::debug;

use super::{GazeCorrection, Smoothing};
use crate::config::GazeConfig;
use crate::spatial::{Point3D, Transform, Vec2, Vector3D};

/// Pointer position owned by the projector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Smoothed position shown to the participant
    pub current: Point3D,
    /// Latest corrected gaze point the pointer is moving toward
    pub target: Point3D,
}

/// Turns raw gaze samples into a smoothed world-space pointer.
#[derive(Debug, Clone)]
pub struct GazeProjector {
    plane_distance: f32,
    fixed_depth: f32,
    vertical_shift: f32,
    base_rate: f32,
    hover_rate: f32,
    smoothing: Smoothing,
    correction: Option<GazeCorrection>,
    pointer: PointerState,
}

impl GazeProjector {
    pub fn new(config: &GazeConfig, vertical_shift: f32) -> Self {
        Self {
            plane_distance: config.plane_distance,
            fixed_depth: config.fixed_depth,
            vertical_shift,
            base_rate: config.smoothing_rate,
            hover_rate: config.hover_smoothing_rate,
            smoothing: Smoothing::new(config.filter, config.smoothing_rate),
            correction: None,
            pointer: PointerState::default(),
        }
    }

    /// Replace the correction wholesale (after a calibration pass).
    pub fn set_correction(&mut self, correction: GazeCorrection) {
        self.correction = Some(correction);
    }

    pub fn correction(&self) -> Option<GazeCorrection> {
        self.correction
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    /// Switch between the regular and the slower hover smoothing rate.
    pub fn set_hover_smoothing(&mut self, hovering: bool) {
        let rate = if hovering { self.hover_rate } else { self.base_rate };
        if self.smoothing.rate != rate {
            debug!("Pointer smoothing rate {} -> {}", self.smoothing.rate, rate);
            self.smoothing.rate = rate;
        }
    }

    /// Head-local gaze point on the projection plane, before correction.
    ///
    /// This is what calibration records.
    pub fn raw_local_point(&self, raw_direction: Vector3D, head: &Transform) -> Vec2 {
        let world_direction = head.rotation.rotate_vector(raw_direction);
        let on_plane = head.position + world_direction * self.plane_distance;
        let local = head.inverse_transform_point(on_plane);
        Vec2::new(local.x, local.y)
    }

    /// World-space pointer target for a raw gaze direction, unsmoothed.
    pub fn corrected_world_point(&self, raw_direction: Vector3D, head: &Transform) -> Point3D {
        let raw = self.raw_local_point(raw_direction, head);
        let corrected = self.correction.unwrap_or(GazeCorrection::IDENTITY).apply(raw);
        let local = Point3D::new(corrected.x, corrected.y + self.vertical_shift, self.fixed_depth);
        head.transform_point(local)
    }

    /// Advance the pointer one frame.
    ///
    /// Without a gaze sample the pointer holds its last position.
    pub fn project(
        &mut self,
        raw_direction: Option<Vector3D>,
        head: &Transform,
        dt: Duration,
    ) -> Point3D {
        if let Some(direction) = raw_direction {
            self.pointer.target = self.corrected_world_point(direction, head);
            self.pointer.current = self
                .smoothing
                .advance(self.pointer.current, self.pointer.target, dt);
        }
        self.pointer.current
    }

    /// Snap the pointer to the middle of the canvas.
    pub fn recenter(&mut self, head: &Transform) {
        let center = head.transform_point(Point3D::new(0.0, self.vertical_shift, self.fixed_depth));
        self.pointer = PointerState {
            current: center,
            target: center,
        };
    }
}
