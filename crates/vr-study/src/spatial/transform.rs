//! Rigid transform (position + rotation), used for the head pose

use super::{Point3D, Quaternion, Vector3D};

/// A rigid 3D transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point3D,
    pub rotation: Quaternion,
}

impl Transform {
    /// Identity transform (origin, no rotation)
    pub fn identity() -> Self {
        Self {
            position: Point3D::ORIGIN,
            rotation: Quaternion::IDENTITY,
        }
    }

    pub fn new(position: Point3D, rotation: Quaternion) -> Self {
        Self { position, rotation }
    }

    /// Get the forward direction of this transform
    pub fn forward(&self) -> Vector3D {
        self.rotation.forward()
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, local: Point3D) -> Point3D {
        self.position + self.rotation.rotate_vector(local.to_vector())
    }

    /// Transform a point from world space to local space
    pub fn inverse_transform_point(&self, world: Point3D) -> Point3D {
        self.rotation
            .inverse()
            .rotate_vector(world - self.position)
            .to_point()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
