//! Spatial primitives for head, gaze and pointer geometry
//!
//! Follows the engine's axis convention:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)
//!
//! Positive pitch tilts the head down, positive yaw turns it right.

mod point3d;
mod quaternion;
mod transform;
mod vec2;
mod vector3d;

pub use point3d::Point3D;
pub use quaternion::Quaternion;
pub use transform::Transform;
pub use vec2::Vec2;
pub use vector3d::Vector3D;

/// Wrap an angle in degrees from `[0, 360)` into `(-180, 180]`.
pub fn signed_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
