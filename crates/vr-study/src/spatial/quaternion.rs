//! Quaternion representation for head and eye rotations

use super::Vector3D;
use std::ops::Mul;

/// A unit quaternion representing a 3D rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a quaternion from axis-angle representation
    pub fn from_axis_angle(axis: Vector3D, angle_radians: f32) -> Self {
        let half_angle = angle_radians / 2.0;
        let sin_half = half_angle.sin();
        let normalized = axis.normalize();

        Self {
            x: normalized.x * sin_half,
            y: normalized.y * sin_half,
            z: normalized.z * sin_half,
            w: half_angle.cos(),
        }
    }

    /// Build a rotation from engine-style Euler angles in degrees.
    ///
    /// Roll is applied first, then pitch, then yaw (Z, X, Y).
    pub fn from_euler_degrees(pitch: f32, yaw: f32, roll: f32) -> Self {
        let q_yaw = Self::from_axis_angle(Vector3D::UP, yaw.to_radians());
        let q_pitch = Self::from_axis_angle(Vector3D::RIGHT, pitch.to_radians());
        let q_roll = Self::from_axis_angle(Vector3D::FORWARD, roll.to_radians());
        q_yaw * q_pitch * q_roll
    }

    /// Get the inverse of the quaternion
    pub fn inverse(&self) -> Self {
        let mag_sq = self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w;
        if mag_sq > 0.0 {
            let inv_mag_sq = 1.0 / mag_sq;
            Self {
                x: -self.x * inv_mag_sq,
                y: -self.y * inv_mag_sq,
                z: -self.z * inv_mag_sq,
                w: self.w * inv_mag_sq,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Rotate a vector by this quaternion
    pub fn rotate_vector(&self, v: Vector3D) -> Vector3D {
        let q_vec = Vector3D::new(self.x, self.y, self.z);
        let uv = q_vec.cross(&v);
        let uuv = q_vec.cross(&uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// The forward vector (where this rotation points)
    pub fn forward(&self) -> Vector3D {
        self.rotate_vector(Vector3D::FORWARD)
    }

    /// Signed pitch in degrees, positive when looking down.
    pub fn pitch_degrees(&self) -> f32 {
        let forward = self.forward().normalize();
        (-forward.y).clamp(-1.0, 1.0).asin().to_degrees()
    }

    /// Signed yaw in degrees, positive when looking right.
    pub fn yaw_degrees(&self) -> f32 {
        let forward = self.forward();
        forward.x.atan2(forward.z).to_degrees()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Self) -> Self::Output {
        Quaternion::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_yaw_turns_forward_right() {
        let q = Quaternion::from_axis_angle(Vector3D::UP, PI / 2.0);
        let rotated = q.forward();
        assert!((rotated.x - 1.0).abs() < 0.0001);
        assert!(rotated.z.abs() < 0.0001);
    }

    #[test]
    fn test_positive_pitch_looks_down() {
        let q = Quaternion::from_euler_degrees(30.0, 0.0, 0.0);
        assert!(q.forward().y < 0.0);
        assert!((q.pitch_degrees() - 30.0).abs() < 0.001);
    }

    #[test]
    fn test_euler_angles_recovered() {
        let q = Quaternion::from_euler_degrees(-12.0, 40.0, 0.0);
        assert!((q.pitch_degrees() + 12.0).abs() < 0.001);
        assert!((q.yaw_degrees() - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_inverse() {
        let q = Quaternion::from_axis_angle(Vector3D::UP, PI / 4.0);
        let result = q * q.inverse();
        assert!((result.w - 1.0).abs() < 0.0001);
        assert!(result.x.abs() < 0.0001);
        assert!(result.y.abs() < 0.0001);
        assert!(result.z.abs() < 0.0001);
    }
}
