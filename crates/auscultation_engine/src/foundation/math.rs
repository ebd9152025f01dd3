//! Math utilities and types
//!
//! Provides the vector and transform types used to place anchors on the
//! manikin and to position sound emitters relative to the listener.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from a position and Euler angles in radians
    ///
    /// Angles are applied about X, then Y, then Z, matching how scene
    /// editors report node rotations as `(x, y, z)`.
    pub fn from_position_euler(position: Vec3, euler: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::from_euler_angles(euler.x, euler.y, euler.z),
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Map a point in local space into world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(&point)
    }
}

/// Convert a serialized `[x, y, z]` triple into a vector
pub fn vec3_from_array(values: [f32; 3]) -> Vec3 {
    Vec3::new(values[0], values[1], values[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_keeps_points() {
        let point = Vec3::new(0.13, 0.47, 0.09);
        assert_eq!(Transform::identity().transform_point(point), point);
    }

    #[test]
    fn test_translation_and_yaw() {
        let transform = Transform::from_position_euler(
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
        );
        let world = transform.transform_point(Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(world.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(world.y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(world.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_matrix_agrees_with_point_mapping() {
        let transform = Transform::from_position_euler(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.3, -2.9, 0.1),
        );
        let local = Vec3::new(0.12, 0.55, -0.06);
        let via_matrix = transform.to_matrix().transform_point(&Point3::from(local));
        let direct = transform.transform_point(local);
        assert_relative_eq!(via_matrix.coords, direct, epsilon = 1e-5);
    }
}
