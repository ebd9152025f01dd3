//! Collision primitives

use crate::foundation::math::Vec3;

/// A bounding sphere for overlap tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    ///
    /// Touching spheres count as intersecting.
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if a point lies inside the sphere
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f32 {
        let distance = (self.center - other.center).magnitude();
        (self.radius + other.radius - distance).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_intersection() {
        let a = BoundingSphere::new(Vec3::zeros(), 0.05);
        let b = BoundingSphere::new(Vec3::new(0.08, 0.0, 0.0), 0.05);
        let c = BoundingSphere::new(Vec3::new(0.2, 0.0, 0.0), 0.05);

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert_relative_eq!(a.penetration_depth(&b), 0.02, epsilon = 1e-6);
        assert_eq!(a.penetration_depth(&c), 0.0);
    }

    #[test]
    fn test_touching_spheres_intersect() {
        let a = BoundingSphere::new(Vec3::zeros(), 0.5);
        let b = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 0.5);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_contains_point() {
        let sphere = BoundingSphere::new(Vec3::new(0.0, 1.0, 0.0), 0.1);
        assert!(sphere.contains_point(Vec3::new(0.0, 1.05, 0.0)));
        assert!(!sphere.contains_point(Vec3::new(0.0, 1.2, 0.0)));
    }
}
