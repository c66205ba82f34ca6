//! 3D ray for picking
//!
//! Rays are built from screen coordinates by camera unprojection and
//! tested against scene bounds, meshes and gizmo handles.

use glam::{Mat4, Vec3};

/// 3D ray with a normalized direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from two points
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Build a world-space ray by unprojecting a point in normalized device
    /// coordinates at the near (z = -1) and far (z = 1) planes.
    ///
    /// Returns `None` when the inverse view-projection is degenerate.
    pub fn from_ndc(inverse_view_projection: &Mat4, ndc_x: f32, ndc_y: f32) -> Option<Self> {
        let near = inverse_view_projection.project_point3(Vec3::new(ndc_x, ndc_y, -1.0));
        let far = inverse_view_projection.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));

        if !near.is_finite() || !far.is_finite() {
            return None;
        }

        let ray = Self::from_points(near, far);
        ray.is_valid().then_some(ray)
    }

    /// Get a point at distance t along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray by a matrix
    ///
    /// The origin is transformed as a point, the direction as a vector and
    /// then renormalized, so distances along the result are measured in the
    /// target space.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self::new(
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }

    /// Check if the ray direction is valid (non-zero length)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.direction.length_squared() > 1e-10
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        assert!((ray.direction.length() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_ray_from_ndc_center_looks_forward() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(1.0, 1.0, 0.1, 100.0);
        let inverse = (proj * view).inverse();

        let ray = Ray::from_ndc(&inverse, 0.0, 0.0).unwrap();
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!((ray.origin.z - 9.9).abs() < 1e-3);
    }

    #[test]
    fn test_ray_transform_renormalizes() {
        let scale = Mat4::from_scale(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::X, Vec3::Z).transform(&scale);
        assert_eq!(ray.origin, Vec3::new(2.0, 0.0, 0.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
    }
}
