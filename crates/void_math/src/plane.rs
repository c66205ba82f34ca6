//! Infinite planes used as drag and contact surfaces

use glam::Vec3;

use crate::ray::Ray;

/// Rays closer to parallel than this never reach the plane
const PARALLEL_EPSILON: f32 = 1e-4;

/// Plane in Hessian normal form: `normal · p = distance`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Create a plane through `point` with the given normal.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    /// Distance along the ray to the plane, if it is hit in front of the origin
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.distance - self.normal.dot(ray.origin)) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Contact point of the ray with the plane
    #[inline]
    pub fn contact_point(&self, ray: &Ray) -> Option<Vec3> {
        self.intersect_ray(ray).map(|t| ray.at(t))
    }
}
