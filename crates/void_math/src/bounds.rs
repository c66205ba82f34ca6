//! Bounding volumes for picking and selection outlines

use glam::{Mat4, Vec3};

use crate::intersect::{ray_aabb, ray_sphere};
use crate::ray::Ray;

/// Axis-Aligned Bounding Box
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty (inverted) box, the identity for `union`
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Unit box centered at the origin with half-extents of one
    pub const UNIT: Self = Self {
        min: Vec3::NEG_ONE,
        max: Vec3::ONE,
    };

    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |aabb, point| aabb.expand_to_include(point))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn expand_to_include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[inline]
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box after an affine transform
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().into_iter().map(|c| matrix.transform_point3(c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Bounding sphere
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[inline]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere after an affine transform; the radius grows with the largest
    /// axis scale so the result still encloses the original.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let max_scale = matrix
            .x_axis
            .truncate()
            .length()
            .max(matrix.y_axis.truncate().length())
            .max(matrix.z_axis.truncate().length());

        Self {
            center: matrix.transform_point3(self.center),
            radius: self.radius * max_scale,
        }
    }

    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }
}

/// Bounding volume carried by scene geometry
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundingVolume {
    Box(Aabb),
    Sphere(BoundingSphere),
}

impl BoundingVolume {
    pub fn center(&self) -> Vec3 {
        match self {
            BoundingVolume::Box(aabb) => aabb.center(),
            BoundingVolume::Sphere(sphere) => sphere.center,
        }
    }

    pub fn to_aabb(&self) -> Aabb {
        match self {
            BoundingVolume::Box(aabb) => *aabb,
            BoundingVolume::Sphere(sphere) => sphere.to_aabb(),
        }
    }

    pub fn transformed(&self, matrix: &Mat4) -> Self {
        match self {
            BoundingVolume::Box(aabb) => BoundingVolume::Box(aabb.transformed(matrix)),
            BoundingVolume::Sphere(sphere) => BoundingVolume::Sphere(sphere.transformed(matrix)),
        }
    }

    /// Merge two volumes. Two spheres stay a sphere only when one already
    /// contains the other; every other combination widens to a box.
    pub fn merge(&self, other: &BoundingVolume) -> BoundingVolume {
        if let (BoundingVolume::Sphere(a), BoundingVolume::Sphere(b)) = (self, other) {
            let gap = a.center.distance(b.center);
            if gap + b.radius <= a.radius {
                return *self;
            }
            if gap + a.radius <= b.radius {
                return *other;
            }
        }
        BoundingVolume::Box(self.to_aabb().union(&other.to_aabb()))
    }

    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        match self {
            BoundingVolume::Box(aabb) => ray_aabb(ray, aabb),
            BoundingVolume::Sphere(sphere) => ray_sphere(ray, sphere),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_transformed_by_translation() {
        let moved = Aabb::UNIT.transformed(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(4.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(6.0, 1.0, 1.0));
    }

    #[test]
    fn test_sphere_transformed_uses_largest_scale() {
        let sphere = BoundingSphere::new(Vec3::ZERO, 1.0);
        let scaled = sphere.transformed(&Mat4::from_scale(Vec3::new(1.0, 3.0, 2.0)));
        assert!((scaled.radius - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_merge_box_and_sphere_widens_to_box() {
        let a = BoundingVolume::Box(Aabb::UNIT);
        let b = BoundingVolume::Sphere(BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 1.0));
        match a.merge(&b) {
            BoundingVolume::Box(aabb) => {
                assert_eq!(aabb.min, Vec3::new(-1.0, -1.0, -1.0));
                assert_eq!(aabb.max, Vec3::new(4.0, 1.0, 1.0));
            }
            other => panic!("expected box, got {other:?}"),
        }
    }

    #[test]
    fn test_merge_nested_spheres_keeps_outer() {
        let outer = BoundingVolume::Sphere(BoundingSphere::new(Vec3::ZERO, 5.0));
        let inner = BoundingVolume::Sphere(BoundingSphere::new(Vec3::X, 1.0));
        assert_eq!(inner.merge(&outer), outer);
    }
}
