//! Intersection tests for picking
//!
//! Ray tests against the primitives the editor collides with:
//! - AABB (slab method)
//! - Sphere
//! - Triangle (Möller-Trumbore algorithm)
//! - Ring (annulus in a plane)

use glam::Vec3;

use crate::bounds::{Aabb, BoundingSphere};
use crate::plane::Plane;
use crate::ray::Ray;

/// Direction components below this count as parallel to an axis or plane
const PARALLEL_EPSILON: f32 = 1e-8;

/// Result of a ray-triangle intersection
#[derive(Clone, Copy, Debug)]
pub struct TriangleHit {
    /// Distance along ray to hit point
    pub distance: f32,
    /// Barycentric coordinates [w, u, v] where w = 1 - u - v
    pub barycentric: [f32; 3],
}

/// Ray-AABB intersection using the slab method
///
/// Returns the distance along the ray to the first intersection in front of
/// the origin (the exit distance when the origin is inside the box).
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    if aabb.is_empty() {
        return None;
    }

    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        let (min, max) = (aabb.min[axis], aabb.max[axis]);

        // Parallel to this slab: inside it or never
        if direction.abs() < PARALLEL_EPSILON {
            if origin < min || origin > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction;
        let (t1, t2) = ((min - origin) * inv, (max - origin) * inv);
        tmin = tmin.max(t1.min(t2));
        tmax = tmax.min(t1.max(t2));
    }

    if tmax < 0.0 || tmin > tmax {
        None
    } else {
        Some(if tmin < 0.0 { tmax } else { tmin })
    }
}

/// Ray-Sphere intersection
pub fn ray_sphere(ray: &Ray, sphere: &BoundingSphere) -> Option<f32> {
    ray_sphere_at(ray, sphere.center, sphere.radius)
}

/// Ray-Sphere intersection with center and radius
pub fn ray_sphere_at(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let t1 = (-b - sqrt_d) / (2.0 * a);
    let t2 = (-b + sqrt_d) / (2.0 * a);

    if t1 > 0.0 {
        Some(t1)
    } else if t2 > 0.0 {
        Some(t2)
    } else {
        None
    }
}

/// Ray-Triangle intersection using Möller-Trumbore algorithm
///
/// Both faces are hit; editor picking has no notion of back faces.
pub fn ray_triangle(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    const EPSILON: f32 = 0.000_000_1;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Parallel to the triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    (t > EPSILON).then(|| TriangleHit {
        distance: t,
        barycentric: [1.0 - u - v, u, v],
    })
}

/// Distance along the ray where it crosses an annulus (ring) lying in the
/// plane through `center` with the given normal.
pub fn ray_ring(ray: &Ray, center: Vec3, normal: Vec3, radius: f32, thickness: f32) -> Option<f32> {
    let t = Plane::from_point_normal(center, normal).intersect_ray(ray)?;
    let from_center = (ray.at(t) - center).length();
    ((from_center - radius).abs() <= thickness).then_some(t)
}
