//! # void_math - Editing Geometry
//!
//! Rays, planes, bounding volumes and transforms used by picking and
//! transform manipulation. Vector, quaternion and matrix storage comes
//! from `glam`; this crate adds the editor-facing geometry on top.

pub mod ray;
pub mod plane;
pub mod bounds;
pub mod intersect;
pub mod transform;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

pub use ray::*;
pub use plane::*;
pub use bounds::*;
pub use intersect::*;
pub use transform::*;

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees.to_radians()
}
