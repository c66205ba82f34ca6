//! Local/world transforms for scene nodes

use glam::{Mat4, Quat, Vec3};

/// Translation, rotation and (possibly non-uniform) scale.
///
/// Transforms are plain `Copy` values; snapshots taken for undo are exact
/// bit copies of the live value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    #[inline]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    /// Convert to a 4x4 matrix (scale, then rotate, then translate)
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose an affine matrix. Shear introduced by non-uniform parent
    /// scale is dropped.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self { translation, rotation, scale }
    }

    /// `self` as parent applied to a child local transform
    pub fn mul_transform(&self, child: &Transform) -> Self {
        if self.scale.x == self.scale.y && self.scale.y == self.scale.z {
            // Uniform parent scale composes without shear
            return Self {
                translation: self.transform_point(child.translation),
                rotation: self.rotation * child.rotation,
                scale: self.scale * child.scale,
            };
        }
        Self::from_matrix(&(self.to_matrix() * child.to_matrix()))
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// Local X axis in parent space (unit length)
    #[inline]
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Local Y axis in parent space (unit length)
    #[inline]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Local Z axis in parent space (unit length)
    #[inline]
    pub fn back(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Inverse as a matrix; non-invertible scales yield non-finite entries
    #[inline]
    pub fn inverse_matrix(&self) -> Mat4 {
        self.to_matrix().inverse()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl core::ops::Mul for Transform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.mul_transform(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_identity() {
        let point = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Transform::IDENTITY.transform_point(point), point);
    }

    #[test]
    fn test_parent_translation_and_scale() {
        let parent = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)).with_uniform_scale(2.0);
        let child = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let world = parent * child;
        assert!((world.translation - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
        assert_eq!(world.scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_parent_rotation() {
        let parent = Transform::IDENTITY
            .with_rotation(Quat::from_rotation_z(core::f32::consts::FRAC_PI_2));
        let child = Transform::from_translation(Vec3::X);
        let world = parent * child;
        assert!((world.translation - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_non_uniform_parent_goes_through_matrix() {
        let parent = Transform::IDENTITY.with_scale(Vec3::new(2.0, 1.0, 1.0));
        let child = Transform::from_translation(Vec3::new(1.0, 1.0, 0.0));
        let world = parent * child;
        assert!((world.translation - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-5);
        assert!((world.scale - Vec3::new(2.0, 1.0, 1.0)).length() < 1e-5);
    }
}
