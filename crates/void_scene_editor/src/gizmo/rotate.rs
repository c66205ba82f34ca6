//! Rotate gizmo: one ring per axis.

use std::sync::Arc;

use void_math::{ray_ring, Quat, Ray, Transform, Vec3};

use super::translate::axis_color;
use super::{drag_point, Gizmo, PickedAxis, TransformKind, TransformSession};
use crate::scene::{Material, Mesh, ModelNode, NodeFlags};

const RING_RADIUS: f32 = 1.0;
const RING_THICKNESS: f32 = 0.1;
const RING_SEGMENTS: u32 = 48;

/// Rotate gizmo with rotation rings.
#[derive(Clone, Copy, Debug)]
pub struct RotateGizmo {
    /// Multiplier applied to the dragged angle
    sensitivity: f32,
}

impl Default for RotateGizmo {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RotateGizmo {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }
}

fn rings() -> [(PickedAxis, Vec3); 3] {
    [(PickedAxis::X, Vec3::X), (PickedAxis::Y, Vec3::Y), (PickedAxis::Z, Vec3::Z)]
}

impl Gizmo for RotateGizmo {
    fn kind(&self) -> TransformKind {
        TransformKind::Rotate
    }

    fn model(&self) -> ModelNode {
        let mut root = ModelNode::node("Rotate gizmo").with_flags(NodeFlags::TOOL);
        for (axis, normal) in rings() {
            let name = format!("{axis:?} ring");
            let mesh = Mesh::circle(Vec3::ZERO, normal, RING_RADIUS, RING_SEGMENTS);
            root = root.with_child(
                ModelNode::geometry(name.clone(), Arc::new(mesh), Material::wireframe(name, axis_color(axis)))
                    .with_flags(NodeFlags::TOOL),
            );
        }
        root
    }

    fn hit_test(&self, unit_ray: &Ray) -> Option<(PickedAxis, f32)> {
        rings()
            .into_iter()
            .filter_map(|(axis, normal)| {
                ray_ring(unit_ray, Vec3::ZERO, normal, RING_RADIUS, RING_THICKNESS).map(|t| (axis, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn begin(&self, session: &mut TransformSession, ray: &Ray, _camera_position: Vec3) -> bool {
        let Some(axis) = session.picked_axis.unit_axis() else {
            return false;
        };
        session.drag_normal = session.frame.axis(axis).normalize();
        match drag_point(session, ray) {
            Some(point) if point != session.frame.origin => {
                session.start_point = point;
                true
            }
            _ => false,
        }
    }

    /// Signed angle about the picked axis, stored in that axis' component.
    fn drag(&self, session: &TransformSession, ray: &Ray) -> Option<Vec3> {
        let axis = session.picked_axis.unit_axis()?;
        let origin = session.frame.origin;
        let from = session.start_point - origin;
        let to = drag_point(session, ray)? - origin;
        if to.length_squared() < 1e-12 {
            return None;
        }

        let normal = session.drag_normal;
        let angle = normal.dot(from.cross(to)).atan2(from.dot(to)) * self.sensitivity;
        Some(axis * angle)
    }

    fn apply(&self, session: &TransformSession, delta: Vec3) -> Transform {
        let Some(axis) = session.picked_axis.unit_axis() else {
            return session.center_transform;
        };
        let angle = delta.dot(axis);
        let world_axis = session.frame.axis(axis).normalize();
        let increment = Quat::from_axis_angle(world_axis, angle);

        // Rotate in world space, expressed in the parent's frame
        let parent = session.parent_world.rotation;
        let rotation = (parent.inverse() * increment * parent * session.center_transform.rotation).normalize();
        session.center_transform.with_rotation(rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::session_fixture;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_hit_ring() {
        // Straight down onto the Y ring's rim
        let ray = Ray::new(Vec3::new(1.0, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(RotateGizmo::default().hit_test(&ray).map(|h| h.0), Some(PickedAxis::Y));

        let center = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert!(RotateGizmo::default().hit_test(&center).is_none());
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let gizmo = RotateGizmo::default();
        let mut session = session_fixture(TransformKind::Rotate, PickedAxis::Y, Transform::IDENTITY);
        let camera = Vec3::new(0.0, 10.0, 0.0);

        assert!(gizmo.begin(&mut session, &Ray::new(Vec3::new(1.0, 5.0, 0.0), Vec3::NEG_Y), camera));
        let delta = gizmo
            .drag(&session, &Ray::new(Vec3::new(0.0, 5.0, -1.0), Vec3::NEG_Y))
            .unwrap();
        assert!((delta.y - FRAC_PI_2).abs() < 1e-5);

        let rotated = gizmo.apply(&session, delta);
        let x = rotated.rotation * Vec3::X;
        assert!((x - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_sensitivity_scales_angle() {
        let gizmo = RotateGizmo::new(0.5);
        let mut session = session_fixture(TransformKind::Rotate, PickedAxis::Z, Transform::IDENTITY);
        let camera = Vec3::new(0.0, 0.0, 10.0);

        assert!(gizmo.begin(&mut session, &Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z), camera));
        let delta = gizmo
            .drag(&session, &Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::NEG_Z))
            .unwrap();
        assert!((delta.z - FRAC_PI_2 * 0.5).abs() < 1e-5);
    }
}
