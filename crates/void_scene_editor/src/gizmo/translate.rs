//! Move gizmo: axis arrows and plane squares.

use std::sync::Arc;

use void_math::{Aabb, Ray, Transform, Vec3};

use super::{
    axis_drag_normal, axis_handles, drag_point, nearest_handle, Gizmo, PickedAxis,
    TransformKind, TransformSession,
};
use crate::scene::{colors, Color, Material, Mesh, ModelNode, NodeFlags};

const PLANE_MIN: f32 = 0.25;
const PLANE_MAX: f32 = 0.5;
const PLANE_THICKNESS: f32 = 0.02;

/// Plane handles: small squares between two axes.
fn plane_handles() -> [(PickedAxis, Aabb); 3] {
    let (a, b, t) = (PLANE_MIN, PLANE_MAX, PLANE_THICKNESS);
    [
        (PickedAxis::XY, Aabb::new(Vec3::new(a, a, -t), Vec3::new(b, b, t))),
        (PickedAxis::YZ, Aabb::new(Vec3::new(-t, a, a), Vec3::new(t, b, b))),
        (PickedAxis::XZ, Aabb::new(Vec3::new(a, -t, a), Vec3::new(b, t, b))),
    ]
}

pub(crate) fn axis_color(axis: PickedAxis) -> Color {
    match axis {
        PickedAxis::X | PickedAxis::YZ => colors::X_AXIS,
        PickedAxis::Y | PickedAxis::XZ => colors::Y_AXIS,
        _ => colors::Z_AXIS,
    }
}

pub(crate) fn handle_node(name: &str, aabb: &Aabb, color: Color) -> ModelNode {
    ModelNode::geometry(name, Arc::new(Mesh::cuboid(aabb.half_extents())), Material::unlit(name, color))
        .with_transform(Transform::from_translation(aabb.center()))
        .with_flags(NodeFlags::TOOL)
}

/// Translate gizmo with axis arrows and plane handles.
#[derive(Clone, Copy, Debug, Default)]
pub struct TranslateGizmo;

impl TranslateGizmo {
    pub fn new() -> Self {
        Self
    }
}

impl Gizmo for TranslateGizmo {
    fn kind(&self) -> TransformKind {
        TransformKind::Move
    }

    fn model(&self) -> ModelNode {
        let mut root = ModelNode::node("Move gizmo").with_flags(NodeFlags::TOOL);
        for (axis, aabb) in axis_handles().into_iter().chain(plane_handles()) {
            root = root.with_child(handle_node(&format!("{axis:?}"), &aabb, axis_color(axis)));
        }
        root
    }

    fn hit_test(&self, unit_ray: &Ray) -> Option<(PickedAxis, f32)> {
        nearest_handle(unit_ray, axis_handles().into_iter().chain(plane_handles()))
    }

    fn begin(&self, session: &mut TransformSession, ray: &Ray, camera_position: Vec3) -> bool {
        let frame = session.frame;
        session.drag_normal = match (session.picked_axis.unit_axis(), session.picked_axis.plane_normal()) {
            (Some(axis), _) => axis_drag_normal(frame.axis(axis), frame.origin, camera_position),
            (None, Some(normal)) => frame.axis(normal),
            (None, None) => return false,
        };
        match drag_point(session, ray) {
            Some(point) => {
                session.start_point = point;
                true
            }
            None => false,
        }
    }

    /// World-space translation delta.
    fn drag(&self, session: &TransformSession, ray: &Ray) -> Option<Vec3> {
        let raw = drag_point(session, ray)? - session.start_point;
        match session.picked_axis.unit_axis() {
            Some(axis) => {
                let axis = session.frame.axis(axis);
                Some(axis * raw.dot(axis))
            }
            None => Some(raw - session.drag_normal * raw.dot(session.drag_normal)),
        }
    }

    fn apply(&self, session: &TransformSession, delta: Vec3) -> Transform {
        let parent = &session.parent_world;
        let local_delta = (parent.rotation.inverse() * delta) / parent.scale;
        session
            .center_transform
            .with_translation(session.center_transform.translation + local_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gizmo::session_fixture;

    fn session(axis: PickedAxis, parent_world: Transform) -> TransformSession {
        session_fixture(TransformKind::Move, axis, parent_world)
    }

    #[test]
    fn test_hit_plane_handle() {
        let ray = Ray::new(Vec3::new(0.4, 0.4, 5.0), Vec3::NEG_Z);
        assert_eq!(TranslateGizmo.hit_test(&ray).map(|h| h.0), Some(PickedAxis::XY));
    }

    #[test]
    fn test_axis_drag_projects_onto_axis() {
        let camera = Vec3::new(0.0, 0.0, 10.0);
        let mut s = session(PickedAxis::X, Transform::IDENTITY);
        assert!(TranslateGizmo.begin(&mut s, &Ray::new(Vec3::new(0.5, 0.0, 10.0), Vec3::NEG_Z), camera));

        let delta = TranslateGizmo
            .drag(&s, &Ray::new(Vec3::new(2.5, 1.0, 10.0), Vec3::NEG_Z))
            .unwrap();
        assert_eq!(delta, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_planar_drag_keeps_both_axes() {
        let camera = Vec3::new(0.0, 0.0, 10.0);
        let mut s = session(PickedAxis::XY, Transform::IDENTITY);
        assert!(TranslateGizmo.begin(&mut s, &Ray::new(Vec3::new(0.4, 0.4, 10.0), Vec3::NEG_Z), camera));

        let delta = TranslateGizmo
            .drag(&s, &Ray::new(Vec3::new(1.4, 2.4, 10.0), Vec3::NEG_Z))
            .unwrap();
        assert!((delta - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_apply_respects_parent_scale() {
        let parent = Transform::IDENTITY.with_uniform_scale(2.0);
        let s = session(PickedAxis::X, parent);
        let moved = TranslateGizmo.apply(&s, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(moved.translation, Vec3::new(2.0, 0.0, 0.0));
    }
}
