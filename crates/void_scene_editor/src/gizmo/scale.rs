//! Scale gizmo implementation.

use void_math::{Ray, Transform, Vec3};

use super::translate::{axis_color, handle_node};
use super::{
    axis_drag_normal, axis_handles, drag_point, nearest_handle, Gizmo, PickedAxis,
    TransformKind, TransformSession,
};
use crate::scene::{ModelNode, NodeFlags};

/// Scale gizmo with one handle per axis.
///
/// The delta is a per-axis factor vector; dragging one unit of overlay size
/// away from the start doubles the picked axis.
#[derive(Clone, Copy, Debug)]
pub struct ScaleGizmo {
    /// Lower bound of every factor, keeps scales positive
    min_factor: f32,
}

impl Default for ScaleGizmo {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl ScaleGizmo {
    pub fn new(min_factor: f32) -> Self {
        Self {
            min_factor: min_factor.max(f32::EPSILON),
        }
    }
}

impl Gizmo for ScaleGizmo {
    fn kind(&self) -> TransformKind {
        TransformKind::Scale
    }

    fn model(&self) -> ModelNode {
        let mut root = ModelNode::node("Scale gizmo").with_flags(NodeFlags::TOOL);
        for (axis, aabb) in axis_handles() {
            root = root.with_child(handle_node(&format!("{axis:?}"), &aabb, axis_color(axis)));
        }
        root
    }

    fn hit_test(&self, unit_ray: &Ray) -> Option<(PickedAxis, f32)> {
        nearest_handle(unit_ray, axis_handles())
    }

    fn begin(&self, session: &mut TransformSession, ray: &Ray, camera_position: Vec3) -> bool {
        let Some(axis) = session.picked_axis.unit_axis() else {
            return false;
        };
        let frame = session.frame;
        session.drag_normal = axis_drag_normal(frame.axis(axis), frame.origin, camera_position);
        match drag_point(session, ray) {
            Some(point) => {
                session.start_point = point;
                true
            }
            None => false,
        }
    }

    fn drag(&self, session: &TransformSession, ray: &Ray) -> Option<Vec3> {
        let axis = session.picked_axis.unit_axis()?;
        let along = (drag_point(session, ray)? - session.start_point).dot(session.frame.axis(axis));
        let factor = (1.0 + along / session.frame.scale).max(self.min_factor);
        Some(Vec3::ONE + axis * (factor - 1.0))
    }

    /// Factors multiply the target's own axes.
    fn apply(&self, session: &TransformSession, delta: Vec3) -> Transform {
        let center = session.center_transform;
        center.with_scale(center.scale * delta.max(Vec3::splat(self.min_factor)))
    }
}
