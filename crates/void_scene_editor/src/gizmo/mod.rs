//! Transform gizmos for move, rotate and scale drags.
//!
//! One [`TransformGizmo`] drives a single [`TransformSession`] through
//!
//! ```text
//! Idle --pointer_down (handle hit)--> Armed --pointer_move--> Active
//!   ^                                   |                       |
//!   +------- cancel / pointer_up -------+------- pointer_up ----+
//! ```
//!
//! Hit tests run against the handle shapes of the current tool only, in the
//! overlay's unit space. While active, the accumulated delta is applied to
//! the target's local transform every frame by [`TransformGizmo::process`].

mod rotate;
mod scale;
mod translate;

pub use rotate::RotateGizmo;
pub use scale::ScaleGizmo;
pub use translate::TranslateGizmo;

use serde::{Deserialize, Serialize};
use void_math::{ray_aabb, Aabb, Plane, Quat, Ray, Transform, Vec3};

use crate::config::GizmoConfig;
use crate::error::Result;
use crate::scene::{ModelNode, NodeId, SceneGraph};

/// Transform tool kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    #[default]
    Move,
    Rotate,
    Scale,
}

impl TransformKind {
    pub const ALL: [TransformKind; 3] = [TransformKind::Move, TransformKind::Rotate, TransformKind::Scale];

    fn index(self) -> usize {
        match self {
            TransformKind::Move => 0,
            TransformKind::Rotate => 1,
            TransformKind::Scale => 2,
        }
    }
}

/// Axes the gizmo handles are aligned to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Target's own axes
    Local,
    /// World axes
    #[default]
    Global,
}

/// Constraint chosen by the initial handle hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PickedAxis {
    X,
    Y,
    Z,
    XY,
    YZ,
    XZ,
    #[default]
    None,
}

impl PickedAxis {
    /// Unit axis for single-axis constraints
    pub fn unit_axis(self) -> Option<Vec3> {
        match self {
            PickedAxis::X => Some(Vec3::X),
            PickedAxis::Y => Some(Vec3::Y),
            PickedAxis::Z => Some(Vec3::Z),
            _ => None,
        }
    }

    /// Unit normal of the constraint plane for planar constraints
    pub fn plane_normal(self) -> Option<Vec3> {
        match self {
            PickedAxis::XY => Some(Vec3::Z),
            PickedAxis::YZ => Some(Vec3::X),
            PickedAxis::XZ => Some(Vec3::Y),
            _ => None,
        }
    }

    pub fn is_planar(self) -> bool {
        self.plane_normal().is_some()
    }
}

/// Phase of the transform state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GizmoPhase {
    Idle,
    Armed,
    Active,
}

/// Placement of the gizmo overlay: where it sits, how it is oriented and
/// how large it is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GizmoFrame {
    pub origin: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl GizmoFrame {
    pub fn to_transform(&self) -> Transform {
        Transform::new(self.origin, self.rotation, Vec3::splat(self.scale))
    }

    /// World direction of a unit-space axis.
    pub fn axis(&self, unit: Vec3) -> Vec3 {
        self.rotation * unit
    }

    /// Express a world ray in the overlay's unit space.
    pub fn to_unit_space(&self, ray: &Ray) -> Ray {
        ray.transform(&self.to_transform().inverse_matrix())
    }
}

/// Mutable state of an in-progress drag.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSession {
    pub kind: TransformKind,
    pub picked_axis: PickedAxis,
    pub target: NodeId,
    /// Target local transform when the drag started; deltas apply to it
    pub center_transform: Transform,
    /// Target local transform restored on cancel and recorded as undo state
    pub original_transform: Transform,
    /// Accumulated delta, unset until the first drag update
    pub delta: Option<Vec3>,
    pub active: bool,
    pub space: CoordinateSpace,
    pub frame: GizmoFrame,
    pub parent_world: Transform,
    /// Normal of the plane drag rays are intersected with
    pub drag_normal: Vec3,
    pub start_point: Vec3,
}

/// Result of a completed drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformApplied {
    pub target: NodeId,
    pub kind: TransformKind,
    pub old: Transform,
    pub new: Transform,
}

/// One tool's handle geometry and drag math.
pub trait Gizmo: Send {
    fn kind(&self) -> TransformKind;

    /// Handle shapes in unit space, drawn under the transform tool node.
    fn model(&self) -> ModelNode;

    /// Nearest handle along a unit-space ray.
    fn hit_test(&self, unit_ray: &Ray) -> Option<(PickedAxis, f32)>;

    /// Pick the drag plane and the start point. `false` when the ray cannot
    /// meet the plane.
    fn begin(&self, session: &mut TransformSession, ray: &Ray, camera_position: Vec3) -> bool;

    /// Delta for the current pointer ray.
    fn drag(&self, session: &TransformSession, ray: &Ray) -> Option<Vec3>;

    /// Target local transform for a delta.
    fn apply(&self, session: &TransformSession, delta: Vec3) -> Transform;
}

// Shared handle geometry and drag helpers

/// Axis handle boxes of the move and scale tools.
pub(crate) fn axis_handles() -> [(PickedAxis, Aabb); 3] {
    const NEAR: f32 = 0.2;
    const T: f32 = 0.08;
    [
        (PickedAxis::X, Aabb::new(Vec3::new(NEAR, -T, -T), Vec3::new(1.0, T, T))),
        (PickedAxis::Y, Aabb::new(Vec3::new(-T, NEAR, -T), Vec3::new(T, 1.0, T))),
        (PickedAxis::Z, Aabb::new(Vec3::new(-T, -T, NEAR), Vec3::new(T, T, 1.0))),
    ]
}

/// Nearest box hit among `handles`.
pub(crate) fn nearest_handle(
    unit_ray: &Ray,
    handles: impl IntoIterator<Item = (PickedAxis, Aabb)>,
) -> Option<(PickedAxis, f32)> {
    handles
        .into_iter()
        .filter_map(|(axis, aabb)| ray_aabb(unit_ray, &aabb).map(|t| (axis, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Plane containing `axis` that faces the camera as much as possible.
pub(crate) fn axis_drag_normal(axis: Vec3, origin: Vec3, camera_position: Vec3) -> Vec3 {
    let to_camera = (camera_position - origin).normalize_or_zero();
    let normal = to_camera - axis * axis.dot(to_camera);
    if normal.length_squared() > 1e-8 {
        normal.normalize()
    } else {
        axis.any_orthonormal_vector()
    }
}

/// World point where the ray meets the session's drag plane.
pub(crate) fn drag_point(session: &TransformSession, ray: &Ray) -> Option<Vec3> {
    Plane::from_point_normal(session.frame.origin, session.drag_normal).contact_point(ray)
}

// ============================================================================
// TransformGizmo
// ============================================================================

/// Scene nodes holding the handle models.
#[derive(Clone, Copy, Debug)]
struct Overlay {
    transform_tool: NodeId,
    roots: [NodeId; 3],
}

/// Transform state machine plus the three tool gizmos.
pub struct TransformGizmo {
    kind: TransformKind,
    space: CoordinateSpace,
    config: GizmoConfig,
    session: Option<TransformSession>,
    overlay: Option<Overlay>,
    frame: Option<GizmoFrame>,

    translate_gizmo: TranslateGizmo,
    rotate_gizmo: RotateGizmo,
    scale_gizmo: ScaleGizmo,
}

impl TransformGizmo {
    pub fn new(config: &GizmoConfig) -> Self {
        Self {
            kind: config.default_tool,
            space: config.default_space,
            config: config.clone(),
            session: None,
            overlay: None,
            frame: None,
            translate_gizmo: TranslateGizmo::new(),
            rotate_gizmo: RotateGizmo::new(config.rotate_sensitivity),
            scale_gizmo: ScaleGizmo::new(config.min_object_scale),
        }
    }

    /// Build the handle models and attach the current tool's under
    /// `transform_tool`.
    pub fn install(&mut self, graph: &mut SceneGraph, transform_tool: NodeId) -> Result<()> {
        let mut roots = [transform_tool; 3];
        for kind in TransformKind::ALL {
            let gizmo = self.gizmo(kind);
            let parent = (gizmo.kind() == self.kind).then_some(transform_tool);
            roots[kind.index()] = graph.instantiate(&gizmo.model(), parent)?;
        }
        self.overlay = Some(Overlay { transform_tool, roots });
        Ok(())
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    pub fn phase(&self) -> GizmoPhase {
        match &self.session {
            None => GizmoPhase::Idle,
            Some(s) if s.active => GizmoPhase::Active,
            Some(_) => GizmoPhase::Armed,
        }
    }

    pub fn session(&self) -> Option<&TransformSession> {
        self.session.as_ref()
    }

    pub fn is_interacting(&self) -> bool {
        self.session.is_some()
    }

    /// Frame computed by the last overlay update.
    pub fn frame(&self) -> Option<GizmoFrame> {
        self.frame
    }

    fn gizmo(&self, kind: TransformKind) -> &dyn Gizmo {
        match kind {
            TransformKind::Move => &self.translate_gizmo,
            TransformKind::Rotate => &self.rotate_gizmo,
            TransformKind::Scale => &self.scale_gizmo,
        }
    }

    fn current_gizmo(&self) -> &dyn Gizmo {
        self.gizmo(self.kind)
    }

    /// Switch tool kind. Ignored while a drag is active; a stale armed
    /// session is dropped. Returns whether the kind changed.
    pub fn set_kind(&mut self, graph: &mut SceneGraph, kind: TransformKind) -> Result<bool> {
        if self.phase() == GizmoPhase::Active {
            log::debug!("Ignoring tool switch to {:?} during an active drag", kind);
            return Ok(false);
        }
        self.session = None;
        if kind == self.kind {
            return Ok(false);
        }

        if let Some(overlay) = self.overlay {
            graph.set_attached(overlay.transform_tool, overlay.roots[self.kind.index()], false)?;
            graph.set_attached(overlay.transform_tool, overlay.roots[kind.index()], true)?;
        }
        self.kind = kind;
        Ok(true)
    }

    /// Takes effect from the next drag.
    pub fn set_space(&mut self, space: CoordinateSpace) {
        self.space = space;
    }

    /// Handle roots currently attached under the transform tool.
    pub fn attached_gizmos(&self, graph: &SceneGraph) -> usize {
        self.overlay.map_or(0, |overlay| {
            overlay
                .roots
                .iter()
                .filter(|&&root| graph.parent(root) == Some(overlay.transform_tool))
                .count()
        })
    }

    /// Overlay placement for `target` seen from `camera_position`.
    pub fn frame_for(&self, graph: &SceneGraph, target: NodeId, camera_position: Vec3) -> Option<GizmoFrame> {
        let world = graph.world_transform(target)?;
        let rotation = match self.space {
            CoordinateSpace::Local => world.rotation,
            CoordinateSpace::Global => Quat::IDENTITY,
        };
        Some(GizmoFrame {
            origin: world.translation,
            rotation,
            scale: self.config.overlay_scale(camera_position.distance(world.translation)),
        })
    }

    /// Per-frame overlay placement on the primary target.
    pub fn update_overlay(&mut self, graph: &mut SceneGraph, target: Option<NodeId>, camera_position: Vec3) {
        self.frame = target.and_then(|t| self.frame_for(graph, t, camera_position));
        if let (Some(frame), Some(overlay)) = (self.frame, self.overlay) {
            if let Err(e) = graph.set_local_transform(overlay.transform_tool, frame.to_transform()) {
                log::warn!("Failed to place transform tool: {}", e);
            }
        }
    }

    /// Idle -> Armed when the ray hits a handle of the current tool.
    ///
    /// Returns `false` (and stays idle) on a miss or while another session
    /// exists; the target is never touched here.
    pub fn pointer_down(
        &mut self,
        graph: &SceneGraph,
        target: NodeId,
        ray: &Ray,
        camera_position: Vec3,
    ) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(frame) = self.frame_for(graph, target, camera_position) else {
            return false;
        };
        let Some((picked_axis, _)) = self.current_gizmo().hit_test(&frame.to_unit_space(ray)) else {
            return false;
        };
        let (Some(center), Some(parent_world)) =
            (graph.local_transform(target), graph.parent_world_transform(target))
        else {
            return false;
        };

        let mut session = TransformSession {
            kind: self.kind,
            picked_axis,
            target,
            center_transform: center,
            original_transform: center,
            delta: None,
            active: false,
            space: self.space,
            frame,
            parent_world,
            drag_normal: Vec3::Y,
            start_point: frame.origin,
        };
        if !self.current_gizmo().begin(&mut session, ray, camera_position) {
            return false;
        }

        log::debug!("{:?} drag armed on {:?} axis of {}", self.kind, picked_axis, target);
        self.session = Some(session);
        true
    }

    /// Armed -> Active on the first move; recomputes the delta each move.
    pub fn pointer_move(&mut self, ray: &Ray) -> GizmoPhase {
        let kind = self.kind;
        let Some(session) = self.session.as_mut() else {
            return GizmoPhase::Idle;
        };
        session.active = true;

        let delta = match kind {
            TransformKind::Move => self.translate_gizmo.drag(session, ray),
            TransformKind::Rotate => self.rotate_gizmo.drag(session, ray),
            TransformKind::Scale => self.scale_gizmo.drag(session, ray),
        };
        if let Some(delta) = delta {
            session.delta = Some(delta);
        }
        GizmoPhase::Active
    }

    /// Apply the current delta to the target. Runs every frame.
    pub fn process(&self, graph: &mut SceneGraph) -> Result<()> {
        let Some(session) = self.session.as_ref().filter(|s| s.active) else {
            return Ok(());
        };
        let Some(delta) = session.delta else {
            return Ok(());
        };
        let transform = self.current_gizmo().apply(session, delta);
        graph.set_local_transform(session.target, transform)
    }

    /// End the drag. Yields old/new transforms when a delta was produced;
    /// a session without a delta is dropped and nothing is reported.
    pub fn pointer_up(&mut self, graph: &mut SceneGraph) -> Option<TransformApplied> {
        if self.session.as_ref()?.delta.is_none() {
            self.session = None;
            return None;
        }

        if let Err(e) = self.process(graph) {
            log::warn!("Failed to apply final transform: {}", e);
        }
        let session = self.session.take()?;
        let new = graph.local_transform(session.target)?;
        log::debug!("{:?} applied to {}", session.kind, session.target);
        Some(TransformApplied {
            target: session.target,
            kind: session.kind,
            old: session.original_transform,
            new,
        })
    }

    /// Restore the original transform and drop the session.
    pub fn cancel(&mut self, graph: &mut SceneGraph) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        if let Err(e) = graph.set_local_transform(session.target, session.original_transform) {
            log::warn!("Failed to restore transform on cancel: {}", e);
        }
        true
    }

    /// Forget the session without touching the target (target removed).
    pub fn reset(&mut self) {
        self.session = None;
    }
}

/// Session at the origin with a unit, world-aligned frame.
#[cfg(test)]
pub(crate) fn session_fixture(kind: TransformKind, axis: PickedAxis, parent_world: Transform) -> TransformSession {
    TransformSession {
        kind,
        picked_axis: axis,
        target: NodeId { index: 0, generation: 0 },
        center_transform: Transform::IDENTITY,
        original_transform: Transform::IDENTITY,
        delta: None,
        active: false,
        space: CoordinateSpace::Global,
        frame: GizmoFrame {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        },
        parent_world,
        drag_normal: Vec3::Y,
        start_point: Vec3::ZERO,
    }
}
