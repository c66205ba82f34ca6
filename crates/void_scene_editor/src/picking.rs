//! Picking & Camera
//!
//! Ray queries against the live scene graph:
//!
//! - screen-to-ray conversion through the editor camera
//! - nearest visible geometry under a subtree (`pick_geometry`)
//! - contact with a bounded plane node such as the ground grid (`pick_plane`)
//!
//! A miss is `None`, never an error. Exact distance ties resolve to
//! whichever node the traversal reaches first.

use void_math::{radians, Mat4, Plane, Ray, Transform, Vec3};

use crate::scene::{Geometry, NodeId, NodeKind, SceneGraph, Topology};

// ============================================================================
// Camera
// ============================================================================

/// Perspective camera of the editor viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Immutable camera snapshot handed to the UI context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.set_viewport(width, height);
        self
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(radians(self.fov_y_degrees), self.aspect_ratio(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World ray through a pixel (origin at the top-left corner).
    pub fn screen_ray(&self, screen_x: f32, screen_y: f32) -> Option<Ray> {
        let ndc_x = (screen_x / self.width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (screen_y / self.height) * 2.0;
        Ray::from_ndc(&self.view_projection().inverse(), ndc_x, ndc_y)
    }

    /// Move the camera so that it looks at `location` from the same offset.
    pub fn move_to(&mut self, location: Vec3) {
        let offset = self.position - self.target;
        self.target = location;
        self.position = location + offset;
    }

    /// Keep the position, aim at `location`.
    pub fn look_at(&mut self, location: Vec3) {
        self.target = location;
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }

    pub fn settings(&self) -> CameraSettings {
        CameraSettings {
            position: self.position,
            target: self.target,
            fov_y_degrees: self.fov_y_degrees,
            near: self.near,
            far: self.far,
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Nearest geometry hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    /// World distance from the ray origin
    pub distance: f32,
    /// World contact point
    pub point: Vec3,
}

/// Closest visible geometry below `root` (inclusive) along the ray.
///
/// Triangle meshes are tested per triangle; line meshes only by their
/// bound, since they have no surface.
pub fn pick_geometry(graph: &SceneGraph, ray: &Ray, root: NodeId) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;

    for id in graph.descendants(root) {
        let Some(geometry) = graph.kind(id).and_then(NodeKind::geometry) else {
            continue;
        };
        if !graph.is_visible(id) {
            continue;
        }
        let Some(world) = graph.world_transform(id) else {
            continue;
        };
        let Some((distance, point)) = intersect_geometry(geometry, &world, ray) else {
            continue;
        };

        if best.map_or(true, |b| distance < b.distance) {
            best = Some(PickHit { node: id, distance, point });
        }
    }
    best
}

/// Contact point of the ray with a plane node.
///
/// The plane passes through the node's world origin with its local +Y as
/// normal, and is limited to the X/Z extent of the node's bound when it has
/// one.
pub fn pick_plane(graph: &SceneGraph, ray: &Ray, plane_node: NodeId) -> Option<Vec3> {
    let world = graph.world_transform(plane_node)?;
    let normal = world.rotation * Vec3::Y;
    let point = Plane::from_point_normal(world.translation, normal).contact_point(ray)?;

    if let Some(bound) = graph.local_bound(plane_node) {
        let local = world.inverse_matrix().transform_point3(point);
        let extent = bound.to_aabb();
        const SLACK: f32 = 1e-4;
        let inside = local.x >= extent.min.x - SLACK
            && local.x <= extent.max.x + SLACK
            && local.z >= extent.min.z - SLACK
            && local.z <= extent.max.z + SLACK;
        if !inside {
            return None;
        }
    }
    Some(point)
}

fn intersect_geometry(geometry: &Geometry, world: &Transform, ray: &Ray) -> Option<(f32, Vec3)> {
    let matrix = world.to_matrix();
    let inverse = matrix.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let local_ray = ray.transform(&inverse);
    if !local_ray.is_valid() {
        return None;
    }

    let mesh = &geometry.mesh;
    let bound_t = mesh.bound().intersect_ray(&local_ray)?;

    let local_t = match mesh.topology() {
        Topology::Triangles => mesh
            .triangles()
            .filter_map(|[a, b, c]| void_math::ray_triangle(&local_ray, a, b, c))
            .map(|hit| hit.distance)
            .min_by(f32::total_cmp)?,
        Topology::Lines => bound_t,
    };

    let point = matrix.transform_point3(local_ray.at(local_t));
    Some((ray.origin.distance(point), point))
}
