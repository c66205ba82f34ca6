//! CPU-side meshes and materials.
//!
//! Meshes carry just enough data for picking and outline generation:
//! positions, indices and a precomputed model-space bound.

use void_math::{Aabb, BoundingSphere, BoundingVolume, Vec3, Vec4};

/// Primitive topology of a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Indexed mesh with a model-space bound.
#[derive(Clone, Debug)]
pub struct Mesh {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    topology: Topology,
    bound: BoundingVolume,
}

impl Mesh {
    /// Create a mesh; the bound is the box around all positions.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, topology: Topology) -> Self {
        let bound = BoundingVolume::Box(Aabb::from_points(positions.iter().copied()));
        Self {
            positions,
            indices,
            topology,
            bound,
        }
    }

    /// Replace the computed bound.
    pub fn with_bound(mut self, bound: BoundingVolume) -> Self {
        self.bound = bound;
        self
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn bound(&self) -> &BoundingVolume {
        &self.bound
    }

    /// Iterate triangles; empty for line meshes.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let chunks = match self.topology {
            Topology::Triangles => self.indices.chunks_exact(3),
            Topology::Lines => self.indices[..0].chunks_exact(3),
        };
        chunks.filter_map(move |tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }

    /// Solid box with the given half extents, centered at the origin.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, half_extents);
        let positions = aabb.corners().to_vec();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        Self::new(positions, indices, Topology::Triangles)
    }

    /// UV sphere with a sphere bound.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut positions = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let theta = std::f32::consts::TAU * segment as f32 / segments as f32;
                positions.push(Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                ));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self::new(positions, indices, Topology::Triangles)
            .with_bound(BoundingVolume::Sphere(BoundingSphere::new(Vec3::ZERO, radius)))
    }

    /// Twelve edges of a box.
    pub fn wire_box(aabb: &Aabb) -> Self {
        let positions = aabb.corners().to_vec();
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 1, 3, 3, 2, 2, 0,
            4, 5, 5, 7, 7, 6, 6, 4,
            0, 4, 1, 5, 2, 6, 3, 7,
        ];
        Self::new(positions, indices, Topology::Lines).with_bound(BoundingVolume::Box(*aabb))
    }

    /// Three great circles of a sphere.
    pub fn wire_sphere(sphere: &BoundingSphere, segments: u32) -> Self {
        let mut mesh = Self::empty_lines();
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            mesh.append_circle(sphere.center, axis, sphere.radius, segments);
        }
        mesh.bound = BoundingVolume::Sphere(*sphere);
        mesh
    }

    /// Circle in the plane orthogonal to `normal`.
    pub fn circle(center: Vec3, normal: Vec3, radius: f32, segments: u32) -> Self {
        let mut mesh = Self::empty_lines();
        mesh.append_circle(center, normal, radius, segments);
        mesh.bound = BoundingVolume::Sphere(BoundingSphere::new(center, radius));
        mesh
    }

    /// Single line segment.
    pub fn line(from: Vec3, to: Vec3) -> Self {
        Self::new(vec![from, to], vec![0, 1], Topology::Lines)
    }

    /// Square grid on the XZ plane with `cells` cells of unit size per side.
    pub fn grid(cells: u32) -> Self {
        let cells = cells.max(1);
        let half = cells as f32 * 0.5;
        let mut positions = Vec::with_capacity(((cells + 1) * 4) as usize);
        let mut indices = Vec::with_capacity(((cells + 1) * 4) as usize);

        for i in 0..=cells {
            let offset = -half + i as f32;
            let base = positions.len() as u32;
            positions.extend_from_slice(&[
                Vec3::new(offset, 0.0, -half),
                Vec3::new(offset, 0.0, half),
                Vec3::new(-half, 0.0, offset),
                Vec3::new(half, 0.0, offset),
            ]);
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 3]);
        }

        Self::new(positions, indices, Topology::Lines)
    }

    fn empty_lines() -> Self {
        Self::new(Vec::new(), Vec::new(), Topology::Lines)
    }

    fn append_circle(&mut self, center: Vec3, normal: Vec3, radius: f32, segments: u32) {
        let segments = segments.max(3);
        let normal = normal.normalize_or_zero();
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);
        let base = self.positions.len() as u32;

        for i in 0..segments {
            let angle = std::f32::consts::TAU * i as f32 / segments as f32;
            self.positions
                .push(center + (u * angle.cos() + v * angle.sin()) * radius);
            self.indices.push(base + i);
            self.indices.push(base + (i + 1) % segments);
        }
    }
}

/// RGBA color
pub type Color = Vec4;

/// Common colors
pub mod colors {
    use super::Color;

    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);
    pub const GRAY: Color = Color::new(0.5, 0.5, 0.5, 1.0);
    pub const X_AXIS: Color = Color::new(1.0, 0.39, 0.39, 1.0);
    pub const Y_AXIS: Color = Color::new(0.39, 1.0, 0.39, 1.0);
    pub const Z_AXIS: Color = Color::new(0.39, 0.39, 1.0, 1.0);
    /// Outline color of selected objects
    pub const SELECTION: Color = Color::new(1.0, 170.0 / 255.0, 64.0 / 255.0, 1.0);
}

/// Surface material as far as the editor cares.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Color,
    pub wireframe: bool,
    /// False when the material definition could not be resolved by the
    /// loader (missing shader or texture). Such materials are replaced on
    /// open.
    pub resolved: bool,
}

impl Material {
    pub fn unlit(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            wireframe: false,
            resolved: true,
        }
    }

    pub fn wireframe(name: impl Into<String>, color: Color) -> Self {
        Self {
            wireframe: true,
            ..Self::unlit(name, color)
        }
    }

    /// Material whose definition failed to resolve.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            resolved: false,
            ..Self::unlit(name, colors::WHITE)
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::unlit("Default", colors::GRAY)
    }
}
