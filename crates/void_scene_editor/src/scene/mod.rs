//! Live scene graph edited by the render context.

mod graph;
mod mesh;
mod model;
mod node;

pub use graph::{Ancestors, SceneGraph};
pub use mesh::{colors, Color, Material, Mesh, Topology};
pub use model::ModelNode;
pub use node::{CullHint, Geometry, NodeFlags, NodeId, NodeKind, SceneNode};
