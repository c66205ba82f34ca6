//! Owned scene descriptions handed to the editor by external loaders.
//!
//! A [`ModelNode`] tree is plain data (`Send`, `Clone`), so it can cross
//! from a loader thread to the render context and be instantiated into the
//! graph there. Proxy templates use the same type.

use std::sync::Arc;

use void_math::Transform;

use super::mesh::{Material, Mesh};
use super::node::{CullHint, Geometry, NodeFlags, NodeKind, SceneNode};

/// Description of a node and its subtree.
#[derive(Clone, Debug, Default)]
pub struct ModelNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub cull_hint: CullHint,
    pub flags: NodeFlags,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    /// Plain grouping node
    pub fn node(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn geometry(name: impl Into<String>, mesh: Arc<Mesh>, material: Material) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Geometry(Geometry { mesh, material }),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_cull_hint(mut self, cull_hint: CullHint) -> Self {
        self.cull_hint = cull_hint;
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    /// Find a descendant (or self) by name.
    pub fn find(&self, name: &str) -> Option<&ModelNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Find a descendant (or self) by name, mutably.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut ModelNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ModelNode::node_count).sum::<usize>()
    }

    pub(crate) fn to_scene_node(&self) -> SceneNode {
        SceneNode::new(self.name.clone(), self.kind.clone())
            .with_transform(self.transform)
            .with_cull_hint(self.cull_hint)
            .with_flags(self.flags)
    }
}
