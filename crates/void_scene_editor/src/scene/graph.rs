//! Scene graph arena.
//!
//! Nodes live in generational slots and reference each other by [`NodeId`].
//! A node can exist detached (no parent); only the subtree under the editor
//! root is considered rendered.

use void_math::{BoundingVolume, Transform};

use super::model::ModelNode;
use super::node::{CullHint, NodeId, NodeKind, SceneNode};
use crate::error::{EditorError, Result};

struct Slot {
    node: Option<SceneNode>,
    generation: u32,
}

/// Generational arena of scene nodes.
pub struct SceneGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a detached node.
    pub fn create(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                node: Some(node),
                generation: 0,
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Insert a node as the last child of `parent`.
    pub fn create_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(EditorError::NodeNotFound(parent));
        }
        let id = self.create(node);
        self.attach(parent, id)?;
        Ok(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.get(id).ok_or(EditorError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.get_mut(id).ok_or(EditorError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    /// Attach `child` as the last child of `parent`, detaching it from its
    /// previous parent first. Attaching to the current parent is a no-op.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        let current = self.node(child)?.parent;
        if current == Some(parent) {
            return Ok(());
        }
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(EditorError::InvalidHierarchy { parent, child });
        }

        self.detach(child)?;
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detach a node from its parent. The subtree stays alive.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        let Some(parent) = self.node_mut(child)?.parent.take() else {
            return Ok(());
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|&c| c != child);
        }
        Ok(())
    }

    /// Attach or detach `child` under `parent` depending on `attached`.
    pub fn set_attached(&mut self, parent: NodeId, child: NodeId, attached: bool) -> Result<()> {
        if attached {
            self.attach(parent, child)
        } else if self.parent(child) == Some(parent) {
            self.detach(child)
        } else {
            Ok(())
        }
    }

    /// Remove a node and all of its descendants. Returns the number of
    /// removed nodes; stale handles yield zero.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        let _ = self.detach(id);

        let doomed = self.descendants(id);
        for &node in &doomed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(node.index);
            self.len -= 1;
        }
        doomed.len()
    }

    /// `id` and all its descendants in depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// True when `ancestor` is a strict ancestor of `id`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).skip(1).any(|a| a == ancestor)
    }

    /// Depth-first search below `root` (inclusive) by name.
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.name(id) == Some(name))
    }

    pub fn local_transform(&self, id: NodeId) -> Option<Transform> {
        self.get(id).map(|n| n.local)
    }

    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) -> Result<()> {
        self.node_mut(id)?.local = transform;
        Ok(())
    }

    /// Composition of all local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.mul_transform(&node.local)),
            None => Some(node.local),
        }
    }

    /// World transform of the parent, identity for detached nodes.
    pub fn parent_world_transform(&self, id: NodeId) -> Option<Transform> {
        match self.get(id)?.parent {
            Some(parent) => self.world_transform(parent),
            None => Some(Transform::IDENTITY),
        }
    }

    /// Visible when neither the node nor any ancestor is culled always.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.contains(id)
            && self
                .ancestors(id)
                .all(|a| self.get(a).map_or(false, |n| n.cull_hint != CullHint::Always))
    }

    pub fn set_cull_hint(&mut self, id: NodeId, cull_hint: CullHint) -> Result<()> {
        self.node_mut(id)?.cull_hint = cull_hint;
        Ok(())
    }

    /// Bound of the subtree in the node's own space: a geometry's mesh bound
    /// merged with the bounds of its children.
    pub fn local_bound(&self, id: NodeId) -> Option<BoundingVolume> {
        let node = self.get(id)?;
        let own = node.kind.geometry().map(|g| *g.mesh.bound());

        node.children.iter().fold(own, |acc, &child| {
            let child_bound = self.get(child).and_then(|child_node| {
                self.local_bound(child)
                    .map(|b| b.transformed(&child_node.local.to_matrix()))
            });
            match (acc, child_bound) {
                (Some(a), Some(b)) => Some(a.merge(&b)),
                (a, b) => a.or(b),
            }
        })
    }

    /// Bound of the subtree in world space.
    pub fn world_bound(&self, id: NodeId) -> Option<BoundingVolume> {
        let bound = self.local_bound(id)?;
        Some(bound.transformed(&self.world_transform(id)?.to_matrix()))
    }

    /// Instantiate a model description as a new subtree. Returns its root.
    pub fn instantiate(&mut self, model: &ModelNode, parent: Option<NodeId>) -> Result<NodeId> {
        let root = self.create(model.to_scene_node());
        if let Some(parent) = parent {
            if let Err(e) = self.attach(parent, root) {
                self.remove_subtree(root);
                return Err(e);
            }
        }

        let mut pending: Vec<(NodeId, &ModelNode)> = vec![(root, model)];
        while let Some((id, desc)) = pending.pop() {
            for child in &desc.children {
                let child_id = self.create_child(id, child.to_scene_node())?;
                pending.push((child_id, child));
            }
        }
        Ok(root)
    }
}

/// Iterator over a node and its ancestors.
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.graph.parent(current);
        Some(current)
    }
}
