//! Selection with per-node outline visuals.
//!
//! The controller owns the selected nodes in selection order. Every
//! selected node that is not flagged `no_selection` gets an outline shape
//! under the outline root; outlines are attached while "show selection" is
//! on and follow their targets every frame through [`SelectionController::refit`].

use std::sync::Arc;

use void_math::{Aabb, BoundingVolume};

use crate::error::Result;
use crate::proxy::ProxyCache;
use crate::scene::{
    colors, CullHint, Material, Mesh, ModelNode, NodeFlags, NodeId, NodeKind, SceneGraph,
};

/// A selected node and its outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionEntry {
    target: NodeId,
    /// Node drawn for the target (the visual model of a proxy)
    display: NodeId,
    outline: Option<NodeId>,
}

impl SelectionEntry {
    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn outline(&self) -> Option<NodeId> {
        self.outline
    }
}

/// Selected nodes and their outlines.
#[derive(Debug)]
pub struct SelectionController {
    entries: Vec<SelectionEntry>,
    outline_root: NodeId,
    show_selection: bool,
    /// Whether selection has changed since last taken
    dirty: bool,
}

impl SelectionController {
    pub fn new(outline_root: NodeId, show_selection: bool) -> Self {
        Self {
            entries: Vec::new(),
            outline_root,
            show_selection,
            dirty: false,
        }
    }

    /// Primary transform target: the first entry.
    pub fn primary(&self) -> Option<NodeId> {
        self.entries.first().map(|e| e.target)
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|e| e.target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_selected(&self, node: NodeId) -> bool {
        self.entries.iter().any(|e| e.target == node)
    }

    pub fn show_selection(&self) -> bool {
        self.show_selection
    }

    /// Check and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replace the selection with `nodes`.
    ///
    /// Entries no longer present lose their outline and, when flagged
    /// visible-only-when-selected, get hidden again. New entries are appended
    /// in the given order; retained entries keep their position.
    pub fn update_selection(&mut self, graph: &mut SceneGraph, proxies: &ProxyCache, nodes: &[NodeId]) {
        let mut wanted: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for &node in nodes {
            if graph.contains(node) && !wanted.contains(&node) {
                wanted.push(node);
            }
        }

        let (kept, removed): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| wanted.contains(&entry.target));

        for entry in &removed {
            release(graph, entry);
        }
        self.entries = kept;
        let mut changed = !removed.is_empty();

        for node in wanted {
            if self.is_selected(node) {
                continue;
            }
            let entry = self.select_one(graph, proxies, node);
            self.entries.push(entry);
            changed = true;
        }

        self.dirty |= changed;
        log::debug!("Selection updated: {} node(s)", self.entries.len());
    }

    /// Drop a single node from the selection (e.g. before it is removed).
    pub fn deselect(&mut self, graph: &mut SceneGraph, node: NodeId) {
        if let Some(index) = self.entries.iter().position(|e| e.target == node) {
            let entry = self.entries.remove(index);
            release(graph, &entry);
            self.dirty = true;
        }
    }

    pub fn clear(&mut self, graph: &mut SceneGraph) {
        for entry in self.entries.drain(..) {
            release(graph, &entry);
            self.dirty = true;
        }
    }

    /// Attach or detach every existing outline.
    pub fn set_show_selection(&mut self, graph: &mut SceneGraph, show: bool) -> Result<()> {
        self.show_selection = show;
        for outline in self.entries.iter().filter_map(|e| e.outline) {
            graph.set_attached(self.outline_root, outline, show)?;
        }
        Ok(())
    }

    /// Outlines currently attached to the outline root.
    pub fn attached_outlines(&self, graph: &SceneGraph) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter_map(|e| e.outline)
            .filter(|&o| graph.parent(o) == Some(self.outline_root))
            .collect()
    }

    /// Move every outline onto its target's displayed world transform.
    pub fn refit(&self, graph: &mut SceneGraph, proxies: &ProxyCache) {
        for entry in &self.entries {
            let Some(outline) = entry.outline else {
                continue;
            };
            let display = proxies.display_node(entry.target);
            let Some(world) = graph.world_transform(display) else {
                continue;
            };
            if let Err(e) = graph.set_local_transform(outline, world) {
                log::warn!("Failed to refit outline of {}: {}", entry.target, e);
            }
        }
    }

    fn select_one(&self, graph: &mut SceneGraph, proxies: &ProxyCache, target: NodeId) -> SelectionEntry {
        let flags = graph.get(target).map(|n| n.flags).unwrap_or_default();
        let display = proxies.display_node(target);

        if flags.visible_only_when_selected {
            set_cull_hint(graph, target, display, CullHint::Dynamic);
        }

        let outline = if flags.no_selection {
            None
        } else {
            let mut shape = outline_shape(graph, display);
            if let Some(world) = graph.world_transform(display) {
                shape.transform = world;
            }
            let parent = self.show_selection.then_some(self.outline_root);
            match graph.instantiate(&shape, parent) {
                Ok(id) => Some(id),
                Err(e) => {
                    log::warn!("Failed to build selection outline for {}: {}", target, e);
                    None
                }
            }
        };

        SelectionEntry {
            target,
            display,
            outline,
        }
    }
}

fn release(graph: &mut SceneGraph, entry: &SelectionEntry) {
    if let Some(outline) = entry.outline {
        graph.remove_subtree(outline);
    }
    let hidden = graph
        .get(entry.target)
        .map_or(false, |n| n.flags.visible_only_when_selected);
    if hidden {
        set_cull_hint(graph, entry.target, entry.display, CullHint::Always);
    }
}

/// Cull a target together with the node drawn for it.
fn set_cull_hint(graph: &mut SceneGraph, target: NodeId, display: NodeId, hint: CullHint) {
    let mut nodes = vec![target];
    if display != target {
        nodes.push(display);
    }
    for node in nodes {
        if let Err(e) = graph.set_cull_hint(node, hint) {
            log::warn!("Failed to set cull hint {:?} on {}: {}", hint, node, e);
        }
    }
}

/// Outline dispatch on the displayed node's kind.
fn outline_shape(graph: &SceneGraph, display: NodeId) -> ModelNode {
    let material = Material::wireframe("Selection", colors::SELECTION);

    let mesh = match graph.kind(display) {
        Some(NodeKind::Geometry(geometry)) => Arc::clone(&geometry.mesh),
        Some(NodeKind::ParticleSystem) => {
            let extent = graph
                .local_bound(display)
                .map_or(Aabb::UNIT, |bound| bound.to_aabb());
            Arc::new(Mesh::wire_box(&extent))
        }
        _ => match graph.local_bound(display) {
            Some(BoundingVolume::Box(aabb)) => Arc::new(Mesh::wire_box(&aabb)),
            Some(BoundingVolume::Sphere(sphere)) => Arc::new(Mesh::wire_sphere(&sphere, 24)),
            None => Arc::new(Mesh::wire_box(&Aabb::UNIT)),
        },
    };

    ModelNode::geometry("Selection outline", mesh, material).with_flags(NodeFlags::TOOL)
}

/// Resolve a raw geometry hit to the object that should be selected.
///
/// - geometry of a proxy visual resolves to its proxy node
/// - hidden hits and hits outside `current_model` resolve to `None`
/// - otherwise the nearest particle emitter, asset link or loaded model
///   root above the hit wins, falling back to the hit itself
pub fn find_selectable(
    graph: &SceneGraph,
    proxies: &ProxyCache,
    hit: NodeId,
    current_model: Option<NodeId>,
) -> Option<NodeId> {
    if let Some(proxy) = graph.ancestors(hit).find_map(|a| proxies.proxy_node_of(a)) {
        return Some(proxy);
    }

    if !graph.is_visible(hit) {
        return None;
    }
    let model = current_model?;
    if hit != model && !graph.is_descendant_of(hit, model) {
        return None;
    }

    let mut chain: Vec<NodeId> = Vec::new();
    for node in graph.ancestors(hit) {
        chain.push(node);
        if node == model {
            break;
        }
    }

    let first = |pred: &dyn Fn(NodeId) -> bool| chain.iter().copied().find(|&n| pred(n));

    first(&|n| matches!(graph.kind(n), Some(NodeKind::ParticleSystem)))
        .or_else(|| first(&|n| matches!(graph.kind(n), Some(NodeKind::AssetLink))))
        .or_else(|| first(&|n| graph.get(n).map_or(false, |node| node.flags.loaded_model)))
        .or(Some(hit))
}
