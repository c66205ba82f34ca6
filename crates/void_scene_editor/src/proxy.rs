//! Proxy cache for domain entities without native scene representation.
//!
//! Every proxied entity gets two sibling nodes in its group:
//!
//! - the **proxy node**, an invisible node carrying the entity transform;
//!   it is what gets selected and moved by the gizmo
//! - the **visual model**, a template clone drawn at a fixed display scale
//!   that follows the proxy node every frame
//!
//! Entities are referenced by [`EntityKey`] only; the cache never owns the
//! document object, it keeps the latest snapshot.

use std::collections::hash_map::{Entry, HashMap};
use std::sync::Arc;

use void_math::{Aabb, BoundingSphere, BoundingVolume, Transform, Vec3};

use crate::config::ProxyConfig;
use crate::domain::{DomainEntity, EntityKey, LightKind, Presentation};
use crate::error::{EditorError, Result};
use crate::scene::{
    colors, Color, CullHint, Material, Mesh, ModelNode, NodeFlags, NodeId, NodeKind, SceneGraph,
    SceneNode,
};

/// Geometry of a light template that is tinted with the light color.
pub const LIGHT_TINT_GEOMETRY: &str = "White";

/// Supplier of proxy template models (external asset loading).
pub trait TemplateSource: Send {
    fn light_template(&self, kind: LightKind) -> Option<ModelNode>;
    fn audio_template(&self) -> Option<ModelNode>;
}

/// Procedural templates used when no asset-backed source is installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinTemplates;

impl TemplateSource for BuiltinTemplates {
    fn light_template(&self, kind: LightKind) -> Option<ModelNode> {
        let bulb = ModelNode::geometry(
            LIGHT_TINT_GEOMETRY,
            Arc::new(Mesh::sphere(25.0, 12, 8)),
            Material::unlit(LIGHT_TINT_GEOMETRY, colors::WHITE),
        );

        let mut root = ModelNode::node(format!("{kind:?} light")).with_child(bulb);
        if kind != LightKind::Point {
            // Direction indicator along -Z
            root = root.with_child(ModelNode::geometry(
                "Direction",
                Arc::new(Mesh::line(Vec3::ZERO, Vec3::new(0.0, 0.0, -80.0))),
                Material::unlit("Direction", colors::YELLOW),
            ));
        }
        Some(root)
    }

    fn audio_template(&self) -> Option<ModelNode> {
        Some(ModelNode::node("Audio").with_child(ModelNode::geometry(
            "Speaker",
            Arc::new(Mesh::cuboid(Vec3::splat(40.0))),
            Material::unlit("Speaker", colors::GRAY),
        )))
    }
}

/// Group nodes receiving proxies, one per entity family.
#[derive(Clone, Copy, Debug)]
pub struct ProxyGroups {
    pub lights: NodeId,
    pub audio: NodeId,
    pub presentables: NodeId,
}

/// Cached proxy of one domain entity.
#[derive(Clone, Debug)]
pub struct ProxyEntry {
    entity: DomainEntity,
    proxy_node: NodeId,
    visual_model: NodeId,
}

impl ProxyEntry {
    /// Latest known snapshot of the entity
    pub fn entity(&self) -> &DomainEntity {
        &self.entity
    }

    pub fn key(&self) -> EntityKey {
        self.entity.key()
    }

    pub fn proxy_node(&self) -> NodeId {
        self.proxy_node
    }

    pub fn visual_model(&self) -> NodeId {
        self.visual_model
    }
}

/// Identity-keyed proxy cache.
pub struct ProxyCache {
    groups: ProxyGroups,
    scales: ProxyConfig,
    entries: HashMap<EntityKey, ProxyEntry>,
    /// Reverse index over both proxy nodes and visual model roots
    by_node: HashMap<NodeId, EntityKey>,
}

impl ProxyCache {
    pub fn new(groups: ProxyGroups, scales: ProxyConfig) -> Self {
        Self {
            groups,
            scales,
            entries: HashMap::new(),
            by_node: HashMap::new(),
        }
    }

    pub fn groups(&self) -> ProxyGroups {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyEntry> {
        self.entries.values()
    }

    /// Return the cached entry for the entity or build one.
    ///
    /// Repeated calls with the same key return the same entry until
    /// [`remove`](Self::remove); the snapshot of an existing entry is left
    /// untouched (use [`sync`](Self::sync) for that).
    pub fn get_or_create(
        &mut self,
        graph: &mut SceneGraph,
        templates: &dyn TemplateSource,
        entity: &DomainEntity,
    ) -> Result<&ProxyEntry> {
        let key = entity.key();
        match self.entries.entry(key) {
            Entry::Occupied(existing) => Ok(existing.into_mut()),
            Entry::Vacant(slot) => {
                let entry = build_proxy(graph, templates, &self.groups, &self.scales, entity)?;
                self.by_node.insert(entry.proxy_node, key);
                self.by_node.insert(entry.visual_model, key);
                log::debug!(
                    "Created {} proxy {} for {}",
                    entity.kind_name(),
                    entry.proxy_node,
                    key
                );
                Ok(slot.insert(entry))
            }
        }
    }

    /// Detach and discard the entity's proxy. No-op if absent.
    pub fn remove(&mut self, graph: &mut SceneGraph, key: EntityKey) -> Option<ProxyEntry> {
        let entry = self.entries.remove(&key)?;
        self.by_node.remove(&entry.proxy_node);
        self.by_node.remove(&entry.visual_model);
        graph.remove_subtree(entry.proxy_node);
        graph.remove_subtree(entry.visual_model);
        log::debug!("Removed proxy for {}", key);
        Some(entry)
    }

    /// Remove every proxy.
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        let keys: Vec<EntityKey> = self.entries.keys().copied().collect();
        for key in keys {
            self.remove(graph, key);
        }
    }

    /// Entity represented by a proxy node or a visual model root.
    pub fn find_by_proxy(&self, node: NodeId) -> Option<&DomainEntity> {
        let key = self.by_node.get(&node)?;
        self.entries.get(key).map(|e| &e.entity)
    }

    pub fn find_by_entity(&self, key: EntityKey) -> Option<&ProxyEntry> {
        self.entries.get(&key)
    }

    /// Proxy node owning `node` when `node` is a proxy node or visual root.
    pub fn proxy_node_of(&self, node: NodeId) -> Option<NodeId> {
        let key = self.by_node.get(&node)?;
        self.entries.get(key).map(|e| e.proxy_node)
    }

    /// Node that is actually drawn for `target`: the visual model for proxy
    /// nodes, the node itself otherwise.
    pub fn display_node(&self, target: NodeId) -> NodeId {
        self.by_node
            .get(&target)
            .and_then(|key| self.entries.get(key))
            .filter(|e| e.proxy_node == target)
            .map_or(target, |e| e.visual_model)
    }

    /// Replace the cached snapshot after an external edit and push its
    /// transform and tint into the proxy.
    pub fn sync(&mut self, graph: &mut SceneGraph, entity: &DomainEntity) -> Result<()> {
        let key = entity.key();
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(EditorError::EntityNotFound(key))?;

        entry.entity = entity.clone();
        graph.set_local_transform(entry.proxy_node, entity.transform())?;

        if let DomainEntity::Light(light) = entity {
            tint(graph, entry.visual_model, light.color)?;
        }
        Ok(())
    }

    /// Per-frame sync: write proxy transforms back into the snapshots and
    /// move each visual model onto its proxy.
    pub fn sync_all(&mut self, graph: &mut SceneGraph) {
        for entry in self.entries.values_mut() {
            let Some(local) = graph.local_transform(entry.proxy_node) else {
                continue;
            };
            entry.entity.set_transform(local);

            let Some(world) = graph.world_transform(entry.proxy_node) else {
                continue;
            };
            let visual = visual_transform(&world, &entry.entity, &self.scales);
            if let Err(e) = graph.set_local_transform(entry.visual_model, visual) {
                log::warn!("Failed to sync proxy visual for {}: {}", entry.key(), e);
            }
        }
    }

    /// Latest transform of a proxied entity
    pub fn entity_transform(&self, key: EntityKey) -> Option<Transform> {
        self.entries.get(&key).map(|e| e.entity.transform())
    }
}

/// Where the visual model of a proxy sits for the proxy's world transform.
fn visual_transform(world: &Transform, entity: &DomainEntity, scales: &ProxyConfig) -> Transform {
    let scale = match entity {
        DomainEntity::Light(_) => Vec3::splat(scales.light_scale),
        DomainEntity::Audio(_) => Vec3::splat(scales.audio_scale),
        DomainEntity::Presentable(_) => world.scale * scales.presentable_scale,
    };
    Transform::new(world.translation, world.rotation, scale)
}

fn tint(graph: &mut SceneGraph, visual: NodeId, color: Color) -> Result<()> {
    let geometry = graph
        .find_by_name(visual, LIGHT_TINT_GEOMETRY)
        .ok_or_else(|| EditorError::TemplateMissing(format!("geometry '{LIGHT_TINT_GEOMETRY}'")))?;

    if let Some(NodeKind::Geometry(g)) = graph.get_mut(geometry).map(|n| &mut n.kind) {
        g.material.color = color;
    }
    Ok(())
}

fn presentable_model(presentation: Presentation) -> ModelNode {
    let (name, mesh) = match presentation {
        Presentation::Sphere => (
            "Sphere",
            Mesh::wire_sphere(&BoundingSphere::new(Vec3::ZERO, 1.0), 16),
        ),
        Presentation::Box => ("Box", Mesh::wire_box(&Aabb::UNIT)),
    };
    ModelNode::geometry(name, Arc::new(mesh), Material::wireframe(name, colors::YELLOW))
}

/// Per-kind proxy factory.
fn build_proxy(
    graph: &mut SceneGraph,
    templates: &dyn TemplateSource,
    groups: &ProxyGroups,
    scales: &ProxyConfig,
    entity: &DomainEntity,
) -> Result<ProxyEntry> {
    let (kind, group, mut visual, flags) = match entity {
        DomainEntity::Light(light) => {
            let mut model = templates
                .light_template(light.kind)
                .ok_or_else(|| EditorError::TemplateMissing(format!("{:?} light model", light.kind)))?;
            let tinted = model.find_mut(LIGHT_TINT_GEOMETRY).and_then(|n| match &mut n.kind {
                NodeKind::Geometry(g) => {
                    g.material.color = light.color;
                    Some(())
                }
                _ => None,
            });
            if tinted.is_none() {
                return Err(EditorError::TemplateMissing(format!(
                    "geometry '{LIGHT_TINT_GEOMETRY}' in {:?} light model",
                    light.kind
                )));
            }
            (NodeKind::LightProxy, groups.lights, model, NodeFlags::NONE)
        }
        DomainEntity::Audio(_) => {
            let model = templates
                .audio_template()
                .ok_or_else(|| EditorError::TemplateMissing("audio model".to_string()))?;
            (NodeKind::AudioProxy, groups.audio, model, NodeFlags::NONE)
        }
        DomainEntity::Presentable(presentable) => {
            let flags = NodeFlags {
                visible_only_when_selected: true,
                ..NodeFlags::NONE
            };
            (
                NodeKind::PresentableProxy,
                groups.presentables,
                presentable_model(presentable.presentation),
                flags,
            )
        }
    };

    let transform = entity.transform();
    visual.transform = visual_transform(&transform, entity, scales);
    if flags.visible_only_when_selected {
        visual.cull_hint = CullHint::Always;
    }

    let proxy = SceneNode::new(format!("{} proxy", entity.kind_name()), kind)
        .with_transform(transform)
        .with_cull_hint(CullHint::Always)
        .with_flags(flags);

    let proxy_node = graph.create_child(group, proxy)?;
    let visual_model = match graph.instantiate(&visual, Some(group)) {
        Ok(id) => id,
        Err(e) => {
            graph.remove_subtree(proxy_node);
            return Err(e);
        }
    };

    Ok(ProxyEntry {
        entity: entity.clone(),
        proxy_node,
        visual_model,
    })
}
