//! Render/simulation context: owner of the live scene graph.
//!
//! Everything that reads or mutates the graph, the proxies, the selection
//! or the transform session lives here and runs on the render queue.

use std::sync::Arc;

use void_math::{Ray, Transform, Vec2, Vec3};

use crate::bridge::{ExecutionContext, TaskReceiver, ThreadBridge};
use crate::config::EditorConfig;
use crate::domain::{DomainEntity, EntityKey};
use crate::editing::{EditingControl, EditingInput, EditingState};
use crate::error::Result;
use crate::gizmo::{CoordinateSpace, GizmoPhase, TransformApplied, TransformGizmo, TransformKind};
use crate::picking::{pick_geometry, pick_plane, Camera};
use crate::proxy::{ProxyCache, ProxyGroups, TemplateSource};
use crate::scene::{
    colors, Geometry, Material, Mesh, ModelNode, NodeFlags, NodeId, NodeKind, SceneGraph,
    SceneNode,
};
use crate::selection::{find_selectable, SelectionController};

use super::ui::UiContext;

/// Pointer buttons the viewport reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Fixed nodes of the editor scene.
///
/// ```text
/// root
/// ├── model root ── current model, lights, audio, presentables
/// └── tool root ─── grid, selection outlines, transform tool, cursor
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SceneLayout {
    pub root: NodeId,
    pub model_root: NodeId,
    pub lights: NodeId,
    pub audio: NodeId,
    pub presentables: NodeId,
    pub tool_root: NodeId,
    pub grid: NodeId,
    pub transform_tool: NodeId,
    pub cursor: NodeId,
}

impl SceneLayout {
    fn build(graph: &mut SceneGraph, config: &EditorConfig) -> Result<Self> {
        let viewport = &config.viewport;
        let group = |name: &str| SceneNode::new(name, NodeKind::Plain);
        let tool = |name: &str, kind: NodeKind| SceneNode::new(name, kind).with_flags(NodeFlags::TOOL);

        let root = graph.create(group("Scene root"));
        let model_root = graph.create_child(root, group("Model root"))?;
        let lights = graph.create(group("Lights"));
        let audio = graph.create(group("Audio"));
        let presentables = graph.create_child(model_root, group("Presentables"))?;
        graph.set_attached(model_root, lights, viewport.show_lights)?;
        graph.set_attached(model_root, audio, viewport.show_audio)?;

        let tool_root = graph.create_child(root, tool("Tool root", NodeKind::Plain))?;
        let grid = graph.create(tool(
            "Grid",
            NodeKind::Geometry(Geometry {
                mesh: Arc::new(Mesh::grid(viewport.grid_size)),
                material: Material::wireframe("Grid", colors::GRAY),
            }),
        ));
        graph.set_attached(tool_root, grid, viewport.show_grid)?;

        let transform_tool = graph.create(tool("Transform tool", NodeKind::Plain));
        let cursor = graph.create(tool(
            "Editing cursor",
            NodeKind::Geometry(Geometry {
                mesh: Arc::new(Mesh::sphere(0.1, 12, 8)),
                material: Material::unlit("Cursor", colors::YELLOW),
            }),
        ));

        Ok(Self {
            root,
            model_root,
            lights,
            audio,
            presentables,
            tool_root,
            grid,
            transform_tool,
            cursor,
        })
    }
}

/// State owned by the render context.
pub struct RenderContext {
    bridge: ThreadBridge,
    queue: TaskReceiver<RenderContext>,
    config: EditorConfig,
    graph: SceneGraph,
    layout: SceneLayout,
    proxies: ProxyCache,
    selection: SelectionController,
    gizmo: TransformGizmo,
    camera: Camera,
    current_model: Option<NodeId>,
    editing: EditingState,
    templates: Box<dyn TemplateSource>,
    /// Last pointer position in pixels
    pointer: Vec2,
}

impl RenderContext {
    pub fn new(
        bridge: ThreadBridge,
        queue: TaskReceiver<RenderContext>,
        config: &EditorConfig,
        templates: Box<dyn TemplateSource>,
    ) -> Result<Self> {
        let mut graph = SceneGraph::new();
        let layout = SceneLayout::build(&mut graph, config)?;

        let groups = ProxyGroups {
            lights: layout.lights,
            audio: layout.audio,
            presentables: layout.presentables,
        };
        let mut gizmo = TransformGizmo::new(&config.gizmo);
        gizmo.install(&mut graph, layout.transform_tool)?;

        Ok(Self {
            bridge,
            queue,
            config: config.clone(),
            proxies: ProxyCache::new(groups, config.proxy.clone()),
            selection: SelectionController::new(layout.tool_root, config.viewport.show_selection),
            gizmo,
            graph,
            layout,
            camera: Camera::default(),
            current_model: None,
            editing: EditingState::new(),
            templates,
            pointer: Vec2::ZERO,
        })
    }

    pub fn bridge(&self) -> &ThreadBridge {
        &self.bridge
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn proxies(&self) -> &ProxyCache {
        &self.proxies
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn editing(&self) -> &EditingState {
        &self.editing
    }

    pub fn current_model(&self) -> Option<NodeId> {
        self.current_model
    }

    /// Run the tasks queued so far.
    pub fn pump(&mut self) -> usize {
        let queue = self.queue.clone();
        queue.pump(self)
    }

    /// Per-frame update: apply the drag, sync proxies, refit outlines and
    /// place the overlays.
    pub fn update(&mut self, _dt: f32) {
        if let Err(e) = self.gizmo.process(&mut self.graph) {
            log::warn!("Failed to apply transform drag: {}", e);
            self.gizmo.reset();
        }

        self.proxies.sync_all(&mut self.graph);
        self.selection.refit(&mut self.graph, &self.proxies);

        let show_tool = !self.selection.is_empty() && !self.editing.is_enabled();
        if let Err(e) = self
            .graph
            .set_attached(self.layout.tool_root, self.layout.transform_tool, show_tool)
        {
            log::warn!("Failed to toggle transform tool: {}", e);
        }
        self.gizmo
            .update_overlay(&mut self.graph, self.selection.primary(), self.camera.position);

        if self.editing.is_enabled() {
            let point = self.scene_position_at(self.pointer.x, self.pointer.y);
            if let Err(e) = self
                .graph
                .set_local_transform(self.layout.cursor, Transform::from_translation(point))
            {
                log::warn!("Failed to move editing cursor: {}", e);
            }
            self.editing.update(&mut self.graph, point);
        }
    }

    fn notify_ui<F>(&self, label: &'static str, task: F)
    where
        F: FnOnce(&mut UiContext) -> Result<()> + Send + 'static,
    {
        if let Err(e) = self.bridge.schedule_on_ui(label, task) {
            log::warn!("Failed to notify UI ({}): {}", label, e);
        }
    }

    // ========================================================================
    // Document
    // ========================================================================

    /// Replace the current model. Unresolved materials are swapped for the
    /// default material.
    pub fn open_model(&mut self, mut model: ModelNode) -> Result<NodeId> {
        self.discard_current_model();

        let replaced = replace_invalid_materials(&mut model);
        if replaced > 0 {
            log::warn!("Model '{}': {} invalid material(s) replaced with default", model.name, replaced);
        }
        model.flags.loaded_model = true;

        let root = self.graph.instantiate(&model, Some(self.layout.model_root))?;
        self.current_model = Some(root);
        log::info!("Opened model '{}' ({} nodes)", model.name, model.node_count());

        self.notify_ui("model_opened", move |ui| {
            ui.notify_model_opened(root);
            Ok(())
        });
        Ok(root)
    }

    pub fn attach_current_model(&mut self) -> Result<()> {
        match self.current_model {
            Some(model) => self.graph.attach(self.layout.model_root, model),
            None => Ok(()),
        }
    }

    pub fn detach_current_model(&mut self) -> Result<()> {
        match self.current_model {
            Some(model) => self.graph.set_attached(self.layout.model_root, model, false),
            None => Ok(()),
        }
    }

    fn discard_current_model(&mut self) {
        let Some(model) = self.current_model.take() else {
            return;
        };
        let doomed: Vec<NodeId> = self
            .selection
            .targets()
            .filter(|&t| t == model || self.graph.is_descendant_of(t, model))
            .collect();
        if self
            .gizmo
            .session()
            .map_or(false, |s| doomed.contains(&s.target))
        {
            self.gizmo.reset();
        }
        for node in doomed {
            self.selection.deselect(&mut self.graph, node);
        }
        self.graph.remove_subtree(model);
    }

    /// Drop the current model, the proxies, the selection and any session.
    pub fn close_document(&mut self) {
        self.gizmo.reset();
        self.selection.clear(&mut self.graph);
        self.proxies.clear(&mut self.graph);
        self.discard_current_model();
        log::info!("Document closed");
    }

    // ========================================================================
    // Proxies
    // ========================================================================

    /// Proxy node of the entity, created on first use.
    pub fn add_entity(&mut self, entity: &DomainEntity) -> Result<NodeId> {
        match self
            .proxies
            .get_or_create(&mut self.graph, self.templates.as_ref(), entity)
        {
            Ok(entry) => Ok(entry.proxy_node()),
            Err(e) => {
                log::warn!("No proxy for {} {}: {}", entity.kind_name(), entity.key(), e);
                Err(e)
            }
        }
    }

    /// Remove the entity's proxy, dropping it from the selection first.
    pub fn remove_entity(&mut self, key: EntityKey) -> bool {
        let Some(proxy) = self.proxies.find_by_entity(key).map(|e| e.proxy_node()) else {
            return false;
        };
        if self.gizmo.session().map_or(false, |s| s.target == proxy) {
            self.gizmo.reset();
        }
        self.selection.deselect(&mut self.graph, proxy);
        self.proxies.remove(&mut self.graph, key).is_some()
    }

    /// Re-sync a proxy after its entity was edited elsewhere.
    pub fn notify_property_changed(&mut self, entity: &DomainEntity) -> Result<()> {
        self.proxies.sync(&mut self.graph, entity)
    }

    pub fn set_templates(&mut self, templates: Box<dyn TemplateSource>) {
        self.templates = templates;
    }

    // ========================================================================
    // Selection & Transform
    // ========================================================================

    pub fn update_selection(&mut self, nodes: &[NodeId]) {
        let stale = self
            .gizmo
            .session()
            .map_or(false, |s| !nodes.contains(&s.target));
        if stale {
            self.gizmo.cancel(&mut self.graph);
        }
        self.selection
            .update_selection(&mut self.graph, &self.proxies, nodes);
    }

    pub fn set_local_transform(&mut self, target: NodeId, transform: Transform) -> Result<()> {
        self.graph.set_local_transform(target, transform)
    }

    pub fn set_transform_kind(&mut self, kind: TransformKind) -> Result<bool> {
        self.gizmo.set_kind(&mut self.graph, kind)
    }

    pub fn set_coordinate_space(&mut self, space: CoordinateSpace) {
        self.gizmo.set_space(space);
    }

    /// Arm a drag on the primary selection when the ray hits a handle.
    pub fn begin_transform(&mut self, ray: &Ray) -> bool {
        let Some(target) = self.selection.primary() else {
            return false;
        };
        self.gizmo
            .pointer_down(&self.graph, target, ray, self.camera.position)
    }

    pub fn drag_transform(&mut self, ray: &Ray) -> GizmoPhase {
        self.gizmo.pointer_move(ray)
    }

    /// Finish the drag and hand the result to the UI context.
    pub fn end_transform(&mut self) -> Option<TransformApplied> {
        let applied = self.gizmo.pointer_up(&mut self.graph)?;
        self.notify_ui("transform_applied", move |ui| ui.transform_applied(applied));
        Some(applied)
    }

    pub fn cancel_transform(&mut self) -> bool {
        self.gizmo.cancel(&mut self.graph)
    }

    // ========================================================================
    // Picking
    // ========================================================================

    /// Selectable object under the ray: against everything below the model
    /// root first, then against the current model alone.
    pub fn pick_object(&self, ray: &Ray) -> Option<NodeId> {
        let resolve = |root: NodeId| {
            pick_geometry(&self.graph, ray, root)
                .and_then(|hit| find_selectable(&self.graph, &self.proxies, hit.node, self.current_model))
        };
        resolve(self.layout.model_root).or_else(|| self.current_model.and_then(resolve))
    }

    pub fn pick_scene_object_at(&self, screen_x: f32, screen_y: f32) -> Option<NodeId> {
        self.camera
            .screen_ray(screen_x, screen_y)
            .and_then(|ray| self.pick_object(&ray))
    }

    /// World point under the ray: model surface, then grid, then origin.
    pub fn scene_position(&self, ray: &Ray) -> Vec3 {
        self.current_model
            .and_then(|model| pick_geometry(&self.graph, ray, model))
            .map(|hit| hit.point)
            .or_else(|| pick_plane(&self.graph, ray, self.layout.grid))
            .unwrap_or(Vec3::ZERO)
    }

    pub fn scene_position_at(&self, screen_x: f32, screen_y: f32) -> Vec3 {
        self.camera
            .screen_ray(screen_x, screen_y)
            .map_or(Vec3::ZERO, |ray| self.scene_position(&ray))
    }

    /// Pick, select the result (or clear) and tell the UI.
    pub fn select_at(&mut self, screen_x: f32, screen_y: f32) -> Option<NodeId> {
        let picked = self.pick_scene_object_at(screen_x, screen_y);
        self.apply_pick(picked);
        picked
    }

    pub fn select_with_ray(&mut self, ray: &Ray) -> Option<NodeId> {
        let picked = self.pick_object(ray);
        self.apply_pick(picked);
        picked
    }

    fn apply_pick(&mut self, picked: Option<NodeId>) {
        let nodes: Vec<NodeId> = picked.into_iter().collect();
        self.update_selection(&nodes);
        self.notify_ui("object_selected", move |ui| {
            ui.notify_object_selected(picked);
            Ok(())
        });
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    pub fn pointer_moved(&mut self, screen_x: f32, screen_y: f32) {
        self.pointer = Vec2::new(screen_x, screen_y);
        if self.gizmo.is_interacting() {
            if let Some(ray) = self.camera.screen_ray(screen_x, screen_y) {
                self.drag_transform(&ray);
            }
        }
    }

    pub fn pointer_pressed(&mut self, button: PointerButton, screen_x: f32, screen_y: f32, ctrl: bool) {
        self.pointer = Vec2::new(screen_x, screen_y);
        if self.editing.is_enabled() {
            let point = self.scene_position_at(screen_x, screen_y);
            self.editing
                .start(&mut self.graph, point, editing_input(button, ctrl));
            return;
        }
        if button == PointerButton::Primary {
            if let Some(ray) = self.camera.screen_ray(screen_x, screen_y) {
                self.begin_transform(&ray);
            }
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton, screen_x: f32, screen_y: f32, ctrl: bool) {
        self.pointer = Vec2::new(screen_x, screen_y);
        if self.editing.is_enabled() {
            let point = self.scene_position_at(screen_x, screen_y);
            self.editing
                .finish(&mut self.graph, point, editing_input(button, ctrl));
            return;
        }
        match button {
            PointerButton::Primary => {
                self.end_transform();
            }
            PointerButton::Secondary => {
                self.select_at(screen_x, screen_y);
            }
        }
    }

    // ========================================================================
    // Camera
    // ========================================================================

    fn camera_changed(&self) {
        let settings = self.camera.settings();
        self.notify_ui("camera_settings", move |ui| {
            ui.notify_camera_settings(settings);
            Ok(())
        });
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.camera_changed();
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
        self.camera_changed();
    }

    pub fn move_camera_to(&mut self, location: Vec3) {
        self.camera.move_to(location);
        self.camera_changed();
    }

    pub fn camera_look_at(&mut self, location: Vec3) {
        self.camera.look_at(location);
        self.camera_changed();
    }

    // ========================================================================
    // View toggles & editing mode
    // ========================================================================

    pub fn set_show_grid(&mut self, show: bool) -> Result<()> {
        self.graph
            .set_attached(self.layout.tool_root, self.layout.grid, show)
    }

    pub fn set_show_selection(&mut self, show: bool) -> Result<()> {
        self.selection.set_show_selection(&mut self.graph, show)
    }

    pub fn set_show_lights(&mut self, show: bool) -> Result<()> {
        self.graph
            .set_attached(self.layout.model_root, self.layout.lights, show)
    }

    pub fn set_show_audio(&mut self, show: bool) -> Result<()> {
        self.graph
            .set_attached(self.layout.model_root, self.layout.audio, show)
    }

    /// Swap the transform tool for the editing cursor (or back).
    pub fn change_editing_mode(&mut self, enabled: bool) -> Result<()> {
        if enabled {
            self.gizmo.cancel(&mut self.graph);
        }
        self.editing.set_enabled(enabled);
        self.graph
            .set_attached(self.layout.tool_root, self.layout.cursor, enabled)?;
        if enabled {
            self.graph
                .set_attached(self.layout.tool_root, self.layout.transform_tool, false)?;
        }
        log::debug!("Editing mode {}", if enabled { "on" } else { "off" });
        Ok(())
    }

    pub fn set_editing_control(&mut self, control: Option<Box<dyn EditingControl>>) {
        self.editing.set_control(control);
    }
}

impl ExecutionContext for RenderContext {
    fn task_receiver(&self) -> TaskReceiver<Self> {
        self.queue.clone()
    }

    fn tick(&mut self, dt: f32) {
        self.update(dt);
    }
}

fn editing_input(button: PointerButton, ctrl: bool) -> EditingInput {
    match (button, ctrl) {
        (PointerButton::Primary, _) => EditingInput::Primary,
        (PointerButton::Secondary, false) => EditingInput::Secondary,
        (PointerButton::Secondary, true) => EditingInput::SecondaryWithCtrl,
    }
}

/// Swap unresolved materials for the default one. Returns how many were
/// replaced.
fn replace_invalid_materials(model: &mut ModelNode) -> usize {
    let mut replaced = 0;
    if let NodeKind::Geometry(geometry) = &mut model.kind {
        if !geometry.material.resolved {
            log::warn!(
                "Invalid material '{}' on '{}', using default",
                geometry.material.name,
                model.name
            );
            geometry.material = Material::default();
            replaced += 1;
        }
    }
    for child in &mut model.children {
        replaced += replace_invalid_materials(child);
    }
    replaced
}
