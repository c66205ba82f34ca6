//! The two execution contexts and the facade the host drives them through.
//!
//! ```text
//! host ──SceneEditor──▶ render queue ──▶ RenderContext (graph, picking, gizmo)
//!                                             │
//!            EditorObserver ◀── UiContext ◀───┘ (command log, callbacks)
//! ```
//!
//! [`EditorContext`] owns both contexts and can either be pumped from the
//! host's loop or moved onto one thread per context with
//! [`EditorContext::spawn`].

mod render;
mod ui;

pub use render::{PointerButton, RenderContext, SceneLayout};
pub use ui::{EditorObserver, LoggingObserver, NullObserver, UiContext};

use std::time::Duration;

use void_math::{Transform, Vec3};

use crate::bridge::{task_queue, ContextRunner, ThreadBridge, RENDER_QUEUE, UI_QUEUE};
use crate::command::{Command, SetTransformCommand};
use crate::config::EditorConfig;
use crate::domain::{AudioSource, DomainEntity, EntityKey, Light, Presentable};
use crate::editing::EditingControl;
use crate::error::{EditorError, Result};
use crate::gizmo::{CoordinateSpace, TransformKind};
use crate::picking::Camera;
use crate::proxy::{BuiltinTemplates, TemplateSource};
use crate::scene::{ModelNode, NodeId};

/// Upper bound on pump rounds per [`EditorContext::pump`] call.
const MAX_PUMP_ROUNDS: usize = 64;

// ============================================================================
// EditorContext
// ============================================================================

/// Both execution contexts plus the facade, driven from one thread.
pub struct EditorContext {
    render: RenderContext,
    ui: UiContext,
    editor: SceneEditor,
}

impl EditorContext {
    pub fn new(
        config: EditorConfig,
        templates: Box<dyn TemplateSource>,
        observer: Box<dyn EditorObserver>,
    ) -> Result<Self> {
        config.validate()?;
        let (render_tx, render_rx) = task_queue(RENDER_QUEUE, config.bridge.render_queue_capacity);
        let (ui_tx, ui_rx) = task_queue(UI_QUEUE, config.bridge.ui_queue_capacity);
        let bridge = ThreadBridge::new(render_tx, ui_tx);

        let render = RenderContext::new(bridge.clone(), render_rx, &config, templates)?;
        let ui = UiContext::new(bridge.clone(), ui_rx, config.history.max_commands, observer);

        log::info!("Scene editor initialized");
        Ok(Self {
            render,
            ui,
            editor: SceneEditor::new(bridge),
        })
    }

    /// Default config, built-in proxy templates, no observer.
    pub fn with_defaults() -> Result<Self> {
        Self::new(EditorConfig::default(), Box::new(BuiltinTemplates), Box::new(NullObserver))
    }

    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    pub fn render(&self) -> &RenderContext {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderContext {
        &mut self.render
    }

    pub fn ui(&self) -> &UiContext {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiContext {
        &mut self.ui
    }

    /// Alternate between both queues until neither has work left.
    ///
    /// Tasks that schedule follow-ups on the other context (command apply,
    /// notifications) settle within one call.
    pub fn pump(&mut self) -> usize {
        let mut total = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let ran = self.render.pump() + self.ui.pump();
            if ran == 0 {
                break;
            }
            total += ran;
        }
        total
    }

    /// One frame: settle the queues, update the render context, settle again.
    pub fn run_frame(&mut self, dt: f32) {
        self.pump();
        self.render.update(dt);
        self.pump();
    }

    /// Move each context onto its own thread.
    pub fn spawn(self, tick: Duration) -> Result<RunningEditor> {
        let bridge = self.editor.bridge.clone();
        let render = ContextRunner::spawn("void-render", self.render, bridge.render_sender().clone(), tick)?;
        let ui = ContextRunner::spawn("void-ui", self.ui, bridge.ui_sender().clone(), tick)?;
        Ok(RunningEditor {
            editor: self.editor,
            render,
            ui,
        })
    }
}

/// Editor whose contexts run on dedicated threads.
pub struct RunningEditor {
    editor: SceneEditor,
    render: ContextRunner<RenderContext>,
    ui: ContextRunner<UiContext>,
}

impl RunningEditor {
    pub fn editor(&self) -> &SceneEditor {
        &self.editor
    }

    /// Stop both threads after their queued work and return the contexts.
    pub fn shutdown(self) -> Result<(RenderContext, UiContext)> {
        let render = self.render.shutdown()?;
        let ui = self.ui.shutdown()?;
        Ok((render, ui))
    }
}

// ============================================================================
// SceneEditor
// ============================================================================

/// Host-facing API. Every call is asynchronous: it queues the work on the
/// owning context and returns once queued. Results come back through
/// [`EditorObserver`] or the reply closures.
#[derive(Clone)]
pub struct SceneEditor {
    bridge: ThreadBridge,
}

impl SceneEditor {
    pub fn new(bridge: ThreadBridge) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &ThreadBridge {
        &self.bridge
    }

    fn render<F>(&self, label: &'static str, task: F) -> Result<()>
    where
        F: FnOnce(&mut RenderContext) -> Result<()> + Send + 'static,
    {
        self.bridge.schedule_on_render(label, task)
    }

    // ------------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------------

    pub fn open_model(&self, model: ModelNode) -> Result<()> {
        self.render("open_model", move |ctx| ctx.open_model(model).map(|_| ()))
    }

    pub fn attach_current_model(&self) -> Result<()> {
        self.render("attach_model", |ctx| ctx.attach_current_model())
    }

    pub fn detach_current_model(&self) -> Result<()> {
        self.render("detach_model", |ctx| ctx.detach_current_model())
    }

    pub fn close_document(&self) -> Result<()> {
        self.render("close_document", |ctx| {
            ctx.close_document();
            Ok(())
        })?;
        self.bridge.schedule_on_ui("clear_history", |ui| {
            ui.history_mut().clear();
            Ok(())
        })
    }

    // ------------------------------------------------------------------------
    // Domain entities
    // ------------------------------------------------------------------------

    pub fn add_light(&self, light: Light) -> Result<()> {
        self.add_entity("add_light", light.into())
    }

    pub fn remove_light(&self, key: EntityKey) -> Result<()> {
        self.remove_entity("remove_light", key)
    }

    pub fn add_audio_source(&self, source: AudioSource) -> Result<()> {
        self.add_entity("add_audio", source.into())
    }

    pub fn remove_audio_source(&self, key: EntityKey) -> Result<()> {
        self.remove_entity("remove_audio", key)
    }

    pub fn add_presentable(&self, presentable: Presentable) -> Result<()> {
        self.add_entity("add_presentable", presentable.into())
    }

    pub fn remove_presentable(&self, key: EntityKey) -> Result<()> {
        self.remove_entity("remove_presentable", key)
    }

    /// Re-sync the proxy after the entity was edited outside the viewport.
    pub fn notify_property_changed(&self, entity: DomainEntity) -> Result<()> {
        self.render("property_changed", move |ctx| ctx.notify_property_changed(&entity))
    }

    fn add_entity(&self, label: &'static str, entity: DomainEntity) -> Result<()> {
        self.render(label, move |ctx| ctx.add_entity(&entity).map(|_| ()))
    }

    fn remove_entity(&self, label: &'static str, key: EntityKey) -> Result<()> {
        self.render(label, move |ctx| {
            if !ctx.remove_entity(key) {
                log::debug!("No proxy for {} to remove", key);
            }
            Ok(())
        })
    }

    // ------------------------------------------------------------------------
    // Selection & transform
    // ------------------------------------------------------------------------

    pub fn update_selection(&self, nodes: Vec<NodeId>) -> Result<()> {
        self.render("update_selection", move |ctx| {
            ctx.update_selection(&nodes);
            Ok(())
        })
    }

    pub fn set_transform_tool_kind(&self, kind: TransformKind) -> Result<()> {
        self.render("set_transform_kind", move |ctx| ctx.set_transform_kind(kind).map(|_| ()))
    }

    pub fn set_coordinate_space(&self, space: CoordinateSpace) -> Result<()> {
        self.render("set_coordinate_space", move |ctx| {
            ctx.set_coordinate_space(space);
            Ok(())
        })
    }

    pub fn cancel_transform(&self) -> Result<()> {
        self.render("cancel_transform", |ctx| {
            ctx.cancel_transform();
            Ok(())
        })
    }

    /// Set a local transform through the command log, so it can be undone.
    pub fn set_transform(&self, target: NodeId, new: Transform) -> Result<()> {
        self.render("capture_transform", move |ctx| {
            let Some(old) = ctx.graph().local_transform(target) else {
                return Err(EditorError::NodeNotFound(target));
            };
            ctx.bridge().schedule_on_ui("execute_transform", move |ui| {
                ui.execute(Box::new(SetTransformCommand::new(target, old, new)))
            })
        })
    }

    pub fn execute(&self, command: Box<dyn Command>) -> Result<()> {
        self.bridge
            .schedule_on_ui("execute", move |ui| ui.execute(command))
    }

    pub fn undo(&self) -> Result<()> {
        self.bridge.schedule_on_ui("undo", |ui| ui.undo().map(|_| ()))
    }

    pub fn redo(&self) -> Result<()> {
        self.bridge.schedule_on_ui("redo", |ui| ui.redo().map(|_| ()))
    }

    // ------------------------------------------------------------------------
    // Picking & pointer input
    // ------------------------------------------------------------------------

    /// Pick at a screen position; `reply` runs on the UI context.
    pub fn pick_scene_object_at<F>(&self, screen_x: f32, screen_y: f32, reply: F) -> Result<()>
    where
        F: FnOnce(&mut UiContext, Option<NodeId>) + Send + 'static,
    {
        self.render("pick_object", move |ctx| {
            let picked = ctx.pick_scene_object_at(screen_x, screen_y);
            ctx.bridge().schedule_on_ui("pick_object_reply", move |ui| {
                reply(ui, picked);
                Ok(())
            })
        })
    }

    /// World position under a screen position; `reply` runs on the UI context.
    pub fn pick_scene_position_at<F>(&self, screen_x: f32, screen_y: f32, reply: F) -> Result<()>
    where
        F: FnOnce(&mut UiContext, Vec3) + Send + 'static,
    {
        self.render("pick_position", move |ctx| {
            let position = ctx.scene_position_at(screen_x, screen_y);
            ctx.bridge().schedule_on_ui("pick_position_reply", move |ui| {
                reply(ui, position);
                Ok(())
            })
        })
    }

    /// Pick and select what is under the pointer.
    pub fn select_at(&self, screen_x: f32, screen_y: f32) -> Result<()> {
        self.render("select_at", move |ctx| {
            ctx.select_at(screen_x, screen_y);
            Ok(())
        })
    }

    pub fn pointer_moved(&self, screen_x: f32, screen_y: f32) -> Result<()> {
        self.render("pointer_moved", move |ctx| {
            ctx.pointer_moved(screen_x, screen_y);
            Ok(())
        })
    }

    pub fn pointer_pressed(&self, button: PointerButton, screen_x: f32, screen_y: f32, ctrl: bool) -> Result<()> {
        self.render("pointer_pressed", move |ctx| {
            ctx.pointer_pressed(button, screen_x, screen_y, ctrl);
            Ok(())
        })
    }

    pub fn pointer_released(&self, button: PointerButton, screen_x: f32, screen_y: f32, ctrl: bool) -> Result<()> {
        self.render("pointer_released", move |ctx| {
            ctx.pointer_released(button, screen_x, screen_y, ctrl);
            Ok(())
        })
    }

    // ------------------------------------------------------------------------
    // Camera & view
    // ------------------------------------------------------------------------

    pub fn set_camera(&self, camera: Camera) -> Result<()> {
        self.render("set_camera", move |ctx| {
            ctx.set_camera(camera);
            Ok(())
        })
    }

    pub fn set_viewport(&self, width: f32, height: f32) -> Result<()> {
        self.render("set_viewport", move |ctx| {
            ctx.set_viewport(width, height);
            Ok(())
        })
    }

    pub fn move_camera_to(&self, location: Vec3) -> Result<()> {
        self.render("move_camera", move |ctx| {
            ctx.move_camera_to(location);
            Ok(())
        })
    }

    pub fn camera_look_at(&self, location: Vec3) -> Result<()> {
        self.render("camera_look_at", move |ctx| {
            ctx.camera_look_at(location);
            Ok(())
        })
    }

    pub fn set_show_grid(&self, show: bool) -> Result<()> {
        self.render("show_grid", move |ctx| ctx.set_show_grid(show))
    }

    pub fn set_show_selection(&self, show: bool) -> Result<()> {
        self.render("show_selection", move |ctx| ctx.set_show_selection(show))
    }

    pub fn set_show_lights(&self, show: bool) -> Result<()> {
        self.render("show_lights", move |ctx| ctx.set_show_lights(show))
    }

    pub fn set_show_audio(&self, show: bool) -> Result<()> {
        self.render("show_audio", move |ctx| ctx.set_show_audio(show))
    }

    // ------------------------------------------------------------------------
    // Editing mode
    // ------------------------------------------------------------------------

    pub fn change_editing_mode(&self, enabled: bool) -> Result<()> {
        self.render("editing_mode", move |ctx| ctx.change_editing_mode(enabled))
    }

    pub fn set_editing_control(&self, control: Option<Box<dyn EditingControl>>) -> Result<()> {
        self.render("editing_control", move |ctx| {
            ctx.set_editing_control(control);
            Ok(())
        })
    }
}
