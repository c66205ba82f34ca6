//! UI context: owner of the command log and the observer callbacks.

use void_math::Transform;

use crate::bridge::{ExecutionContext, TaskReceiver, ThreadBridge};
use crate::command::{Command, SetTransformCommand};
use crate::error::Result;
use crate::gizmo::{TransformApplied, TransformKind};
use crate::history::CommandLog;
use crate::picking::CameraSettings;
use crate::scene::NodeId;

/// Callbacks delivered on the UI context. Every method defaults to a no-op.
pub trait EditorObserver: Send {
    fn on_object_selected(&mut self, _node: Option<NodeId>) {}

    /// A drag finished and was recorded in the command log.
    fn on_transform_applied(&mut self, _node: NodeId, _old: Transform, _new: Transform) {}

    /// A command changed a transform (apply, undo or redo).
    fn on_transform_changed(&mut self, _node: NodeId, _transform: Transform) {}

    fn on_camera_settings_changed(&mut self, _settings: CameraSettings) {}

    fn on_model_opened(&mut self, _root: NodeId) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl EditorObserver for NullObserver {}

/// Observer that logs every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingObserver;

impl EditorObserver for LoggingObserver {
    fn on_object_selected(&mut self, node: Option<NodeId>) {
        match node {
            Some(node) => log::info!("Selected {}", node),
            None => log::info!("Selection cleared"),
        }
    }

    fn on_transform_applied(&mut self, node: NodeId, old: Transform, new: Transform) {
        log::info!("Transform applied to {}: {:?} -> {:?}", node, old.translation, new.translation);
    }

    fn on_transform_changed(&mut self, node: NodeId, transform: Transform) {
        log::debug!("Transform of {} is now {:?}", node, transform.translation);
    }

    fn on_camera_settings_changed(&mut self, settings: CameraSettings) {
        log::debug!("Camera at {:?} looking at {:?}", settings.position, settings.target);
    }

    fn on_model_opened(&mut self, root: NodeId) {
        log::info!("Model opened as {}", root);
    }
}

/// State owned by the UI context.
pub struct UiContext {
    bridge: ThreadBridge,
    queue: TaskReceiver<UiContext>,
    log: CommandLog,
    observer: Box<dyn EditorObserver>,
}

impl UiContext {
    pub fn new(
        bridge: ThreadBridge,
        queue: TaskReceiver<UiContext>,
        max_commands: usize,
        observer: Box<dyn EditorObserver>,
    ) -> Self {
        Self {
            bridge,
            queue,
            log: CommandLog::with_capacity(max_commands),
            observer,
        }
    }

    pub fn bridge(&self) -> &ThreadBridge {
        &self.bridge
    }

    pub fn history(&self) -> &CommandLog {
        &self.log
    }

    pub fn history_mut(&mut self) -> &mut CommandLog {
        &mut self.log
    }

    pub fn set_observer(&mut self, observer: Box<dyn EditorObserver>) {
        self.observer = observer;
    }

    /// Run the tasks queued so far.
    pub fn pump(&mut self) -> usize {
        let queue = self.queue.clone();
        queue.pump(self)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<()> {
        self.log.execute(&self.bridge, command)
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.log.undo(&self.bridge)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.log.redo(&self.bridge)
    }

    /// Record a finished drag and tell the observer.
    pub fn transform_applied(&mut self, applied: TransformApplied) -> Result<()> {
        let command = SetTransformCommand::new(applied.target, applied.old, applied.new)
            .with_description(transform_description(applied.kind));
        self.log.execute(&self.bridge, Box::new(command))?;
        self.observer
            .on_transform_applied(applied.target, applied.old, applied.new);
        Ok(())
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub fn notify_object_selected(&mut self, node: Option<NodeId>) {
        self.observer.on_object_selected(node);
    }

    pub fn notify_transform_changed(&mut self, node: NodeId, transform: Transform) {
        self.observer.on_transform_changed(node, transform);
    }

    pub fn notify_camera_settings(&mut self, settings: CameraSettings) {
        self.observer.on_camera_settings_changed(settings);
    }

    pub fn notify_model_opened(&mut self, root: NodeId) {
        self.observer.on_model_opened(root);
    }
}

impl ExecutionContext for UiContext {
    fn task_receiver(&self) -> TaskReceiver<Self> {
        self.queue.clone()
    }

    fn tick(&mut self, _dt: f32) {}
}

fn transform_description(kind: TransformKind) -> &'static str {
    match kind {
        TransformKind::Move => "Move",
        TransformKind::Rotate => "Rotate",
        TransformKind::Scale => "Scale",
    }
}
