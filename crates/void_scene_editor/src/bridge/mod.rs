//! Thread bridge between the render and UI execution contexts.
//!
//! Each context owns a bounded FIFO queue. The bridge is the only way to
//! reach state owned by the other context:
//!
//! ```text
//! UI event ──schedule_on_render──▶ RenderContext task
//!                                     │
//!                                     └──schedule_on_ui──▶ UiContext task
//! ```
//!
//! Callers never block on the other side. Tasks on the same queue run in
//! submission order; a failing or panicking task is logged and the queue
//! moves on.

mod queue;
mod runner;

pub use queue::{task_queue, QueueStats, Task, TaskReceiver, TaskSender};
pub use runner::{ContextRunner, ExecutionContext};

use crate::editor::{RenderContext, UiContext};
use crate::error::Result;

/// Queue name of the render/simulation context
pub const RENDER_QUEUE: &str = "render";
/// Queue name of the UI context
pub const UI_QUEUE: &str = "ui";

/// Handle for scheduling work on either execution context. Cheap to clone;
/// every component that needs to hop contexts holds its own copy.
#[derive(Clone)]
pub struct ThreadBridge {
    render: TaskSender<RenderContext>,
    ui: TaskSender<UiContext>,
}

impl ThreadBridge {
    pub fn new(render: TaskSender<RenderContext>, ui: TaskSender<UiContext>) -> Self {
        Self { render, ui }
    }

    /// Schedule a task on the render context.
    pub fn schedule_on_render<F>(&self, label: &'static str, task: F) -> Result<()>
    where
        F: FnOnce(&mut RenderContext) -> Result<()> + Send + 'static,
    {
        self.render.schedule(Task::new(label, task))
    }

    /// Schedule a task on the UI context.
    pub fn schedule_on_ui<F>(&self, label: &'static str, task: F) -> Result<()>
    where
        F: FnOnce(&mut UiContext) -> Result<()> + Send + 'static,
    {
        self.ui.schedule(Task::new(label, task))
    }

    pub fn render_sender(&self) -> &TaskSender<RenderContext> {
        &self.render
    }

    pub fn ui_sender(&self) -> &TaskSender<UiContext> {
        &self.ui
    }

    /// Statistics of the render queue
    pub fn render_stats(&self) -> QueueStats {
        self.render.stats()
    }

    /// Statistics of the UI queue
    pub fn ui_stats(&self) -> QueueStats {
        self.ui.stats()
    }
}

impl std::fmt::Debug for ThreadBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadBridge")
            .field("render_pending", &self.render.pending())
            .field("ui_pending", &self.ui.pending())
            .finish()
    }
}
