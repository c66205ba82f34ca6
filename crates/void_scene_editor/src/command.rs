//! Reversible editor operations.
//!
//! Commands capture their before/after state by value. `apply` and
//! `revert` never touch the scene directly: they schedule the mutation on
//! the render context, which then schedules an observer notification on the
//! UI context.

use void_math::Transform;

use crate::bridge::ThreadBridge;
use crate::error::Result;
use crate::scene::NodeId;

/// A command that can be applied and reverted.
pub trait Command: Send {
    /// Human-readable description for the undo/redo menu.
    fn description(&self) -> &str;

    /// Schedule the forward mutation.
    fn apply(&mut self, bridge: &ThreadBridge) -> Result<()>;

    /// Schedule the inverse mutation.
    fn revert(&mut self, bridge: &ThreadBridge) -> Result<()>;
}

/// Set a node's local transform.
#[derive(Clone, Debug)]
pub struct SetTransformCommand {
    target: NodeId,
    old: Transform,
    new: Transform,
    description: String,
}

impl SetTransformCommand {
    pub fn new(target: NodeId, old: Transform, new: Transform) -> Self {
        Self {
            target,
            old,
            new,
            description: "Set Transform".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn old(&self) -> Transform {
        self.old
    }

    pub fn new_transform(&self) -> Transform {
        self.new
    }
}

/// Render-side write followed by a UI-side notification.
fn schedule_transform(bridge: &ThreadBridge, target: NodeId, transform: Transform) -> Result<()> {
    bridge.schedule_on_render("set_transform", move |ctx| {
        ctx.set_local_transform(target, transform)?;
        ctx.bridge().schedule_on_ui("transform_changed", move |ui| {
            ui.notify_transform_changed(target, transform);
            Ok(())
        })
    })
}

impl Command for SetTransformCommand {
    fn description(&self) -> &str {
        &self.description
    }

    fn apply(&mut self, bridge: &ThreadBridge) -> Result<()> {
        schedule_transform(bridge, self.target, self.new)
    }

    fn revert(&mut self, bridge: &ThreadBridge) -> Result<()> {
        schedule_transform(bridge, self.target, self.old)
    }
}

/// Several commands undone and redone as one unit.
///
/// A failing step is logged and the remaining steps still run; earlier
/// steps are not rolled back.
pub struct CommandBatch {
    name: String,
    commands: Vec<Box<dyn Command>>,
}

impl CommandBatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn with(mut self, command: Box<dyn Command>) -> Self {
        self.push(command);
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CommandBatch {
    fn description(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, bridge: &ThreadBridge) -> Result<()> {
        for command in &mut self.commands {
            if let Err(e) = command.apply(bridge) {
                log::warn!("'{}': step '{}' failed to apply: {}", self.name, command.description(), e);
            }
        }
        Ok(())
    }

    fn revert(&mut self, bridge: &ThreadBridge) -> Result<()> {
        for command in self.commands.iter_mut().rev() {
            if let Err(e) = command.revert(bridge) {
                log::warn!("'{}': step '{}' failed to revert: {}", self.name, command.description(), e);
            }
        }
        Ok(())
    }
}
