//! Undo/redo log of executed commands.
//!
//! Both directions replay the snapshots captured by the command, so undo
//! after redo (and the reverse) lands on exactly the recorded values.

use crate::bridge::ThreadBridge;
use crate::command::Command;
use crate::error::Result;

/// Undo/redo stacks.
pub struct CommandLog {
    /// Commands that can be undone
    undo_stack: Vec<Box<dyn Command>>,
    /// Commands that can be redone
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum undo depth
    max_size: usize,
    /// Whether the log changed since last marked saved
    dirty: bool,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandLog {
    /// Default maximum history size.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_MAX_SIZE)
    }

    pub fn with_capacity(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            dirty: false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the next undo command.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Description of the next redo command.
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Apply a command and record it. The redo stack is cleared; a command
    /// whose apply fails is not recorded.
    pub fn execute(&mut self, bridge: &ThreadBridge, mut command: Box<dyn Command>) -> Result<()> {
        command.apply(bridge)?;
        log::debug!("Executed '{}'", command.description());

        self.undo_stack.push(command);
        self.redo_stack.clear();
        self.dirty = true;

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        Ok(())
    }

    /// Revert the last command. Returns `false` when there is nothing to
    /// undo. On failure the command stays on the undo stack.
    pub fn undo(&mut self, bridge: &ThreadBridge) -> Result<bool> {
        let Some(mut command) = self.undo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = command.revert(bridge) {
            log::warn!("Undo of '{}' failed: {}", command.description(), e);
            self.undo_stack.push(command);
            return Err(e);
        }

        log::debug!("Undid '{}'", command.description());
        self.redo_stack.push(command);
        self.dirty = true;
        Ok(true)
    }

    /// Re-apply the last undone command. Returns `false` when there is
    /// nothing to redo. On failure the command stays on the redo stack.
    pub fn redo(&mut self, bridge: &ThreadBridge) -> Result<bool> {
        let Some(mut command) = self.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(e) = command.apply(bridge) {
            log::warn!("Redo of '{}' failed: {}", command.description(), e);
            self.redo_stack.push(command);
            return Err(e);
        }

        log::debug!("Redid '{}'", command.description());
        self.undo_stack.push(command);
        self.dirty = true;
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.dirty = false;
    }
}
