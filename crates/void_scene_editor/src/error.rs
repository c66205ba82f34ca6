//! Error types for the scene editor

use thiserror::Error;

use crate::domain::EntityKey;
use crate::scene::NodeId;

/// Scene editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Node handle is stale or was never created
    #[error("Scene node not found: {0}")]
    NodeNotFound(NodeId),

    /// No proxy is registered for the domain entity
    #[error("Domain entity not found: {0}")]
    EntityNotFound(EntityKey),

    /// A proxy template (or a required part of it) is unavailable
    #[error("Proxy template missing: {0}")]
    TemplateMissing(String),

    /// Attaching would make a node its own ancestor
    #[error("Invalid hierarchy: {child} cannot be attached under {parent}")]
    InvalidHierarchy { parent: NodeId, child: NodeId },

    /// Task queue rejected a task because it is at capacity
    #[error("Task queue '{0}' is full")]
    QueueFull(&'static str),

    /// The receiving execution context has shut down
    #[error("Execution context '{0}' is closed")]
    ContextClosed(&'static str),

    /// A task panicked while running
    #[error("Task '{label}' panicked: {message}")]
    TaskPanicked { label: &'static str, message: String },

    /// Invalid or unreadable configuration
    #[error("Invalid editor configuration: {0}")]
    Config(String),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for scene editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
