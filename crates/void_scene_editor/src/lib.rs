//! Void Scene Editor
//!
//! Interactive editing core for 3D scenes: picking, selection outlines,
//! transform gizmos with undo/redo, and viewport proxies for non-visual
//! entities (lights, audio sources, presentables).
//!
//! ## Architecture
//!
//! State is split between two single-threaded execution contexts that only
//! talk through queued tasks:
//!
//! ```text
//! RenderContext: SceneGraph, ProxyCache, SelectionController, TransformGizmo
//! UiContext:     CommandLog, EditorObserver
//! ```
//!
//! The host drives everything through [`SceneEditor`]; drags become
//! [`SetTransformCommand`]s in the [`CommandLog`].

pub mod bridge;
pub mod command;
pub mod config;
pub mod domain;
pub mod editing;
pub mod editor;
pub mod error;
pub mod gizmo;
pub mod history;
pub mod picking;
pub mod proxy;
pub mod scene;
pub mod selection;

pub use bridge::{ContextRunner, ExecutionContext, ThreadBridge};
pub use command::{Command, CommandBatch, SetTransformCommand};
pub use config::EditorConfig;
pub use domain::{AudioSource, DomainEntity, EntityKey, Light, LightKind, Presentable, Presentation};
pub use editing::{EditingControl, EditingInput};
pub use editor::{
    EditorContext, EditorObserver, LoggingObserver, NullObserver, PointerButton, RenderContext,
    RunningEditor, SceneEditor, UiContext,
};
pub use error::{EditorError, Result};
pub use gizmo::{CoordinateSpace, GizmoPhase, PickedAxis, TransformApplied, TransformGizmo, TransformKind};
pub use history::CommandLog;
pub use picking::{Camera, CameraSettings, PickHit};
pub use proxy::{BuiltinTemplates, ProxyCache, TemplateSource};
pub use scene::{ModelNode, NodeId, SceneGraph};
pub use selection::SelectionController;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
