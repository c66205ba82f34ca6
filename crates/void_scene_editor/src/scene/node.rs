//! Scene node data.

use std::fmt;
use std::sync::Arc;

use void_math::Transform;

use super::mesh::{Material, Mesh};

/// Generational handle to a node in a [`SceneGraph`](super::SceneGraph).
///
/// A handle stays unique for the lifetime of the graph; once its node is
/// removed every lookup through it fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

/// Renderable mesh with its material.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub mesh: Arc<Mesh>,
    pub material: Material,
}

/// Closed set of node kinds the editor dispatches on.
#[derive(Clone, Debug, Default)]
pub enum NodeKind {
    /// Grouping node without content
    #[default]
    Plain,
    Geometry(Geometry),
    /// Root of a composite particle emitter
    ParticleSystem,
    /// Root of a linked external asset
    AssetLink,
    /// Edited stand-in of a light
    LightProxy,
    /// Edited stand-in of an audio source
    AudioProxy,
    /// Edited stand-in of a presentable marker
    PresentableProxy,
}

impl NodeKind {
    pub fn geometry(&self) -> Option<&Geometry> {
        match self {
            NodeKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn is_proxy(&self) -> bool {
        matches!(
            self,
            NodeKind::LightProxy | NodeKind::AudioProxy | NodeKind::PresentableProxy
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Plain => "plain",
            NodeKind::Geometry(_) => "geometry",
            NodeKind::ParticleSystem => "particle-system",
            NodeKind::AssetLink => "asset-link",
            NodeKind::LightProxy => "light-proxy",
            NodeKind::AudioProxy => "audio-proxy",
            NodeKind::PresentableProxy => "presentable-proxy",
        }
    }
}

/// Culling hint. `Always` hides the node and its subtree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullHint {
    #[default]
    Dynamic,
    Always,
    Never,
}

/// Editor flags carried by a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
    /// Never gets a selection outline
    pub no_selection: bool,
    /// Hidden unless selected
    pub visible_only_when_selected: bool,
    /// Root of a model loaded into the document; picks below resolve to it
    pub loaded_model: bool,
}

impl NodeFlags {
    pub const NONE: Self = Self {
        no_selection: false,
        visible_only_when_selected: false,
        loaded_model: false,
    };

    /// Flags of editor-only helper nodes
    pub const TOOL: Self = Self {
        no_selection: true,
        visible_only_when_selected: false,
        loaded_model: false,
    };
}

/// A node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub local: Transform,
    pub cull_hint: CullHint,
    pub flags: NodeFlags,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            local: Transform::IDENTITY,
            cull_hint: CullHint::Dynamic,
            flags: NodeFlags::NONE,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.local = transform;
        self
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_cull_hint(mut self, cull_hint: CullHint) -> Self {
        self.cull_hint = cull_hint;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
