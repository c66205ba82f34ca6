//! Editor configuration.
//!
//! Persistent settings loaded from and saved to a TOML file. Every field has
//! a default, so partial files are accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::gizmo::{CoordinateSpace, TransformKind};

/// Editor configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub viewport: ViewportConfig,
    pub gizmo: GizmoConfig,
    pub proxy: ProxyConfig,
    pub bridge: BridgeConfig,
    pub history: HistoryConfig,
}

/// Viewport overlays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub show_grid: bool,
    pub show_selection: bool,
    /// Number of grid cells along each side
    pub grid_size: u32,
    pub show_lights: bool,
    pub show_audio: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_selection: true,
            grid_size: 20,
            show_lights: true,
            show_audio: true,
        }
    }
}

/// Transform gizmo settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    /// Overlay scale per unit of camera distance
    pub screen_factor: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Smallest scale factor a scale drag may produce on any axis
    pub min_object_scale: f32,
    pub default_tool: TransformKind,
    pub default_space: CoordinateSpace,
    /// Multiplier applied to ring drag angles
    pub rotate_sensitivity: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            screen_factor: 0.15,
            min_scale: 0.1,
            max_scale: 10.0,
            min_object_scale: 0.01,
            default_tool: TransformKind::Move,
            default_space: CoordinateSpace::Global,
            rotate_sensitivity: 1.0,
        }
    }
}

impl GizmoConfig {
    /// Overlay scale for a camera at `distance` from the gizmo center.
    ///
    /// Never panics: an inverted range resolves to `max_scale`, and a NaN
    /// limit is ignored.
    pub fn overlay_scale(&self, distance: f32) -> f32 {
        (distance * self.screen_factor).max(self.min_scale).min(self.max_scale)
    }

    fn validate(&self) -> Result<()> {
        let finite = [
            ("screen_factor", self.screen_factor),
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("min_object_scale", self.min_object_scale),
            ("rotate_sensitivity", self.rotate_sensitivity),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(EditorError::Config(format!("gizmo.{name} must be finite, got {value}")));
            }
        }
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return Err(EditorError::Config(format!(
                "gizmo scale range [{}, {}] is empty or not positive",
                self.min_scale, self.max_scale
            )));
        }
        if self.min_object_scale <= 0.0 {
            return Err(EditorError::Config(format!(
                "gizmo.min_object_scale must be positive, got {}",
                self.min_object_scale
            )));
        }
        Ok(())
    }
}

/// Display scales of generated proxy visuals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub light_scale: f32,
    pub audio_scale: f32,
    pub presentable_scale: f32,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            light_scale: 0.01,
            audio_scale: 0.005,
            presentable_scale: 1.0,
        }
    }
}

/// Task queue capacities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub render_queue_capacity: usize,
    pub ui_queue_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            render_queue_capacity: 4096,
            ui_queue_capacity: 4096,
        }
    }
}

/// Undo history settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_commands: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_commands: 100 }
    }
}

impl EditorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the editor cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.gizmo.validate()?;
        if self.bridge.render_queue_capacity == 0 || self.bridge.ui_queue_capacity == 0 {
            return Err(EditorError::Config("task queue capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Serialize the configuration to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EditorError::Config(e.to_string()))
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        log::info!("Saved editor config to {:?}", path);
        Ok(())
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No editor config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load editor config {:?}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Get the default configuration path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("void_scene_editor");
            p.push("config.toml");
            p
        })
    }
}
