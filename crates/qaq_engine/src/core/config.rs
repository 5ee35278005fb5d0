//! # Editor Configuration
//!
//! All tunables of the viewport core in one serializable tree. Loaded through
//! the [`Config`] trait from `.toml` or `.ron`, with defaults matching the
//! behaviour of the browser editor.
//!
//! ```toml
//! [scene]
//! layer_spacing = 0.001
//!
//! [camera]
//! follow_speed = 5.0
//! half_width = 480.0
//! half_height = 270.0
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::editor::gizmo::GizmoMode;

/// Scene mirror settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Render-space distance between adjacent z-indices
    pub layer_spacing: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self { layer_spacing: 0.001 }
    }
}

/// Camera follow settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Interpolation factor per second while following
    pub follow_speed: f32,
    /// Half of the viewport width in logical units
    pub half_width: f32,
    /// Half of the viewport height in logical units
    pub half_height: f32,
    /// Initial zoom factor (greater than one shows less of the world)
    pub zoom: f32,
    /// Near clipping plane of the orthographic projection
    pub near: f32,
    /// Far clipping plane of the orthographic projection
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            follow_speed: 5.0,
            half_width: 480.0,
            half_height: 270.0,
            zoom: 1.0,
            near: -1000.0,
            far: 1000.0,
        }
    }
}

/// Gizmo interaction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoSettings {
    /// Mode the gizmo starts in
    pub default_mode: GizmoMode,
    /// Radians of rotation per logical unit of horizontal drag
    pub rotate_sensitivity: f32,
    /// Scale change per logical unit of horizontal drag
    pub scale_sensitivity: f32,
    /// Smallest uniform scale a drag may produce
    pub min_scale: f32,
}

impl Default for GizmoSettings {
    fn default() -> Self {
        Self {
            default_mode: GizmoMode::Translate,
            rotate_sensitivity: 0.01,
            scale_sensitivity: 0.01,
            min_scale: 0.01,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

/// Root configuration of the editor viewport core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Scene mirror settings
    pub scene: SceneSettings,
    /// Camera settings
    pub camera: CameraSettings,
    /// Gizmo settings
    pub gizmo: GizmoSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Config for EditorConfig {}

impl EditorConfig {
    /// Check every value that the core relies on being in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason: format!("must be positive, got {value}") })
            }
        }

        positive("scene.layer_spacing", self.scene.layer_spacing)?;
        positive("camera.half_width", self.camera.half_width)?;
        positive("camera.half_height", self.camera.half_height)?;
        positive("camera.zoom", self.camera.zoom)?;
        positive("gizmo.min_scale", self.gizmo.min_scale)?;

        if !self.camera.follow_speed.is_finite() || self.camera.follow_speed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.follow_speed",
                reason: format!("must be non-negative, got {}", self.camera.follow_speed),
            });
        }
        if self.camera.near >= self.camera.far {
            return Err(ConfigError::Invalid {
                field: "camera.near",
                reason: format!("must be below far ({} >= {})", self.camera.near, self.camera.far),
            });
        }
        Ok(())
    }
}
