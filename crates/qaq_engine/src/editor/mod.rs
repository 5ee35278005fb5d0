//! Editor viewport: selection, gizmo, inspector and the frame host tying them
//! to the scene mirror and camera.

pub mod gizmo;
pub mod host;
pub mod inspector;
pub mod orbit;

pub use gizmo::{GizmoBinding, GizmoMode};
pub use host::{Editor, FrameReport};
pub use inspector::InspectorPanel;
pub use orbit::{OrbitControls, OrbitState, PanGesture};

use thiserror::Error;

use crate::config::ConfigError;
use crate::scene::SceneError;

/// Errors surfaced by the editor host
#[derive(Debug, Error)]
pub enum EditorError {
    /// Rejected scene operation
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
