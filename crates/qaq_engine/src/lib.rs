//! # QAQ Engine
//!
//! Viewport core for a 2D scene editor driving a retained 3D renderer.
//!
//! ## Features
//!
//! - **Scene Mirror**: logical node tree kept structurally identical to the
//!   renderer's object tree, with every change pushed immediately
//! - **Coordinate Conversion**: Y-down logical space to Y-up render space with
//!   an explicit draw-layer table
//! - **Camera Follow**: clamped exponential smoothing plus a decaying shake
//! - **Selection & Gizmo**: single selection, transform-handle drags with orbit
//!   mutual exclusion and cancel-restore
//! - **Change Notifications**: queued events dispatched once per frame to
//!   read-only observers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qaq_engine::prelude::*;
//!
//! fn main() -> Result<(), EditorError> {
//!     let mut editor = Editor::new(EditorConfig::default(), RetainedScene::new(), Box::new(OrbitState::new()))?;
//!
//!     let root = editor.mirror_mut().create_node("root");
//!     let player = editor.mirror_mut().create_node_with(
//!         NodeDesc::new("player").with_flags(NodeFlags::SELECTABLE | NodeFlags::CAMERA_TARGET),
//!     );
//!     editor.mirror_mut().add_child(root, player)?;
//!     editor.mirror_mut().attach_root(root)?;
//!     editor.follow(player)?;
//!
//!     let report = editor.frame(1.0 / 60.0, &[])?;
//!     assert!(report.rendered);
//!     editor.shutdown();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core editor modules
pub mod core;

pub mod camera;
pub mod config;
pub mod editor;
pub mod events;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

/// Common imports for editor hosts
pub mod prelude {
    pub use crate::{
        camera::{CameraFollow, CameraView, FollowState, OrthoCamera},
        config::{Config, ConfigError},
        core::config::EditorConfig,
        editor::{Editor, EditorError, EditorResult, FrameReport, GizmoMode, OrbitControls, OrbitState},
        events::{Event, EventHandler, EventType, SharedHandler},
        foundation::{
            math::{Quat, Transform, Vec2, Vec3},
            time::Timer,
        },
        input::{InputEvent, KeyCode, KeyEvent, PointerEvent, PointerKind},
        render::{GizmoSurface, RenderBackend, RetainedScene},
        scene::{NodeDesc, NodeFlags, NodeId, RenderLayer, SceneError, SceneMirror},
    };
}
