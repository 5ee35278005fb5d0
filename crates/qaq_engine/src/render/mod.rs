//! Retained-mode renderer contract
//!
//! The editor core never owns GPU state. It drives a retained object tree
//! (Three.js style `add`/`remove` plus settable transform and visibility)
//! through [`RenderBackend`], and the transform handle through [`GizmoSurface`].
//! [`RetainedScene`] is the in-memory implementation used by headless hosts and
//! tests.

pub mod retained;

pub use retained::{GizmoOp, RetainedScene, VisualObject};

use crate::camera::CameraView;
use crate::editor::gizmo::GizmoMode;
use crate::foundation::math::Transform;

slotmap::new_key_type! {
    /// Handle to a renderer-side visual object
    pub struct ObjectHandle;
}

/// Object-tree API of a retained renderer
///
/// `parent == None` addresses the renderer's scene root. Transforms passed in
/// are already in render space.
pub trait RenderBackend {
    /// Allocate a detached visual object
    fn create_object(&mut self, name: &str) -> ObjectHandle;

    /// Rename a visual object (debug label only)
    fn set_name(&mut self, object: ObjectHandle, name: &str);

    /// Append `child` to `parent`'s children, detaching it from any previous parent
    fn add(&mut self, parent: Option<ObjectHandle>, child: ObjectHandle);

    /// Remove `child` from `parent`'s children
    fn remove(&mut self, parent: Option<ObjectHandle>, child: ObjectHandle);

    /// Children of `parent` in insertion order
    fn children_of(&self, parent: Option<ObjectHandle>) -> Vec<ObjectHandle>;

    /// Set the local transform of an object
    fn set_transform(&mut self, object: ObjectHandle, transform: &Transform);

    /// Show or hide an object
    fn set_visible(&mut self, object: ObjectHandle, visible: bool);

    /// Free a visual object; the handle must not be used afterwards
    fn release(&mut self, object: ObjectHandle);

    /// Apply camera position and projection bounds
    fn set_camera(&mut self, view: &CameraView);

    /// Draw one frame
    fn render(&mut self);
}

/// Interactive transform handle provided by the renderer
pub trait GizmoSurface {
    /// Attach the handle to an object
    fn attach_gizmo(&mut self, object: ObjectHandle);

    /// Detach the handle from whatever it is attached to
    fn detach_gizmo(&mut self);

    /// Show or hide the handle
    fn set_gizmo_visible(&mut self, visible: bool);

    /// Switch the handle's interaction mode
    fn set_gizmo_mode(&mut self, mode: GizmoMode);
}
