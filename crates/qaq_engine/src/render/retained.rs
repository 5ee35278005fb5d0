//! In-memory retained renderer
//!
//! Keeps the same object tree a real renderer would, without drawing anything.
//! Every gizmo call is journaled so hosts can check for attach/detach churn.

use slotmap::SlotMap;

use super::{GizmoSurface, ObjectHandle, RenderBackend};
use crate::camera::CameraView;
use crate::editor::gizmo::GizmoMode;
use crate::foundation::math::Transform;

/// A renderer-side object
#[derive(Debug, Clone)]
pub struct VisualObject {
    /// Debug label
    pub name: String,
    /// Local transform in render space
    pub transform: Transform,
    /// Visibility flag
    pub visible: bool,
    /// Parent object (`None` means the scene root or detached)
    pub parent: Option<ObjectHandle>,
    /// Whether the object currently hangs off the scene root or another object
    pub attached: bool,
    /// Children in insertion order
    pub children: Vec<ObjectHandle>,
}

/// Journaled gizmo operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoOp {
    /// Handle attached to an object
    Attach(ObjectHandle),
    /// Handle detached
    Detach,
    /// Visibility changed
    Visible(bool),
    /// Mode changed
    Mode(GizmoMode),
}

/// Headless retained scene
#[derive(Debug, Default)]
pub struct RetainedScene {
    objects: SlotMap<ObjectHandle, VisualObject>,
    scene_children: Vec<ObjectHandle>,
    camera: Option<CameraView>,
    gizmo_target: Option<ObjectHandle>,
    gizmo_visible: bool,
    gizmo_mode: GizmoMode,
    gizmo_journal: Vec<GizmoOp>,
    render_count: u64,
    released_count: u64,
}

impl RetainedScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an object
    pub fn object(&self, handle: ObjectHandle) -> Option<&VisualObject> {
        self.objects.get(handle)
    }

    /// Number of allocated (unreleased) objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of objects released so far
    pub fn released_count(&self) -> u64 {
        self.released_count
    }

    /// Number of frames drawn
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Last camera applied
    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    /// Object the gizmo is attached to
    pub fn gizmo_target(&self) -> Option<ObjectHandle> {
        self.gizmo_target
    }

    /// Whether the gizmo is shown
    pub fn gizmo_visible(&self) -> bool {
        self.gizmo_visible
    }

    /// Current gizmo mode
    pub fn gizmo_mode(&self) -> GizmoMode {
        self.gizmo_mode
    }

    /// Every gizmo operation in call order
    pub fn gizmo_journal(&self) -> &[GizmoOp] {
        &self.gizmo_journal
    }

    /// Forget the journal (e.g. between test phases)
    pub fn clear_gizmo_journal(&mut self) {
        self.gizmo_journal.clear();
    }

    fn detach_from_parent(&mut self, child: ObjectHandle) {
        let Some(object) = self.objects.get(child) else { return };
        if !object.attached {
            return;
        }
        match object.parent {
            Some(parent) => {
                if let Some(parent_object) = self.objects.get_mut(parent) {
                    parent_object.children.retain(|c| *c != child);
                }
            }
            None => self.scene_children.retain(|c| *c != child),
        }
        if let Some(object) = self.objects.get_mut(child) {
            object.parent = None;
            object.attached = false;
        }
    }
}

impl RenderBackend for RetainedScene {
    fn create_object(&mut self, name: &str) -> ObjectHandle {
        self.objects.insert(VisualObject {
            name: name.to_string(),
            transform: Transform::identity(),
            visible: true,
            parent: None,
            attached: false,
            children: Vec::new(),
        })
    }

    fn set_name(&mut self, object: ObjectHandle, name: &str) {
        if let Some(object) = self.objects.get_mut(object) {
            object.name = name.to_string();
        }
    }

    fn add(&mut self, parent: Option<ObjectHandle>, child: ObjectHandle) {
        if !self.objects.contains_key(child) {
            log::warn!("add: unknown child object {child:?}");
            return;
        }
        if let Some(parent) = parent {
            if !self.objects.contains_key(parent) {
                log::warn!("add: unknown parent object {parent:?}");
                return;
            }
        }

        self.detach_from_parent(child);
        match parent {
            Some(parent) => {
                if let Some(parent_object) = self.objects.get_mut(parent) {
                    parent_object.children.push(child);
                }
            }
            None => self.scene_children.push(child),
        }
        if let Some(object) = self.objects.get_mut(child) {
            object.parent = parent;
            object.attached = true;
        }
    }

    fn remove(&mut self, parent: Option<ObjectHandle>, child: ObjectHandle) {
        let Some(object) = self.objects.get(child) else { return };
        if object.attached && object.parent == parent {
            self.detach_from_parent(child);
        } else {
            log::warn!("remove: {child:?} is not a child of {parent:?}");
        }
    }

    fn children_of(&self, parent: Option<ObjectHandle>) -> Vec<ObjectHandle> {
        match parent {
            Some(parent) => self
                .objects
                .get(parent)
                .map(|object| object.children.clone())
                .unwrap_or_default(),
            None => self.scene_children.clone(),
        }
    }

    fn set_transform(&mut self, object: ObjectHandle, transform: &Transform) {
        if let Some(object) = self.objects.get_mut(object) {
            object.transform = *transform;
        }
    }

    fn set_visible(&mut self, object: ObjectHandle, visible: bool) {
        if let Some(object) = self.objects.get_mut(object) {
            object.visible = visible;
        }
    }

    fn release(&mut self, object: ObjectHandle) {
        self.detach_from_parent(object);
        if let Some(released) = self.objects.remove(object) {
            // Orphan anything still hanging off the released object
            for child in released.children {
                if let Some(child) = self.objects.get_mut(child) {
                    child.parent = None;
                    child.attached = false;
                }
            }
            if self.gizmo_target == Some(object) {
                self.gizmo_target = None;
            }
            self.released_count += 1;
        }
    }

    fn set_camera(&mut self, view: &CameraView) {
        self.camera = Some(*view);
    }

    fn render(&mut self) {
        self.render_count += 1;
        log::trace!("rendered frame {} ({} objects)", self.render_count, self.objects.len());
    }
}

impl GizmoSurface for RetainedScene {
    fn attach_gizmo(&mut self, object: ObjectHandle) {
        self.gizmo_target = Some(object);
        self.gizmo_journal.push(GizmoOp::Attach(object));
    }

    fn detach_gizmo(&mut self) {
        self.gizmo_target = None;
        self.gizmo_journal.push(GizmoOp::Detach);
    }

    fn set_gizmo_visible(&mut self, visible: bool) {
        self.gizmo_visible = visible;
        self.gizmo_journal.push(GizmoOp::Visible(visible));
    }

    fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        self.gizmo_mode = mode;
        self.gizmo_journal.push(GizmoOp::Mode(mode));
    }
}
