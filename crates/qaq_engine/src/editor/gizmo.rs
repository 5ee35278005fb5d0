//! Selection and gizmo binding
//!
//! Keeps at most one node selected, keeps the renderer's transform handle on
//! that node, and turns handle drags into transform changes through the scene
//! mirror. While a drag is running the orbit controls are switched off so the
//! two input sources never fight over the pointer.

use serde::{Deserialize, Serialize};

use super::orbit::OrbitControls;
use crate::core::config::GizmoSettings;
use crate::events::{EventArg, EventType};
use crate::foundation::math::{Quat, Transform, Vec2, Vec3};
use crate::render::{GizmoSurface, ObjectHandle, RenderBackend};
use crate::scene::{NodeFlags, NodeId, SceneError, SceneMirror, SceneResult};

/// Interaction mode of the transform handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GizmoMode {
    /// Handle shown but inert
    None,
    /// Move the node
    #[default]
    Translate,
    /// Rotate the node about the view axis
    Rotate,
    /// Scale the node uniformly
    Scale,
}

impl GizmoMode {
    /// Whether handle drags change the node in this mode
    pub fn is_interactive(self) -> bool {
        self != Self::None
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    node: NodeId,
    start_pointer: Vec2,
    start_transform: Transform,
    orbit_was_enabled: bool,
}

/// Single-selection binding between the scene and the transform handle
pub struct GizmoBinding {
    selected: Option<NodeId>,
    attached: Option<ObjectHandle>,
    mode: GizmoMode,
    drag: Option<DragState>,
    orbit: Box<dyn OrbitControls>,
    settings: GizmoSettings,
}

impl GizmoBinding {
    /// Create a binding with nothing selected
    pub fn new(settings: &GizmoSettings, orbit: Box<dyn OrbitControls>) -> Self {
        Self {
            selected: None,
            attached: None,
            mode: settings.default_mode,
            drag: None,
            orbit,
            settings: settings.clone(),
        }
    }

    /// Currently selected node
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Current interaction mode
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Whether a handle drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Orbit controls governed by this binding
    pub fn orbit(&self) -> &dyn OrbitControls {
        self.orbit.as_ref()
    }

    /// Mutable orbit controls
    pub fn orbit_mut(&mut self) -> &mut dyn OrbitControls {
        self.orbit.as_mut()
    }

    /// Select a live node and move the handle onto it
    ///
    /// Selecting the node that is already selected does nothing.
    pub fn select<B>(&mut self, mirror: &mut SceneMirror<B>, id: NodeId) -> SceneResult<()>
    where
        B: RenderBackend + GizmoSurface,
    {
        let object = mirror.visual_of(id).ok_or_else(|| {
            if mirror.contains(id) {
                SceneError::NodeNotLive(id)
            } else {
                SceneError::NodeNotFound(id)
            }
        })?;
        if self.selected == Some(id) {
            if self.attached != Some(object) {
                self.reattach(mirror, object);
            }
            return Ok(());
        }

        if self.drag.is_some() {
            self.end_drag(mirror);
        }
        if self.selected.is_some() {
            mirror.backend_mut().detach_gizmo();
        }
        mirror.backend_mut().attach_gizmo(object);
        mirror.backend_mut().set_gizmo_visible(true);
        self.selected = Some(id);
        self.attached = Some(object);

        let name = mirror.node(id)?.name().to_string();
        log::debug!("Selected {id:?} '{name}'");
        mirror
            .emit(EventType::SelectionChanged, id)
            .arg("name", EventArg::Name(name));
        mirror.request_render();
        Ok(())
    }

    /// Drop the selection, detaching and hiding the handle
    ///
    /// Returns whether anything was selected.
    pub fn clear_selection<B>(&mut self, mirror: &mut SceneMirror<B>) -> bool
    where
        B: RenderBackend + GizmoSurface,
    {
        if self.drag.is_some() {
            self.end_drag(mirror);
        }
        let Some(previous) = self.selected.take() else {
            return false;
        };
        self.attached = None;
        mirror.backend_mut().detach_gizmo();
        mirror.backend_mut().set_gizmo_visible(false);

        log::debug!("Cleared selection of {previous:?}");
        mirror.events_mut().emit(EventType::SelectionChanged);
        mirror.request_render();
        true
    }

    /// Switch the interaction mode
    ///
    /// The handle keeps its visibility while a node is selected and is forced
    /// hidden when nothing is.
    pub fn set_mode<B>(&mut self, mirror: &mut SceneMirror<B>, mode: GizmoMode)
    where
        B: RenderBackend + GizmoSurface,
    {
        if self.mode == mode {
            return;
        }
        if self.drag.is_some() {
            self.end_drag(mirror);
        }
        self.mode = mode;

        let backend = mirror.backend_mut();
        backend.set_gizmo_mode(mode);
        if self.selected.is_none() {
            backend.set_gizmo_visible(false);
        }

        log::debug!("Gizmo mode set to {mode:?}");
        mirror
            .events_mut()
            .emit(EventType::GizmoModeChanged)
            .arg("mode", EventArg::Mode(mode));
        mirror.request_render();
    }

    /// Start dragging the selected node from a screen position
    ///
    /// Returns `false` when there is nothing to drag: no selection, mode
    /// [`GizmoMode::None`], a `LOCKED` node, or a drag already running.
    pub fn begin_drag<B>(&mut self, mirror: &mut SceneMirror<B>, pointer: Vec2) -> SceneResult<bool>
    where
        B: RenderBackend + GizmoSurface,
    {
        let Some(node) = self.selected else {
            return Ok(false);
        };
        if self.drag.is_some() || !self.mode.is_interactive() {
            return Ok(false);
        }
        let start_transform = *mirror.node(node)?.transform();
        if mirror.has_flag(node, NodeFlags::LOCKED) {
            log::debug!("{node:?} is locked; drag ignored");
            return Ok(false);
        }

        let orbit_was_enabled = self.orbit.is_enabled();
        self.orbit.set_enabled(false);
        self.drag = Some(DragState {
            node,
            start_pointer: pointer,
            start_transform,
            orbit_was_enabled,
        });

        log::trace!("Drag started on {node:?} in {:?} mode", self.mode);
        mirror.emit(EventType::DragStarted, node);
        Ok(true)
    }

    /// Apply the pointer's displacement since the drag began
    ///
    /// Deltas are measured from the drag start, so repeated moves never
    /// accumulate rounding drift. `zoom` is the viewport camera zoom.
    pub fn drag_to<B>(&mut self, mirror: &mut SceneMirror<B>, pointer: Vec2, zoom: f32) -> SceneResult<()>
    where
        B: RenderBackend + GizmoSurface,
    {
        let Some(drag) = self.drag else {
            return Ok(());
        };
        let delta = pointer - drag.start_pointer;
        let mut transform = drag.start_transform;

        match self.mode {
            GizmoMode::None => return Ok(()),
            GizmoMode::Translate => {
                let zoom = if zoom > 0.0 { zoom } else { 1.0 };
                let world_delta = Vec3::new(delta.x, delta.y, 0.0) / zoom;
                transform.position += self.parent_local_delta(mirror, drag.node, world_delta)?;
            }
            GizmoMode::Rotate => {
                let angle = delta.x * self.settings.rotate_sensitivity;
                transform.rotation = drag.start_transform.rotation * Quat::from_axis_angle(&Vec3::z_axis(), angle);
            }
            GizmoMode::Scale => {
                let factor = 1.0 + delta.x * self.settings.scale_sensitivity;
                let min_scale = self.settings.min_scale;
                transform.scale = (drag.start_transform.scale * factor).map(|s| s.max(min_scale));
            }
        }

        mirror.set_transform(drag.node, transform)
    }

    fn parent_local_delta<B: RenderBackend>(
        &self,
        mirror: &SceneMirror<B>,
        node: NodeId,
        world_delta: Vec3,
    ) -> SceneResult<Vec3> {
        let Some(parent) = mirror.parent(node)? else {
            return Ok(world_delta);
        };
        let parent_world = mirror.world_transform(parent)?;
        let unrotated = parent_world.rotation.inverse_transform_vector(&world_delta);
        Ok(unrotated.zip_map(&parent_world.scale, |d, s| if s.abs() > f32::EPSILON { d / s } else { d }))
    }

    /// Commit the running drag and restore the orbit controls
    ///
    /// Returns whether a drag was running.
    pub fn end_drag<B: RenderBackend>(&mut self, mirror: &mut SceneMirror<B>) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.orbit.set_enabled(drag.orbit_was_enabled);

        let position = mirror
            .node(drag.node)
            .map_or(drag.start_transform.position, |node| node.position());
        log::trace!("Drag ended on {:?}", drag.node);
        mirror
            .emit(EventType::DragEnded, drag.node)
            .arg("position", EventArg::Position(position));
        true
    }

    /// Abort the running drag, restoring the node transform and orbit controls
    pub fn cancel_drag<B: RenderBackend>(&mut self, mirror: &mut SceneMirror<B>) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.orbit.set_enabled(drag.orbit_was_enabled);

        if let Err(err) = mirror.set_transform(drag.node, drag.start_transform) {
            log::warn!("Could not restore transform of {:?}: {err}", drag.node);
        }
        log::debug!("Drag cancelled on {:?}", drag.node);
        mirror.emit(EventType::DragCancelled, drag.node);
        true
    }

    /// Follow the selected node's visual object
    ///
    /// A node that was detached and attached again gets a new visual object;
    /// the handle moves onto it. A node that was destroyed or left the live
    /// scene loses the selection. Returns whether the selection was dropped.
    pub fn sync<B>(&mut self, mirror: &mut SceneMirror<B>) -> bool
    where
        B: RenderBackend + GizmoSurface,
    {
        let Some(selected) = self.selected else {
            return false;
        };
        if let Some(object) = mirror.visual_of(selected) {
            if self.attached != Some(object) {
                self.reattach(mirror, object);
            }
            return false;
        }

        log::debug!("Selected node {selected:?} left the scene; dropping selection");
        if let Some(drag) = self.drag.take() {
            self.orbit.set_enabled(drag.orbit_was_enabled);
            mirror.events_mut().emit(EventType::DragCancelled);
        }
        self.selected = None;
        self.attached = None;
        mirror.backend_mut().detach_gizmo();
        mirror.backend_mut().set_gizmo_visible(false);
        mirror.events_mut().emit(EventType::SelectionChanged);
        mirror.request_render();
        true
    }

    fn reattach<B>(&mut self, mirror: &mut SceneMirror<B>, object: ObjectHandle)
    where
        B: RenderBackend + GizmoSurface,
    {
        log::debug!("Selected node moved to {object:?}; reattaching handle");
        let backend = mirror.backend_mut();
        backend.detach_gizmo();
        backend.attach_gizmo(object);
        backend.set_gizmo_visible(true);
        self.attached = Some(object);
        mirror.request_render();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::orbit::OrbitState;
    use crate::render::{GizmoOp, RetainedScene};
    use crate::scene::NodeDesc;
    use approx::assert_relative_eq;

    fn setup() -> (SceneMirror<RetainedScene>, GizmoBinding, NodeId, NodeId) {
        let mut mirror = SceneMirror::with_backend(RetainedScene::new());
        let a = mirror.create_node("a");
        let b = mirror.create_node("b");
        mirror.attach_root(a).unwrap();
        mirror.attach_root(b).unwrap();
        mirror.backend_mut().clear_gizmo_journal();
        let gizmo = GizmoBinding::new(&GizmoSettings::default(), Box::new(OrbitState::new()));
        (mirror, gizmo, a, b)
    }

    #[test]
    fn test_select_moves_handle_exclusively() {
        let (mut mirror, mut gizmo, a, b) = setup();
        gizmo.select(&mut mirror, a).unwrap();
        gizmo.select(&mut mirror, b).unwrap();

        let object_b = mirror.visual_of(b).unwrap();
        assert_eq!(gizmo.selected(), Some(b));
        assert_eq!(mirror.backend().gizmo_target(), Some(object_b));
        assert!(mirror.backend().gizmo_visible());
        let attaches = mirror
            .backend()
            .gizmo_journal()
            .iter()
            .filter(|op| matches!(op, GizmoOp::Attach(_)))
            .count();
        assert_eq!(attaches, 2);
    }

    #[test]
    fn test_reselect_is_a_no_op() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.select(&mut mirror, a).unwrap();
        gizmo.select(&mut mirror, a).unwrap();

        let object_a = mirror.visual_of(a).unwrap();
        assert_eq!(
            mirror.backend().gizmo_journal(),
            &[GizmoOp::Attach(object_a), GizmoOp::Visible(true)]
        );
    }

    #[test]
    fn test_select_dormant_node_fails() {
        let (mut mirror, mut gizmo, _, _) = setup();
        let dormant = mirror.create_node("dormant");
        assert_eq!(gizmo.select(&mut mirror, dormant), Err(SceneError::NodeNotLive(dormant)));
        assert_eq!(gizmo.selected(), None);
    }

    #[test]
    fn test_mode_leaves_visibility_to_selection() {
        let (mut mirror, mut gizmo, a, _) = setup();

        gizmo.set_mode(&mut mirror, GizmoMode::Rotate);
        assert!(!mirror.backend().gizmo_visible());

        gizmo.select(&mut mirror, a).unwrap();
        assert!(mirror.backend().gizmo_visible());

        gizmo.set_mode(&mut mirror, GizmoMode::None);
        assert!(mirror.backend().gizmo_visible());
        assert_eq!(gizmo.selected(), Some(a));
        assert!(!gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap());

        gizmo.set_mode(&mut mirror, GizmoMode::Scale);
        assert!(mirror.backend().gizmo_visible());
        assert_eq!(mirror.backend().gizmo_mode(), GizmoMode::Scale);

        gizmo.clear_selection(&mut mirror);
        assert!(!mirror.backend().gizmo_visible());
        assert_eq!(mirror.backend().gizmo_target(), None);

        gizmo.set_mode(&mut mirror, GizmoMode::Translate);
        assert!(!mirror.backend().gizmo_visible());
    }

    #[test]
    fn test_select_in_inert_mode_shows_handle() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.set_mode(&mut mirror, GizmoMode::None);
        gizmo.select(&mut mirror, a).unwrap();

        assert!(mirror.backend().gizmo_visible());
        assert_eq!(mirror.backend().gizmo_target(), mirror.visual_of(a));
    }

    #[test]
    fn test_drag_disables_orbit_and_release_restores() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.select(&mut mirror, a).unwrap();

        assert!(gizmo.begin_drag(&mut mirror, Vec2::new(100.0, 100.0)).unwrap());
        assert!(!gizmo.orbit().is_enabled());

        gizmo.drag_to(&mut mirror, Vec2::new(120.0, 90.0), 2.0).unwrap();
        assert_relative_eq!(mirror.node(a).unwrap().position(), Vec3::new(10.0, -5.0, 0.0));

        assert!(gizmo.end_drag(&mut mirror));
        assert!(gizmo.orbit().is_enabled());
        assert_relative_eq!(mirror.node(a).unwrap().position(), Vec3::new(10.0, -5.0, 0.0));
    }

    #[test]
    fn test_cancel_restores_transform_and_orbit() {
        let (mut mirror, mut gizmo, a, _) = setup();
        mirror.set_position(a, Vec3::new(5.0, 5.0, 0.0)).unwrap();
        gizmo.select(&mut mirror, a).unwrap();

        gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap();
        gizmo.drag_to(&mut mirror, Vec2::new(50.0, 50.0), 1.0).unwrap();
        assert!(gizmo.cancel_drag(&mut mirror));

        assert!(gizmo.orbit().is_enabled());
        assert!(!gizmo.is_dragging());
        assert_eq!(mirror.node(a).unwrap().position(), Vec3::new(5.0, 5.0, 0.0));
        let object = mirror.visual_of(a).unwrap();
        assert_eq!(
            mirror.backend().object(object).unwrap().transform.position,
            Vec3::new(5.0, -5.0, 0.0)
        );
    }

    #[test]
    fn test_orbit_disabled_before_drag_stays_disabled() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.orbit_mut().set_enabled(false);
        gizmo.select(&mut mirror, a).unwrap();
        gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap();
        gizmo.end_drag(&mut mirror);
        assert!(!gizmo.orbit().is_enabled());
    }

    #[test]
    fn test_locked_node_is_selectable_but_not_draggable() {
        let (mut mirror, mut gizmo, _, _) = setup();
        let locked = mirror.create_node_with(
            NodeDesc::new("locked").with_flags(NodeFlags::SELECTABLE | NodeFlags::LOCKED),
        );
        mirror.attach_root(locked).unwrap();

        gizmo.select(&mut mirror, locked).unwrap();
        assert!(!gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap());
        assert!(gizmo.orbit().is_enabled());
    }

    #[test]
    fn test_rotate_and_scale_drags() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.select(&mut mirror, a).unwrap();

        gizmo.set_mode(&mut mirror, GizmoMode::Rotate);
        gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap();
        gizmo.drag_to(&mut mirror, Vec2::new(100.0, 0.0), 1.0).unwrap();
        gizmo.end_drag(&mut mirror);
        assert_relative_eq!(mirror.node(a).unwrap().rotation().angle(), 1.0, epsilon = 1e-5);

        gizmo.set_mode(&mut mirror, GizmoMode::Scale);
        gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap();
        gizmo.drag_to(&mut mirror, Vec2::new(-1000.0, 0.0), 1.0).unwrap();
        gizmo.end_drag(&mut mirror);
        assert_relative_eq!(mirror.node(a).unwrap().scale(), Vec3::repeat(0.01));
    }

    #[test]
    fn test_translate_respects_parent_scale() {
        let (mut mirror, mut gizmo, a, b) = setup();
        mirror.detach_root(b).unwrap();
        mirror.set_scale(a, Vec3::new(2.0, 2.0, 1.0)).unwrap();
        mirror.add_child(a, b).unwrap();
        gizmo.select(&mut mirror, b).unwrap();

        gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap();
        gizmo.drag_to(&mut mirror, Vec2::new(10.0, 20.0), 1.0).unwrap();
        gizmo.end_drag(&mut mirror);

        assert_relative_eq!(mirror.node(b).unwrap().position(), Vec3::new(5.0, 10.0, 0.0));
        assert_relative_eq!(mirror.world_position(b).unwrap(), Vec3::new(10.0, 20.0, 0.0));
    }

    #[test]
    fn test_sync_drops_destroyed_selection_mid_drag() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.select(&mut mirror, a).unwrap();
        gizmo.begin_drag(&mut mirror, Vec2::zeros()).unwrap();

        mirror.destroy(a);
        assert!(gizmo.sync(&mut mirror));
        assert_eq!(gizmo.selected(), None);
        assert!(!gizmo.is_dragging());
        assert!(gizmo.orbit().is_enabled());
        assert!(!mirror.backend().gizmo_visible());
        assert!(!gizmo.sync(&mut mirror));
    }

    #[test]
    fn test_sync_follows_reattached_node() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.select(&mut mirror, a).unwrap();
        let first = mirror.visual_of(a).unwrap();

        mirror.detach_root(a).unwrap();
        mirror.attach_root(a).unwrap();
        let second = mirror.visual_of(a).unwrap();
        assert_ne!(first, second);
        assert_eq!(mirror.backend().gizmo_target(), None);

        assert!(!gizmo.sync(&mut mirror));
        assert_eq!(gizmo.selected(), Some(a));
        assert_eq!(mirror.backend().gizmo_target(), Some(second));
        assert!(mirror.backend().gizmo_visible());
        assert!(!gizmo.sync(&mut mirror));
    }

    #[test]
    fn test_reselect_after_reattach_moves_handle() {
        let (mut mirror, mut gizmo, a, _) = setup();
        gizmo.select(&mut mirror, a).unwrap();
        mirror.detach_root(a).unwrap();
        mirror.attach_root(a).unwrap();

        gizmo.select(&mut mirror, a).unwrap();
        assert_eq!(mirror.backend().gizmo_target(), mirror.visual_of(a));
        assert!(mirror.backend().gizmo_visible());
    }
}
