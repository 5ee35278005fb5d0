//! Editor frame host
//!
//! Owns every viewport subsystem and runs them in a fixed order each tick:
//!
//! 1. input (picking, selection, handle drags, panning, key actions)
//! 2. selection sync (drop a selection whose node left the scene)
//! 3. camera follow update
//! 4. render, only if something requested it
//! 5. dispatch of queued change notifications to observers
//!
//! There is no global instance: hosts build an [`Editor`], drive it with
//! [`Editor::frame`] and tear it down with [`Editor::shutdown`].

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::gizmo::{GizmoBinding, GizmoMode};
use super::inspector::{InspectorPanel, INSPECTOR_EVENTS};
use super::orbit::{OrbitControls, PanGesture};
use super::EditorResult;
use crate::camera::{CameraFollow, CameraView};
use crate::core::config::EditorConfig;
use crate::events::{EventType, SharedHandler};
use crate::foundation::math::{Vec2, Vec3};
use crate::input::{pick, EditorAction, InputEvent, KeyEvent, PointerEvent, PointerKind, PointerState};
use crate::render::{GizmoSurface, RenderBackend};
use crate::scene::{NodeFlags, NodeId, SceneError, SceneMirror};

/// Zoom change per wheel step
const WHEEL_ZOOM_STEP: f32 = 1.1;

/// What one call to [`Editor::frame`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Whether the renderer drew this frame
    pub rendered: bool,
    /// Change notifications delivered to observers
    pub dispatched: usize,
    /// Camera view pushed to the renderer
    pub view: CameraView,
}

/// Editor viewport core
pub struct Editor<B: RenderBackend + GizmoSurface> {
    config: EditorConfig,
    mirror: SceneMirror<B>,
    camera: CameraFollow,
    gizmo: GizmoBinding,
    pointer: PointerState,
    pan: PanGesture,
    inspector: Rc<RefCell<InspectorPanel>>,
    frame: u64,
}

impl<B: RenderBackend + GizmoSurface> Editor<B> {
    /// Build an editor around a renderer and orbit controls
    pub fn new(config: EditorConfig, backend: B, orbit: Box<dyn OrbitControls>) -> EditorResult<Self> {
        config.validate()?;
        log::info!("Initializing editor viewport...");

        let mut mirror = SceneMirror::new(backend, &config.scene);
        let inspector = Rc::new(RefCell::new(InspectorPanel::new()));
        let handler: SharedHandler = inspector.clone();
        mirror.events_mut().register_handler_for(&INSPECTOR_EVENTS, &handler);

        // Screen pixels map 1:1 onto logical units at zoom 1
        let pointer = PointerState::new(
            (config.camera.half_width * 2.0).round() as u32,
            (config.camera.half_height * 2.0).round() as u32,
        );

        Ok(Self {
            camera: CameraFollow::new(&config.camera),
            gizmo: GizmoBinding::new(&config.gizmo, orbit),
            mirror,
            pointer,
            pan: PanGesture::default(),
            inspector,
            frame: 0,
            config,
        })
    }

    /// Configuration the editor was built with
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The scene mirror
    pub fn mirror(&self) -> &SceneMirror<B> {
        &self.mirror
    }

    /// Mutable scene mirror, for building and editing the scene
    pub fn mirror_mut(&mut self) -> &mut SceneMirror<B> {
        &mut self.mirror
    }

    /// Camera follow controller
    pub fn camera(&self) -> &CameraFollow {
        &self.camera
    }

    /// Mutable camera follow controller
    pub fn camera_mut(&mut self) -> &mut CameraFollow {
        &mut self.camera
    }

    /// Selection and gizmo binding
    pub fn gizmo(&self) -> &GizmoBinding {
        &self.gizmo
    }

    /// Inspector panel state
    pub fn inspector(&self) -> Ref<'_, InspectorPanel> {
        self.inspector.borrow()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Register a read-only observer for some change notifications
    pub fn register_observer(&mut self, event_types: &[EventType], handler: &SharedHandler) {
        self.mirror.events_mut().register_handler_for(event_types, handler);
    }

    /// Run one tick
    ///
    /// A failing input does not stop the tick: later inputs, selection sync,
    /// the camera, rendering and dispatch all still run. The first input
    /// error is returned once the tick is complete.
    pub fn frame(&mut self, dt: f32, inputs: &[InputEvent]) -> EditorResult<FrameReport> {
        self.frame += 1;
        self.mirror.events_mut().update_frame(self.frame);

        let mut first_error = None;
        for input in inputs {
            if let Err(err) = self.handle_input(*input) {
                log::warn!("Frame {}: input {input:?} failed: {err}", self.frame);
                first_error.get_or_insert(err);
            }
        }

        self.gizmo.sync(&mut self.mirror);
        let view = self.camera.tick(dt, &mut self.mirror);

        let rendered = self.mirror.take_render_request();
        if rendered {
            self.mirror.backend_mut().render();
        }
        let dispatched = self.mirror.events_mut().dispatch();

        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(FrameReport {
            frame: self.frame,
            rendered,
            dispatched,
            view,
        })
    }

    fn handle_input(&mut self, input: InputEvent) -> EditorResult<()> {
        match input {
            InputEvent::Pointer(event) => self.handle_pointer(event)?,
            InputEvent::Key(KeyEvent { key, pressed: true }) => {
                if let Some(action) = EditorAction::from_key(key) {
                    self.apply_action(action);
                }
            }
            InputEvent::Key(_) => {}
            InputEvent::Wheel(steps) => {
                if self.gizmo.orbit().is_enabled() {
                    let zoom = self.camera.camera().zoom() * WHEEL_ZOOM_STEP.powf(steps);
                    self.camera.set_zoom(zoom);
                }
            }
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
        Ok(())
    }

    fn handle_pointer(&mut self, event: PointerEvent) -> EditorResult<()> {
        let screen = event.position;
        self.pointer.update_position(screen);

        match event.kind {
            PointerKind::Down => {
                let view = self.camera.view(self.mirror.converter());
                let logical = self.pointer.logical(&view, self.mirror.converter());

                match pick(&self.mirror, logical, screen) {
                    Some(hit) => {
                        self.gizmo.select(&mut self.mirror, hit)?;
                        self.gizmo.begin_drag(&mut self.mirror, screen)?;
                    }
                    None => {
                        self.gizmo.clear_selection(&mut self.mirror);
                        if self.gizmo.orbit().is_enabled() {
                            self.pan.begin(screen);
                        }
                    }
                }
            }
            PointerKind::Move => {
                if self.gizmo.is_dragging() {
                    let zoom = self.camera.camera().zoom();
                    self.gizmo.drag_to(&mut self.mirror, screen, zoom)?;
                } else if let Some(delta) = self.pan.update(screen) {
                    if self.gizmo.orbit().is_enabled() {
                        self.pan_by(delta);
                    }
                }
            }
            PointerKind::Up => {
                self.gizmo.end_drag(&mut self.mirror);
                self.pan.end();
            }
            PointerKind::Cancel => {
                self.gizmo.cancel_drag(&mut self.mirror);
                self.pan.end();
            }
        }
        Ok(())
    }

    fn pan_by(&mut self, screen_delta: Vec2) {
        let logical = -screen_delta / self.camera.camera().zoom();
        if self.camera.target().is_some() {
            let offset = self.camera.offset() + logical;
            self.camera.set_offset(offset);
        } else {
            let position = self.camera.position() + Vec3::new(logical.x, logical.y, 0.0);
            self.camera.camera_mut().set_position(position);
        }
    }

    fn apply_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::SetMode(mode) => self.set_gizmo_mode(mode),
            EditorAction::Cancel => {
                if !self.gizmo.cancel_drag(&mut self.mirror) {
                    self.gizmo.clear_selection(&mut self.mirror);
                }
            }
            EditorAction::DeleteSelected => {
                if let Some(selected) = self.gizmo.selected() {
                    self.destroy_node(selected);
                }
            }
            EditorAction::FocusSelected => {
                let target = self.gizmo.selected().and_then(|id| self.mirror.world_position(id).ok());
                if let Some(position) = target {
                    self.camera.snap_to(position);
                }
            }
        }
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {width}x{height}");
            return;
        }
        self.pointer.update_window_size(width, height);
        self.camera
            .set_viewport(Vec2::new(width as f32 * 0.5, height as f32 * 0.5));
        self.mirror.request_render();
    }

    /// Select a node
    pub fn select(&mut self, id: NodeId) -> EditorResult<()> {
        Ok(self.gizmo.select(&mut self.mirror, id)?)
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) -> bool {
        self.gizmo.clear_selection(&mut self.mirror)
    }

    /// Switch the gizmo mode
    pub fn set_gizmo_mode(&mut self, mode: GizmoMode) {
        self.gizmo.set_mode(&mut self.mirror, mode);
    }

    /// Follow a live node with the camera
    pub fn follow(&mut self, id: NodeId) -> EditorResult<()> {
        if !self.mirror.contains(id) {
            return Err(SceneError::NodeNotFound(id).into());
        }
        if !self.mirror.is_live(id) {
            return Err(SceneError::NodeNotLive(id).into());
        }
        if self.camera.set_target(Some(id)) {
            self.mirror.emit(EventType::CameraTargetChanged, id);
        }
        Ok(())
    }

    /// Follow the first live node flagged as a camera target
    pub fn follow_flagged(&mut self) -> Option<NodeId> {
        let target = self
            .mirror
            .nodes_with_flag(NodeFlags::CAMERA_TARGET)
            .into_iter()
            .find(|id| self.mirror.is_live(*id))?;
        self.follow(target).ok()?;
        Some(target)
    }

    /// Stop following
    pub fn unfollow(&mut self) {
        if self.camera.clear_target() {
            self.mirror.events_mut().emit(EventType::CameraTargetChanged);
        }
    }

    /// Shake the camera
    pub fn shake(&mut self, intensity: f32, duration: f32) {
        self.camera.shake(intensity, duration);
    }

    /// Destroy a node and its subtree, dropping the selection if it was inside
    pub fn destroy_node(&mut self, id: NodeId) -> bool {
        let destroyed = self.mirror.destroy(id);
        self.gizmo.sync(&mut self.mirror);
        destroyed
    }

    /// Detach a child, dropping the selection if it left the live scene
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> EditorResult<()> {
        self.mirror.remove_child(parent, child)?;
        self.gizmo.sync(&mut self.mirror);
        Ok(())
    }

    /// Rename a node; the inspector picks the change up on dispatch
    pub fn rename(&mut self, id: NodeId, name: &str) -> EditorResult<()> {
        Ok(self.mirror.rename(id, name)?)
    }

    /// Tear the scene down: drop the selection, restore controls, destroy everything
    pub fn shutdown(&mut self) {
        log::info!("Shutting down editor viewport after {} frames", self.frame);
        self.gizmo.cancel_drag(&mut self.mirror);
        self.gizmo.clear_selection(&mut self.mirror);
        self.camera.clear_target();
        self.pan.end();
        self.mirror.destroy_all();
        let flushed = self.mirror.events_mut().dispatch();
        log::debug!("Flushed {flushed} notifications during shutdown");
    }
}
