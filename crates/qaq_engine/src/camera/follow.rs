//! Camera follow controller
//!
//! Exponential smoothing toward a target node:
//!
//! ```text
//! factor   = clamp(follow_speed * dt, 0, 1)
//! position = position + (target + offset - position) * factor
//! ```
//!
//! Clamping the factor keeps a long frame (a stall, a breakpoint) from flinging
//! the camera past its target. The projection bounds are recomputed on every
//! tick, whether or not the camera moved.
//!
//! A shake overlay adds a decaying random offset to the presented centre only;
//! the smoothed base position is never disturbed.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CameraView, OrthoCamera};
use crate::core::config::CameraSettings;
use crate::events::EventType;
use crate::foundation::math::{utils, Vec2, Vec3};
use crate::render::RenderBackend;
use crate::scene::{CoordinateConverter, NodeId, SceneMirror};

/// Follow state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    /// No target; the camera holds its position
    Idle,
    /// Tracking a node
    Following(NodeId),
}

#[derive(Debug, Clone, Copy)]
struct Shake {
    intensity: f32,
    remaining: f32,
    duration: f32,
}

/// Smoothed camera controller owning the viewport camera
pub struct CameraFollow {
    camera: OrthoCamera,
    state: FollowState,
    follow_speed: f32,
    offset: Vec2,
    shake: Option<Shake>,
    shake_offset: Vec2,
    rng: StdRng,
    last_view: Option<CameraView>,
}

impl CameraFollow {
    /// Create an idle controller from settings
    pub fn new(settings: &CameraSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Create an idle controller with a specific shake RNG
    pub fn with_rng(settings: &CameraSettings, rng: StdRng) -> Self {
        Self {
            camera: OrthoCamera::new(settings),
            state: FollowState::Idle,
            follow_speed: settings.follow_speed.max(0.0),
            offset: Vec2::zeros(),
            shake: None,
            shake_offset: Vec2::zeros(),
            rng,
            last_view: None,
        }
    }

    /// Current state
    pub fn state(&self) -> FollowState {
        self.state
    }

    /// Node being followed
    pub fn target(&self) -> Option<NodeId> {
        match self.state {
            FollowState::Idle => None,
            FollowState::Following(id) => Some(id),
        }
    }

    /// Start following a node, or stop with `None`
    ///
    /// Returns whether the target changed.
    pub fn set_target(&mut self, target: Option<NodeId>) -> bool {
        let next = target.map_or(FollowState::Idle, FollowState::Following);
        if next == self.state {
            return false;
        }
        log::debug!("Camera follow: {:?} -> {:?}", self.state, next);
        self.state = next;
        true
    }

    /// Stop following
    pub fn clear_target(&mut self) -> bool {
        self.set_target(None)
    }

    /// Interpolation factor per second
    pub fn follow_speed(&self) -> f32 {
        self.follow_speed
    }

    /// Change the interpolation factor per second (negative values become zero)
    pub fn set_follow_speed(&mut self, follow_speed: f32) {
        self.follow_speed = follow_speed.max(0.0);
    }

    /// Logical offset kept between camera and target
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Set the logical offset kept between camera and target
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// The controlled camera
    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    /// Mutable access to the camera (zoom, viewport size)
    pub fn camera_mut(&mut self) -> &mut OrthoCamera {
        &mut self.camera
    }

    /// Smoothed camera position in logical space (without shake)
    pub fn position(&self) -> Vec3 {
        self.camera.position()
    }

    /// Jump straight onto a point, keeping the follow offset
    pub fn snap_to(&mut self, point: Vec3) {
        self.camera.set_position(point + self.offset.push(0.0));
    }

    /// Set the camera zoom; invalid values are ignored
    pub fn set_zoom(&mut self, zoom: f32) {
        self.camera.set_zoom(zoom);
    }

    /// Set the viewport half-size in logical units
    pub fn set_viewport(&mut self, half_extents: Vec2) {
        self.camera.set_half_extents(half_extents);
    }

    /// Jump straight onto the current target without smoothing
    ///
    /// Returns `false` when idle or when the target is not in the live scene.
    pub fn snap_to_target<B: RenderBackend>(&mut self, mirror: &SceneMirror<B>) -> bool {
        let Some(target) = self.target() else {
            return false;
        };
        if !mirror.is_live(target) {
            return false;
        }
        match mirror.world_position(target) {
            Ok(position) => {
                self.snap_to(position);
                true
            }
            Err(_) => false,
        }
    }

    /// Start a shake; a new shake replaces a running one
    pub fn shake(&mut self, intensity: f32, duration: f32) {
        if intensity > 0.0 && duration > 0.0 {
            self.shake = Some(Shake { intensity, remaining: duration, duration });
        } else {
            log::warn!("Ignoring shake with intensity {intensity} and duration {duration}");
        }
    }

    /// Whether a shake is running
    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// Offset currently added by the shake overlay
    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    /// Interpolation weight for a frame of length `dt`, always within [0, 1]
    pub fn follow_factor(&self, dt: f32) -> f32 {
        utils::clamp(self.follow_speed * dt, 0.0, 1.0)
    }

    /// Advance smoothing and shake by `dt` toward an already-resolved target
    ///
    /// Returns the presented centre (smoothed position plus shake offset).
    pub fn step(&mut self, dt: f32, target: Option<Vec3>) -> Vec3 {
        if let Some(target) = target {
            let goal = target + self.offset.push(0.0);
            let position = self.camera.position();
            let factor = self.follow_factor(dt);
            self.camera
                .set_position(position.zip_map(&goal, |from, to| utils::lerp(from, to, factor)));
        }
        self.advance_shake(dt);
        self.camera.position() + self.shake_offset.push(0.0)
    }

    fn advance_shake(&mut self, dt: f32) {
        let Some(mut shake) = self.shake else {
            self.shake_offset = Vec2::zeros();
            return;
        };

        shake.remaining = (shake.remaining - dt.max(0.0)).max(0.0);
        if shake.remaining <= 0.0 {
            self.shake = None;
            self.shake_offset = Vec2::zeros();
            return;
        }

        let magnitude = shake.intensity * shake.remaining / shake.duration;
        let angle = self.rng.gen_range(0.0..TAU);
        self.shake_offset = Vec2::new(angle.cos(), angle.sin()) * magnitude;
        self.shake = Some(shake);
    }

    /// Render-space view for the current presented centre
    pub fn view(&self, converter: &CoordinateConverter) -> CameraView {
        self.camera
            .view_at(self.camera.position() + self.shake_offset.push(0.0), converter)
    }

    /// One frame: resolve the target, smooth, push the view to the renderer
    ///
    /// A target that was destroyed or left the live scene drops the
    /// controller back to [`FollowState::Idle`].
    pub fn tick<B: RenderBackend>(&mut self, dt: f32, mirror: &mut SceneMirror<B>) -> CameraView {
        let target = match self.state {
            FollowState::Idle => None,
            FollowState::Following(id) => {
                let resolved = if mirror.is_live(id) { mirror.world_position(id).ok() } else { None };
                if resolved.is_none() {
                    log::warn!("Camera target {id:?} left the scene; camera is now idle");
                    self.state = FollowState::Idle;
                    mirror.events_mut().emit(EventType::CameraTargetChanged);
                }
                resolved
            }
        };

        self.step(dt, target);
        let view = self.view(mirror.converter());
        mirror.backend_mut().set_camera(&view);
        if self.last_view != Some(view) {
            self.last_view = Some(view);
            mirror.request_render();
        }
        view
    }
}
