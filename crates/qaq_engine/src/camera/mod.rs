//! # Orthographic Viewport Camera
//!
//! The editor viewport looks at the 2D plane through an orthographic camera.
//! Its position lives in logical space (the same space node positions use);
//! [`CameraView`] is what gets handed to the renderer, already converted to
//! render space with absolute projection bounds.
//!
//! The follow controller that moves the camera every tick lives in [`follow`].

pub mod follow;

pub use follow::{CameraFollow, FollowState};

use crate::core::config::CameraSettings;
use crate::foundation::math::{Vec2, Vec3};
use crate::scene::CoordinateConverter;

/// Orthographic projection bounds in render space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoBounds {
    /// Left clipping plane
    pub left: f32,
    /// Right clipping plane
    pub right: f32,
    /// Top clipping plane (render space is Y-up)
    pub top: f32,
    /// Bottom clipping plane
    pub bottom: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl OrthoBounds {
    /// Visible width
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Visible height
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Centre of the visible rectangle
    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    /// Whether a render-space point falls inside the visible rectangle
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.bottom && point.y <= self.top
    }
}

/// Camera state handed to the renderer each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    /// Camera position in render space
    pub position: Vec3,
    /// Projection bounds in render space
    pub bounds: OrthoBounds,
}

/// Orthographic camera
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    position: Vec3,
    half_extents: Vec2,
    zoom: f32,
    near: f32,
    far: f32,
}

impl OrthoCamera {
    /// Create a camera at the logical origin from settings
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            position: Vec3::zeros(),
            half_extents: Vec2::new(settings.half_width, settings.half_height),
            zoom: settings.zoom,
            near: settings.near,
            far: settings.far,
        }
    }

    /// Camera position in logical space
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the camera
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Viewport half-size in logical units at zoom 1
    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Update the viewport half-size (window resize)
    pub fn set_half_extents(&mut self, half_extents: Vec2) {
        if half_extents.x > 0.0 && half_extents.y > 0.0 {
            self.half_extents = half_extents;
        } else {
            log::warn!("Ignoring non-positive viewport half-extents {:?}", half_extents);
        }
    }

    /// Current zoom factor
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor; values above one show less of the world
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            if (self.zoom - zoom).abs() > 0.01 {
                log::debug!("Camera zoom changed: {:.3} -> {:.3}", self.zoom, zoom);
            }
            self.zoom = zoom;
        } else {
            log::warn!("Ignoring invalid zoom {zoom}");
        }
    }

    /// Projection bounds for a render-space centre
    pub fn bounds_at(&self, center: Vec3) -> OrthoBounds {
        let half = self.half_extents / self.zoom;
        OrthoBounds {
            left: center.x - half.x,
            right: center.x + half.x,
            top: center.y + half.y,
            bottom: center.y - half.y,
            near: self.near,
            far: self.far,
        }
    }

    /// Render-space view centred on a logical point
    pub fn view_at(&self, logical_center: Vec3, converter: &CoordinateConverter) -> CameraView {
        let position = converter.position_to_render(logical_center, 0);
        CameraView {
            position,
            bounds: self.bounds_at(position),
        }
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}
