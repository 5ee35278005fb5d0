//! Viewport orbit (pan/zoom) controls
//!
//! In a 2D viewport "orbit" means dragging the empty background to pan and
//! scrolling to zoom. The gizmo binding switches these off while a handle drag
//! runs; the editor host only pans when they are enabled.

use crate::foundation::math::Vec2;

/// Competing pointer consumer the gizmo binding can switch off
pub trait OrbitControls {
    /// Enable or disable the controls
    fn set_enabled(&mut self, enabled: bool);

    /// Whether the controls currently react to input
    fn is_enabled(&self) -> bool;
}

/// Enable flag for the viewport's pan/zoom controls
#[derive(Debug, Clone)]
pub struct OrbitState {
    enabled: bool,
    toggles: u32,
}

impl OrbitState {
    /// Enabled controls with no pan in progress
    pub fn new() -> Self {
        Self {
            enabled: true,
            toggles: 0,
        }
    }

    /// Number of enable/disable transitions seen
    pub fn toggles(&self) -> u32 {
        self.toggles
    }
}

impl Default for OrbitState {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitControls for OrbitState {
    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.toggles += 1;
            log::trace!("Orbit controls {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Background pan tracker used by the editor host
///
/// Kept separate from [`OrbitControls`] so any implementation of the trait can
/// be plugged in while panning itself stays in the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanGesture {
    anchor: Option<Vec2>,
}

impl PanGesture {
    /// Start panning at a screen position
    pub fn begin(&mut self, screen: Vec2) {
        self.anchor = Some(screen);
    }

    /// Screen-space movement since the last call, if panning
    pub fn update(&mut self, screen: Vec2) -> Option<Vec2> {
        let anchor = self.anchor.as_mut()?;
        let delta = screen - *anchor;
        *anchor = screen;
        Some(delta)
    }

    /// Stop panning
    pub fn end(&mut self) -> bool {
        self.anchor.take().is_some()
    }

    /// Whether a pan is in progress
    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }
}
