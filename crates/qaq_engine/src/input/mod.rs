//! Viewport input
//!
//! Hosts translate their windowing events into [`InputEvent`]s and hand a
//! batch to the editor once per frame. Keys map onto [`EditorAction`]s using
//! the usual transform-handle shortcuts.

pub mod picking;

pub use picking::{pick, screen_to_logical, PointerState};

use crate::editor::gizmo::GizmoMode;
use crate::foundation::math::Vec2;

/// Keys the viewport reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// W key
    W,
    /// E key
    E,
    /// R key
    R,
    /// Q key
    Q,
    /// F key
    F,
    /// Escape key
    Escape,
    /// Delete key
    Delete,
    /// Any key without a binding
    Other,
}

/// Key press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key
    pub key: KeyCode,
    /// `true` on press, `false` on release
    pub pressed: bool,
}

/// Pointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Primary button pressed
    Down,
    /// Pointer moved
    Move,
    /// Primary button released
    Up,
    /// Gesture aborted by the platform (focus loss, capture lost)
    Cancel,
}

/// Pointer event in screen pixels (origin top-left, Y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Phase
    pub kind: PointerKind,
    /// Position in screen pixels
    pub position: Vec2,
}

impl PointerEvent {
    /// Pointer event at `(x, y)`
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: Vec2::new(x, y),
        }
    }
}

/// Input consumed by the editor frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer event
    Pointer(PointerEvent),
    /// Keyboard event
    Key(KeyEvent),
    /// Scroll wheel; positive zooms in
    Wheel(f32),
    /// Viewport resized to a new size in pixels
    Resize {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
}

/// Editor command bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Switch the gizmo mode
    SetMode(GizmoMode),
    /// Cancel the running drag, or clear the selection when idle
    Cancel,
    /// Destroy the selected node
    DeleteSelected,
    /// Snap the camera onto the selected node
    FocusSelected,
}

impl EditorAction {
    /// Action bound to a key press, if any
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::W => Some(Self::SetMode(GizmoMode::Translate)),
            KeyCode::E => Some(Self::SetMode(GizmoMode::Rotate)),
            KeyCode::R => Some(Self::SetMode(GizmoMode::Scale)),
            KeyCode::Q => Some(Self::SetMode(GizmoMode::None)),
            KeyCode::Escape => Some(Self::Cancel),
            KeyCode::Delete => Some(Self::DeleteSelected),
            KeyCode::F => Some(Self::FocusSelected),
            KeyCode::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(EditorAction::from_key(KeyCode::W), Some(EditorAction::SetMode(GizmoMode::Translate)));
        assert_eq!(EditorAction::from_key(KeyCode::Q), Some(EditorAction::SetMode(GizmoMode::None)));
        assert_eq!(EditorAction::from_key(KeyCode::Escape), Some(EditorAction::Cancel));
        assert_eq!(EditorAction::from_key(KeyCode::Other), None);
    }
}
