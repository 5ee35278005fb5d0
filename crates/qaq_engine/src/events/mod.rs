//! Change-notification events
//!
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Queued delivery: writers enqueue during the tick, observers run once per frame
//!
//! Observers receive `&Event` only. They have no path back into the scene, so a
//! handler reacting to a change can never re-trigger that change.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::editor::gizmo::GizmoMode;
use crate::foundation::math::Vec3;
use crate::scene::NodeId;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A node was allocated
    NodeCreated,
    /// A node (and its visual object) entered the live scene
    NodeAttached,
    /// A node left the live scene and released its visual object
    NodeDetached,
    /// A node was destroyed
    NodeDestroyed,
    /// A node's name changed
    NodeRenamed,
    /// A node's position, rotation, scale or layer changed
    TransformChanged,
    /// A node's visibility flag changed
    VisibilityChanged,
    /// A parent/child link was added or removed
    HierarchyChanged,
    /// The selected node changed (argument absent when cleared)
    SelectionChanged,
    /// The gizmo interaction mode changed
    GizmoModeChanged,
    /// A gizmo drag started
    DragStarted,
    /// A gizmo drag was committed
    DragEnded,
    /// A gizmo drag was cancelled and the transform restored
    DragCancelled,
    /// The camera follow target changed
    CameraTargetChanged,
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Node identifier
    Node(NodeId),
    /// Name text
    Name(String),
    /// Position in logical space
    Position(Vec3),
    /// Visibility flag
    Visible(bool),
    /// Gizmo mode
    Mode(GizmoMode),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Frame in which the event was raised
    pub frame: u64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type and frame stamp
    pub fn new(event_type: EventType, frame: u64) -> Self {
        Self {
            event_type,
            frame,
            args: HashMap::new(),
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Attach an argument in place (used with [`EventSystem::emit`])
    pub fn arg(&mut self, key: &'static str, value: EventArg) -> &mut Self {
        self.args.insert(key, value);
        self
    }

    /// Shorthand for attaching the `node` argument
    pub fn with_node(self, node: NodeId) -> Self {
        self.with_arg("node", EventArg::Node(node))
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get node argument if present
    pub fn get_node(&self) -> Option<NodeId> {
        if let Some(EventArg::Node(id)) = self.get_arg("node") {
            Some(*id)
        } else {
            None
        }
    }

    /// Get name argument if present
    pub fn get_name(&self) -> Option<&str> {
        if let Some(EventArg::Name(name)) = self.get_arg("name") {
            Some(name)
        } else {
            None
        }
    }

    /// Get position argument if present
    pub fn get_position(&self) -> Option<Vec3> {
        if let Some(EventArg::Position(position)) = self.get_arg("position") {
            Some(*position)
        } else {
            None
        }
    }

    /// Get visibility argument if present
    pub fn get_visible(&self) -> Option<bool> {
        if let Some(EventArg::Visible(visible)) = self.get_arg("visible") {
            Some(*visible)
        } else {
            None
        }
    }

    /// Get gizmo mode argument if present
    pub fn get_mode(&self) -> Option<GizmoMode> {
        if let Some(EventArg::Mode(mode)) = self.get_arg("mode") {
            Some(*mode)
        } else {
            None
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

/// Shared handle to a registered observer
pub type SharedHandler = Rc<RefCell<dyn EventHandler>>;

/// Event queue with per-type handler registration
/// Follows chain of responsibility pattern
pub struct EventSystem {
    queue: Vec<Event>,
    handlers: HashMap<EventType, Vec<SharedHandler>>,
    current_frame: u64,
    max_pending: usize,
}

/// Queue length at which the oldest undispatched events start being dropped
pub const DEFAULT_MAX_PENDING: usize = 4096;

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            handlers: HashMap::new(),
            current_frame: 0,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }

    /// Cap the number of undispatched events (at least 1)
    ///
    /// A queue that reaches the cap drops its oldest half, so an owner that
    /// never dispatches holds bounded memory.
    pub fn set_max_pending(&mut self, max_pending: usize) {
        self.max_pending = max_pending.max(1);
        self.trim();
    }

    /// Current cap on undispatched events
    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    fn trim(&mut self) {
        if self.queue.len() < self.max_pending {
            return;
        }
        let dropped = (self.queue.len() + 1 - self.max_pending).max(self.max_pending / 2);
        log::warn!("Event queue full; dropping {dropped} undispatched events");
        self.queue.drain(..dropped);
    }

    /// Set the frame stamp used for events raised from now on
    pub fn update_frame(&mut self, frame: u64) {
        self.current_frame = frame;
    }

    /// Current frame stamp
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Register a handler for a specific event type
    /// Only handlers registered for this type will be notified
    pub fn register_handler(&mut self, event_type: EventType, handler: SharedHandler) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Register one handler for several event types
    pub fn register_handler_for(&mut self, event_types: &[EventType], handler: &SharedHandler) {
        for event_type in event_types {
            self.register_handler(*event_type, Rc::clone(handler));
        }
    }

    /// Queue an event stamped with the current frame
    pub fn emit(&mut self, event_type: EventType) -> &mut Event {
        self.trim();
        self.queue.push(Event::new(event_type, self.current_frame));
        let last = self.queue.len() - 1;
        &mut self.queue[last]
    }

    /// Queue a prepared event
    pub fn send(&mut self, event: Event) {
        self.trim();
        self.queue.push(event);
    }

    /// Number of events waiting for dispatch
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Events waiting for dispatch, oldest first
    pub fn queued(&self) -> &[Event] {
        &self.queue
    }

    /// Dispatch all pending events in the order they were raised
    pub fn dispatch(&mut self) -> usize {
        let queued = std::mem::take(&mut self.queue);
        let count = queued.len();
        for event in &queued {
            self.dispatch_event(event);
        }
        count
    }

    /// Dispatch single event to registered handlers
    /// Stops on first handler that returns true (consumed)
    fn dispatch_event(&self, event: &Event) {
        if let Some(handlers) = self.handlers.get(&event.event_type) {
            for handler in handlers {
                if handler.borrow_mut().on_event(event) {
                    break;
                }
            }
        }
    }

    /// Clear all queued events (useful for state transitions)
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
