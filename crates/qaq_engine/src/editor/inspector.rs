//! Read-only inspector panel
//!
//! Mirrors the selected node's identity and position from change
//! notifications. A full refresh only happens when the `(node, name)` pair it
//! last synced changes, so rereading the same state never loops back into
//! another refresh.

use crate::events::{Event, EventHandler, EventType};
use crate::foundation::math::Vec3;
use crate::scene::NodeId;

/// Event types the panel listens to
pub const INSPECTOR_EVENTS: [EventType; 4] = [
    EventType::SelectionChanged,
    EventType::NodeRenamed,
    EventType::TransformChanged,
    EventType::NodeDestroyed,
];

/// Inspector state built purely from events
#[derive(Debug, Default)]
pub struct InspectorPanel {
    synced: Option<(NodeId, String)>,
    position: Option<Vec3>,
    refreshes: u32,
}

impl InspectorPanel {
    /// Empty panel
    pub fn new() -> Self {
        Self::default()
    }

    /// Node currently shown
    pub fn node(&self) -> Option<NodeId> {
        self.synced.as_ref().map(|(id, _)| *id)
    }

    /// Name currently shown
    pub fn name(&self) -> Option<&str> {
        self.synced.as_ref().map(|(_, name)| name.as_str())
    }

    /// Last position reported for the shown node
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }

    /// Number of full refreshes performed
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    fn sync(&mut self, key: Option<(NodeId, String)>) {
        if self.synced == key {
            return;
        }
        log::trace!("Inspector refresh: {:?}", key);
        if key.as_ref().map(|(id, _)| *id) != self.node() {
            self.position = None;
        }
        self.synced = key;
        self.refreshes += 1;
    }
}

impl EventHandler for InspectorPanel {
    fn on_event(&mut self, event: &Event) -> bool {
        match event.event_type {
            EventType::SelectionChanged => {
                let key = event
                    .get_node()
                    .map(|id| (id, event.get_name().unwrap_or_default().to_string()));
                self.sync(key);
            }
            EventType::NodeRenamed => {
                if let (Some(id), Some(name)) = (event.get_node(), event.get_name()) {
                    if self.node() == Some(id) {
                        self.sync(Some((id, name.to_string())));
                    }
                }
            }
            EventType::TransformChanged => {
                if event.get_node().is_some() && event.get_node() == self.node() {
                    self.position = event.get_position();
                }
            }
            EventType::NodeDestroyed => {
                if event.get_node().is_some() && event.get_node() == self.node() {
                    self.sync(None);
                }
            }
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventArg;
    use crate::render::RetainedScene;
    use crate::scene::SceneMirror;

    fn selection(id: NodeId, name: &str) -> Event {
        Event::new(EventType::SelectionChanged, 0)
            .with_node(id)
            .with_arg("name", EventArg::Name(name.to_string()))
    }

    #[test]
    fn test_refresh_only_when_key_changes() {
        let mut scene = SceneMirror::with_backend(RetainedScene::new());
        let a = scene.create_node("a");
        let mut panel = InspectorPanel::new();

        panel.on_event(&selection(a, "a"));
        panel.on_event(&selection(a, "a"));
        assert_eq!(panel.refreshes(), 1);
        assert_eq!(panel.name(), Some("a"));

        let rename = Event::new(EventType::NodeRenamed, 1)
            .with_node(a)
            .with_arg("name", EventArg::Name("hero".to_string()));
        panel.on_event(&rename);
        panel.on_event(&rename);
        assert_eq!(panel.refreshes(), 2);
        assert_eq!(panel.name(), Some("hero"));
    }

    #[test]
    fn test_tracks_position_of_shown_node_only() {
        let mut scene = SceneMirror::with_backend(RetainedScene::new());
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let mut panel = InspectorPanel::new();
        panel.on_event(&selection(a, "a"));

        let moved = |id, x| {
            Event::new(EventType::TransformChanged, 2)
                .with_node(id)
                .with_arg("position", EventArg::Position(Vec3::new(x, 0.0, 0.0)))
        };
        panel.on_event(&moved(b, 9.0));
        assert_eq!(panel.position(), None);
        panel.on_event(&moved(a, 3.0));
        assert_eq!(panel.position(), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(panel.refreshes(), 1);

        panel.on_event(&Event::new(EventType::SelectionChanged, 3));
        assert_eq!(panel.node(), None);
        assert_eq!(panel.position(), None);
    }
}
