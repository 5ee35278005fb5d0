//! Scene Mirror - keeps the logical node tree and the renderer's object tree
//! structurally identical.
//!
//! Every mutation is applied to the renderer before the call returns; there is
//! no deferred sync pass. The mirror is the only writer of the renderer graph,
//! raises a change notification for each mutation, and sets a render request
//! flag the frame host consumes once per tick.
//!
//! Notifications wait in the mirror's event queue until someone calls
//! `events_mut().dispatch()` or `clear()`. The editor host does this every
//! frame; a mirror driven on its own must do the same. The queue is capped
//! (see [`EventSystem::set_max_pending`]) and drops its oldest entries when
//! nobody drains it.

use slotmap::SlotMap;

use super::coords::{CoordinateConverter, RenderLayer};
use super::error::{HierarchyViolation, SceneError, SceneResult};
use super::node::{Node, NodeDesc, NodeFlags, NodeId};
use crate::core::config::SceneSettings;
use crate::events::{Event, EventArg, EventSystem, EventType};
use crate::foundation::math::{Quat, Transform, Vec2, Vec3};
use crate::render::{ObjectHandle, RenderBackend};

/// Logical scene tree mirrored onto a retained renderer
pub struct SceneMirror<B: RenderBackend> {
    nodes: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
    backend: B,
    converter: CoordinateConverter,
    events: EventSystem,
    needs_render: bool,
}

impl<B: RenderBackend> SceneMirror<B> {
    /// Create an empty mirror driving `backend`
    pub fn new(backend: B, settings: &SceneSettings) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            backend,
            converter: CoordinateConverter::new(settings.layer_spacing),
            events: EventSystem::new(),
            needs_render: false,
        }
    }

    /// Create a mirror with default scene settings
    pub fn with_backend(backend: B) -> Self {
        Self::new(backend, &SceneSettings::default())
    }

    // ------------------------------------------------------------------
    // Allocation and queries
    // ------------------------------------------------------------------

    /// Allocate a dormant node with default parameters
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node_with(NodeDesc::new(name))
    }

    /// Allocate a dormant node from a description
    pub fn create_node_with(&mut self, desc: NodeDesc) -> NodeId {
        let name = desc.name.clone();
        let id = self.nodes.insert(Node::from_desc(desc));
        log::debug!("Created node {id:?} '{name}'");
        self.emit(EventType::NodeCreated, id).arg("name", EventArg::Name(name));
        id
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut Node> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Whether `id` names an existing node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of existing nodes (live and dormant)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no nodes exist
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Live scene roots in attach order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of a node in insertion order
    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.node(id)?.parent())
    }

    /// Whether the node exists and owns a visual object
    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_live)
    }

    /// Visual object owned by a node
    pub fn visual_of(&self, id: NodeId) -> Option<ObjectHandle> {
        self.nodes.get(id).and_then(Node::visual)
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(_, node)| node.name() == name).map(|(id, _)| id)
    }

    /// O(1) capability lookup; unknown ids have no capabilities
    pub fn has_flag(&self, id: NodeId, flag: NodeFlags) -> bool {
        self.nodes.get(id).is_some_and(|node| node.has_flag(flag))
    }

    /// All nodes carrying a capability
    pub fn nodes_with_flag(&self, flag: NodeFlags) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.has_flag(flag))
            .map(|(id, _)| id)
            .collect()
    }

    /// Live nodes in depth-first pre-order, roots in attach order
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                order.push(current);
                stack.extend(node.children().iter().rev().copied());
            }
        }
        order
    }

    /// Composed transform of a node in logical world space
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Transform> {
        let mut chain = vec![self.node(id)?.transform()];
        let mut cursor = self.node(id)?.parent();
        while let Some(ancestor) = cursor {
            let node = self.node(ancestor)?;
            chain.push(node.transform());
            cursor = node.parent();
        }
        Ok(chain
            .into_iter()
            .rev()
            .fold(Transform::identity(), |world, local| world.combine(local)))
    }

    /// Position of a node in logical world space
    pub fn world_position(&self, id: NodeId) -> SceneResult<Vec3> {
        Ok(self.world_transform(id)?.position)
    }

    /// Converter used for every transform pushed to the renderer
    pub fn converter(&self) -> &CoordinateConverter {
        &self.converter
    }

    /// The renderer being driven
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the renderer (camera, gizmo, draw calls)
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Pending change notifications
    pub fn events(&self) -> &EventSystem {
        &self.events
    }

    /// Change notification queue and observer registry
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    pub(crate) fn emit(&mut self, event_type: EventType, id: NodeId) -> &mut Event {
        self.events.emit(event_type).arg("node", EventArg::Node(id))
    }

    // ------------------------------------------------------------------
    // Render request flag
    // ------------------------------------------------------------------

    /// Ask for a frame to be drawn at the end of this tick
    pub fn request_render(&mut self) {
        self.needs_render = true;
    }

    /// Whether a frame has been requested
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Consume the render request
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Make a parentless node a live scene root
    pub fn attach_root(&mut self, id: NodeId) -> SceneResult<()> {
        let node = self.node(id)?;
        if let Some(parent) = node.parent() {
            return Err(SceneError::InvalidHierarchy {
                parent: Some(parent),
                child: id,
                reason: HierarchyViolation::AlreadyParented(parent),
            });
        }
        if node.is_root() {
            return Err(SceneError::InvalidHierarchy {
                parent: None,
                child: id,
                reason: HierarchyViolation::SceneRoot,
            });
        }

        self.node_mut(id)?.is_root = true;
        self.roots.push(id);
        self.go_live(id, None);
        self.request_render();
        log::info!("Attached scene root {id:?}");
        Ok(())
    }

    /// Take a scene root out of the live scene, keeping its subtree
    pub fn detach_root(&mut self, id: NodeId) -> SceneResult<()> {
        if !self.node(id)?.is_root() {
            return Err(SceneError::NotARoot(id));
        }
        self.go_dormant(id);
        self.roots.retain(|root| *root != id);
        self.node_mut(id)?.is_root = false;
        self.request_render();
        log::info!("Detached scene root {id:?}");
        Ok(())
    }

    /// Append `child` under `parent`; a live parent brings the whole subtree live
    ///
    /// Rejected changes leave both trees untouched.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.check_attach(parent, child)?;

        let parent_node = self.node_mut(parent)?;
        parent_node.children.push(child);
        let parent_object = parent_node.visual;
        self.node_mut(child)?.parent = Some(parent);

        if let Some(parent_object) = parent_object {
            self.go_live(child, Some(parent_object));
            self.request_render();
        }
        log::debug!("Added {child:?} under {parent:?}");
        self.emit(EventType::HierarchyChanged, child)
            .arg("parent", EventArg::Node(parent));
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let violation = |reason| SceneError::InvalidHierarchy { parent: Some(parent), child, reason };
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if parent == child {
            return Err(violation(HierarchyViolation::SelfParent));
        }
        match child_node.parent() {
            Some(existing) if existing == parent => return Err(violation(HierarchyViolation::AlreadyChild)),
            Some(existing) => return Err(violation(HierarchyViolation::AlreadyParented(existing))),
            None => {}
        }

        // Meeting the child on the way up from the parent means the link closes a cycle
        let mut cursor = parent_node.parent();
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(violation(HierarchyViolation::Cycle));
            }
            cursor = self.nodes.get(ancestor).and_then(Node::parent);
        }

        if child_node.is_root() {
            return Err(violation(HierarchyViolation::SceneRoot));
        }
        Ok(())
    }

    /// Unlink `child` from `parent`; the child keeps its own subtree
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(child)?;
        if !self.node(parent)?.children().contains(&child) {
            return Err(SceneError::NotAChild { parent, child });
        }

        let was_live = self.is_live(child);
        self.go_dormant(child);
        self.node_mut(parent)?.children.retain(|c| *c != child);
        self.node_mut(child)?.parent = None;

        if was_live {
            self.request_render();
        }
        log::debug!("Removed {child:?} from {parent:?}");
        self.emit(EventType::HierarchyChanged, child);
        Ok(())
    }

    /// Destroy a node and its whole subtree, children first
    ///
    /// Returns `false` when the node was already gone; a second call is a no-op.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            log::trace!("destroy: {id:?} already gone");
            return false;
        };
        let parent = node.parent();
        let was_root = node.is_root();
        let was_live = node.is_live();

        for current in self.post_order(id) {
            self.release_visual(current);
            if let Some(node) = self.nodes.remove(current) {
                self.emit(EventType::NodeDestroyed, current)
                    .arg("name", EventArg::Name(node.name().to_string()));
            }
        }

        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|c| *c != id);
            }
            self.emit(EventType::HierarchyChanged, id);
        }
        if was_root {
            self.roots.retain(|root| *root != id);
        }
        if was_live {
            self.request_render();
        }
        log::debug!("Destroyed {id:?}");
        true
    }

    /// Destroy every node, live or dormant
    pub fn destroy_all(&mut self) {
        let tops: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.parent().is_none())
            .map(|(id, _)| id)
            .collect();
        for id in tops {
            self.destroy(id);
        }
    }

    /// Create and register visual objects for a subtree, parents before children
    fn go_live(&mut self, id: NodeId, parent_object: Option<ObjectHandle>) {
        let mut stack = vec![(id, parent_object)];
        while let Some((current, parent_object)) = stack.pop() {
            let Some(node) = self.nodes.get(current) else { continue };
            let object = self.backend.create_object(node.name());
            self.backend.set_transform(object, &node.render_transform(&self.converter));
            self.backend.set_visible(object, node.visible());
            self.backend.add(parent_object, object);
            stack.extend(node.children().iter().rev().map(|child| (*child, Some(object))));

            if let Some(node) = self.nodes.get_mut(current) {
                node.visual = Some(object);
            }
            log::trace!("{current:?} entered the scene as {object:?}");
            self.emit(EventType::NodeAttached, current);
        }
    }

    /// Remove and release the visual objects of a subtree, children first
    fn go_dormant(&mut self, id: NodeId) {
        for current in self.post_order(id) {
            if self.release_visual(current) {
                self.emit(EventType::NodeDetached, current);
            }
        }
    }

    fn release_visual(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(id) else { return false };
        let Some(object) = node.visual() else { return false };
        let parent_object = node
            .parent()
            .and_then(|parent| self.nodes.get(parent))
            .and_then(Node::visual);

        self.backend.remove(parent_object, object);
        self.backend.release(object);
        if let Some(node) = self.nodes.get_mut(id) {
            node.visual = None;
        }
        log::trace!("{id:?} left the scene, released {object:?}");
        true
    }

    /// Subtree of `id` with every node after all of its descendants
    fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                order.push(current);
                stack.extend(node.children().iter().copied());
            }
        }
        order.reverse();
        order
    }

    // ------------------------------------------------------------------
    // Node state
    // ------------------------------------------------------------------

    /// Set the local position
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> SceneResult<()> {
        self.node_mut(id)?.transform_mut().position = position;
        self.sync_transform(id);
        Ok(())
    }

    /// Set the local 2D position, keeping depth
    pub fn set_position_2d(&mut self, id: NodeId, position: Vec2) -> SceneResult<()> {
        let transform = self.node_mut(id)?.transform_mut();
        transform.position.x = position.x;
        transform.position.y = position.y;
        self.sync_transform(id);
        Ok(())
    }

    /// Set the local rotation
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) -> SceneResult<()> {
        self.node_mut(id)?.transform_mut().rotation = rotation;
        self.sync_transform(id);
        Ok(())
    }

    /// Set the local scale
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> SceneResult<()> {
        self.node_mut(id)?.transform_mut().scale = scale;
        self.sync_transform(id);
        Ok(())
    }

    /// Replace the whole local transform
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> SceneResult<()> {
        *self.node_mut(id)?.transform_mut() = transform;
        self.sync_transform(id);
        Ok(())
    }

    /// Move a node to another layer slot
    pub fn set_layer(&mut self, id: NodeId, layer: RenderLayer, z_order: i32) -> SceneResult<()> {
        self.node_mut(id)?.set_layer(layer, z_order);
        self.sync_transform(id);
        Ok(())
    }

    /// Show or hide a node
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> SceneResult<()> {
        let node = self.node_mut(id)?;
        if node.visible() == visible {
            return Ok(());
        }
        node.set_visible(visible);
        match node.visual() {
            Some(object) => {
                self.backend.set_visible(object, visible);
                self.request_render();
            }
            None => log::trace!("{id:?} is dormant; visibility kept until it enters the scene"),
        }
        self.emit(EventType::VisibilityChanged, id)
            .arg("visible", EventArg::Visible(visible));
        Ok(())
    }

    /// Rename a node
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> SceneResult<()> {
        let name = name.into();
        let node = self.node_mut(id)?;
        if node.name() == name {
            return Ok(());
        }
        node.set_name(name.clone());
        if let Some(object) = node.visual() {
            self.backend.set_name(object, &name);
        }
        self.emit(EventType::NodeRenamed, id).arg("name", EventArg::Name(name));
        Ok(())
    }

    fn sync_transform(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else { return };
        let position = node.position();
        match node.visual() {
            Some(object) => {
                self.backend.set_transform(object, &node.render_transform(&self.converter));
                self.needs_render = true;
            }
            None => log::trace!("{id:?} is dormant; transform kept until it enters the scene"),
        }
        self.emit(EventType::TransformChanged, id)
            .arg("position", EventArg::Position(position));
    }

    // ------------------------------------------------------------------
    // Invariant check
    // ------------------------------------------------------------------

    /// Check that the renderer tree matches the node tree exactly
    pub fn verify_mirror(&self) -> SceneResult<()> {
        let mismatch = |message: String| SceneError::MirrorMismatch(message);

        let expected_roots = self
            .roots
            .iter()
            .map(|root| self.visual_of(*root))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| mismatch("a scene root has no visual object".to_string()))?;
        let actual_roots = self.backend.children_of(None);
        if actual_roots != expected_roots {
            return Err(mismatch(format!(
                "scene root holds {actual_roots:?}, expected {expected_roots:?}"
            )));
        }

        for (id, node) in &self.nodes {
            match node.visual() {
                Some(object) => {
                    let expected = node
                        .children()
                        .iter()
                        .map(|child| self.visual_of(*child))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| mismatch(format!("live node {id:?} has a dormant child")))?;
                    let actual = self.backend.children_of(Some(object));
                    if actual != expected {
                        return Err(mismatch(format!(
                            "{id:?} object holds {actual:?}, expected {expected:?}"
                        )));
                    }
                }
                None => {
                    if node.is_root() {
                        return Err(mismatch(format!("root {id:?} has no visual object")));
                    }
                    if node.parent().is_some_and(|parent| self.is_live(parent)) {
                        return Err(mismatch(format!("{id:?} is dormant under a live parent")));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RetainedScene;
    use approx::assert_relative_eq;

    fn mirror() -> SceneMirror<RetainedScene> {
        SceneMirror::with_backend(RetainedScene::new())
    }

    #[test]
    fn test_attach_root_creates_visual() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        assert!(!scene.is_live(root));

        scene.attach_root(root).unwrap();
        assert!(scene.is_live(root));
        assert_eq!(scene.backend().children_of(None), vec![scene.visual_of(root).unwrap()]);
        assert!(scene.take_render_request());
        assert!(!scene.needs_render());
        scene.verify_mirror().unwrap();
    }

    #[test]
    fn test_nested_position_scenario() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.attach_root(root).unwrap();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        scene.set_position_2d(b, Vec2::new(10.0, 20.0)).unwrap();

        let object = scene.visual_of(b).unwrap();
        let position = scene.backend().object(object).unwrap().transform.position;
        assert_eq!(position, Vec3::new(10.0, -20.0, 0.0));
    }

    #[test]
    fn test_add_child_to_dormant_parent_stays_dormant() {
        let mut scene = mirror();
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.add_child(a, b).unwrap();

        assert!(!scene.is_live(b));
        assert_eq!(scene.backend().object_count(), 0);
        assert!(!scene.needs_render());
    }

    #[test]
    fn test_subtree_goes_live_in_one_call() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();
        scene.attach_root(root).unwrap();

        scene.add_child(root, a).unwrap();
        assert!(scene.is_live(a) && scene.is_live(b) && scene.is_live(c));
        assert_eq!(scene.backend().object_count(), 4);
        scene.verify_mirror().unwrap();
    }

    #[test]
    fn test_rejects_cycle_and_double_parent() {
        let mut scene = mirror();
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");
        let other = scene.create_node("other");
        scene.attach_root(a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        let err = scene.add_child(c, a).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidHierarchy { reason: HierarchyViolation::Cycle, .. }
        ));

        let err = scene.add_child(other, c).unwrap_err();
        assert_eq!(
            err,
            SceneError::InvalidHierarchy {
                parent: Some(other),
                child: c,
                reason: HierarchyViolation::AlreadyParented(b),
            }
        );

        let err = scene.add_child(b, c).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidHierarchy { reason: HierarchyViolation::AlreadyChild, .. }
        ));

        let err = scene.add_child(a, a).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidHierarchy { reason: HierarchyViolation::SelfParent, .. }
        ));

        // Nothing moved
        assert_eq!(scene.children(b).unwrap(), &[c]);
        assert!(scene.children(other).unwrap().is_empty());
        scene.verify_mirror().unwrap();
    }

    #[test]
    fn test_root_cannot_become_child() {
        let mut scene = mirror();
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.attach_root(a).unwrap();
        scene.attach_root(b).unwrap();

        let err = scene.add_child(a, b).unwrap_err();
        assert!(matches!(
            err,
            SceneError::InvalidHierarchy { reason: HierarchyViolation::SceneRoot, .. }
        ));

        scene.detach_root(b).unwrap();
        scene.add_child(a, b).unwrap();
        assert!(scene.is_live(b));
        scene.verify_mirror().unwrap();
    }

    #[test]
    fn test_remove_child_keeps_subtree() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.attach_root(root).unwrap();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();

        scene.remove_child(root, a).unwrap();
        assert!(!scene.is_live(a));
        assert!(!scene.is_live(b));
        assert_eq!(scene.children(a).unwrap(), &[b]);
        assert_eq!(scene.parent(a).unwrap(), None);
        assert_eq!(scene.backend().object_count(), 1);
        scene.verify_mirror().unwrap();

        // Reusable
        scene.add_child(root, a).unwrap();
        assert!(scene.is_live(b));
        scene.verify_mirror().unwrap();
    }

    #[test]
    fn test_remove_non_child_is_rejected() {
        let mut scene = mirror();
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        assert_eq!(
            scene.remove_child(a, b).unwrap_err(),
            SceneError::NotAChild { parent: a, child: b }
        );
    }

    #[test]
    fn test_destroy_is_recursive_and_idempotent() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.attach_root(root).unwrap();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.events_mut().clear();

        assert!(scene.destroy(a));
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(scene.children(root).unwrap().is_empty());
        assert_eq!(scene.backend().object_count(), 1);
        assert_eq!(scene.backend().released_count(), 2);

        let destroyed: Vec<NodeId> = scene
            .events()
            .queued()
            .iter()
            .filter(|event| event.event_type == EventType::NodeDestroyed)
            .filter_map(Event::get_node)
            .collect();
        assert_eq!(destroyed, vec![b, a]);

        assert!(!scene.destroy(a));
        assert_eq!(scene.backend().released_count(), 2);
        scene.verify_mirror().unwrap();
    }

    #[test]
    fn test_destroy_root_clears_roots() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        scene.attach_root(root).unwrap();
        scene.destroy(root);
        assert!(scene.roots().is_empty());
        assert!(scene.backend().children_of(None).is_empty());
    }

    #[test]
    fn test_detached_mutation_is_applied_on_attach() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        let a = scene.create_node("a");
        scene.attach_root(root).unwrap();

        scene.set_position(a, Vec3::new(1.0, 2.0, 0.0)).unwrap();
        scene.set_visible(a, false).unwrap();
        scene.set_scale(a, Vec3::new(2.0, 2.0, 1.0)).unwrap();
        scene.add_child(root, a).unwrap();

        let object = scene.backend().object(scene.visual_of(a).unwrap()).unwrap();
        assert_eq!(object.transform.position, Vec3::new(1.0, -2.0, 0.0));
        assert_eq!(object.transform.scale, Vec3::new(2.0, 2.0, 1.0));
        assert!(!object.visible);
    }

    #[test]
    fn test_mutations_reach_renderer_immediately() {
        let mut scene = mirror();
        let a = scene.create_node("a");
        scene.attach_root(a).unwrap();
        scene.take_render_request();

        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), 0.5);
        scene.set_rotation(a, rotation).unwrap();
        assert!(scene.take_render_request());
        let object = scene.backend().object(scene.visual_of(a).unwrap()).unwrap();
        assert_relative_eq!(
            object.transform.rotation,
            scene.converter().rotation_to_render(rotation),
            epsilon = 1e-6
        );

        scene.set_visible(a, false).unwrap();
        assert!(!scene.backend().object(scene.visual_of(a).unwrap()).unwrap().visible);

        scene.rename(a, "renamed").unwrap();
        assert_eq!(scene.backend().object(scene.visual_of(a).unwrap()).unwrap().name, "renamed");
        assert_eq!(scene.find_by_name("renamed"), Some(a));
    }

    #[test]
    fn test_set_layer_moves_depth() {
        let mut scene = mirror();
        let a = scene.create_node("a");
        scene.attach_root(a).unwrap();
        scene.set_layer(a, RenderLayer::Foreground, 2).unwrap();

        let object = scene.backend().object(scene.visual_of(a).unwrap()).unwrap();
        assert_relative_eq!(object.transform.position.z, 1002.0 * 0.001, epsilon = 1e-5);
    }

    #[test]
    fn test_world_position_composes_parents() {
        let mut scene = mirror();
        let a = scene.create_node_with(NodeDesc::new("a").with_position(Vec3::new(100.0, 50.0, 0.0)));
        let b = scene.create_node_with(NodeDesc::new("b").with_position(Vec3::new(5.0, 5.0, 0.0)));
        scene.add_child(a, b).unwrap();
        scene.set_scale(a, Vec3::new(2.0, 2.0, 1.0)).unwrap();

        assert_relative_eq!(scene.world_position(b).unwrap(), Vec3::new(110.0, 60.0, 0.0));
    }

    #[test]
    fn test_flags_lookup() {
        let mut scene = mirror();
        let cam = scene.create_node_with(
            NodeDesc::new("player").with_flags(NodeFlags::SELECTABLE | NodeFlags::CAMERA_TARGET),
        );
        let helper = scene.create_node_with(NodeDesc::new("grid").with_flags(NodeFlags::EDITOR_ONLY));

        assert!(scene.has_flag(cam, NodeFlags::CAMERA_TARGET));
        assert!(!scene.has_flag(helper, NodeFlags::SELECTABLE));
        assert_eq!(scene.nodes_with_flag(NodeFlags::CAMERA_TARGET), vec![cam]);
    }

    #[test]
    fn test_depth_first_order() {
        let mut scene = mirror();
        let root = scene.create_node("root");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");
        scene.attach_root(root).unwrap();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, c).unwrap();
        scene.add_child(root, b).unwrap();

        assert_eq!(scene.depth_first(), vec![root, a, c, b]);
    }
}
