//! Scene nodes
//!
//! A node carries its local transform in logical space, a draw layer, and
//! capability flags fixed at creation. While it is part of the live scene it
//! owns exactly one renderer-side object; [`super::SceneMirror`] keeps the two
//! in step.

use bitflags::bitflags;

use super::coords::{CoordinateConverter, RenderLayer};
use crate::foundation::math::{Quat, Transform, Vec2, Vec3};
use crate::render::ObjectHandle;

slotmap::new_key_type! {
    /// Generational node identifier
    pub struct NodeId;
}

bitflags! {
    /// Capability markers set when a node is created
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Can be picked and selected in the viewport
        const SELECTABLE = 1 << 0;
        /// Offered as a camera follow target
        const CAMERA_TARGET = 1 << 1;
        /// Editor helper, never picked
        const EDITOR_ONLY = 1 << 2;
        /// Selectable but not draggable
        const LOCKED = 1 << 3;
        /// Hit-tested in screen pixels instead of world units
        const SCREEN_SPACE = 1 << 4;
    }
}

/// Creation parameters for a node
#[derive(Debug, Clone)]
pub struct NodeDesc {
    /// Display name
    pub name: String,
    /// Initial local transform
    pub transform: Transform,
    /// Initial visibility
    pub visible: bool,
    /// Draw layer
    pub layer: RenderLayer,
    /// Order within the layer
    pub z_order: i32,
    /// Capability markers
    pub flags: NodeFlags,
    /// Half-size used for picking, in local logical units
    pub pick_extents: Option<Vec2>,
}

impl NodeDesc {
    /// Visible, selectable node at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            visible: true,
            layer: RenderLayer::Inherit,
            z_order: 0,
            flags: NodeFlags::SELECTABLE,
            pick_extents: None,
        }
    }

    /// Set the initial position
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Set the full initial transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the draw layer and in-layer order
    pub fn with_layer(mut self, layer: RenderLayer, z_order: i32) -> Self {
        self.layer = layer;
        self.z_order = z_order;
        self
    }

    /// Replace the capability flags
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the picking half-size
    pub fn with_pick_extents(mut self, extents: Vec2) -> Self {
        self.pick_extents = Some(extents);
        self
    }

    /// Start hidden
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// A logical scene-tree entity
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    transform: Transform,
    visible: bool,
    layer: RenderLayer,
    z_order: i32,
    flags: NodeFlags,
    pick_extents: Option<Vec2>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) visual: Option<ObjectHandle>,
    pub(super) is_root: bool,
}

impl Node {
    pub(super) fn from_desc(desc: NodeDesc) -> Self {
        Self {
            name: desc.name,
            transform: desc.transform,
            visible: desc.visible,
            layer: desc.layer,
            z_order: desc.z_order,
            flags: desc.flags,
            pick_extents: desc.pick_extents,
            parent: None,
            children: Vec::new(),
            visual: None,
            is_root: false,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local transform in logical space
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Own visibility flag (ancestors may still hide the node)
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Draw layer
    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// Order within the layer
    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// z-index relative to the parent's plane
    pub fn z_index(&self) -> i32 {
        self.layer.z_index(self.z_order)
    }

    /// Capability markers
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// O(1) capability check
    pub fn has_flag(&self, flag: NodeFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Picking half-size
    pub fn pick_extents(&self) -> Option<Vec2> {
        self.pick_extents
    }

    /// Parent node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Owned visual object, if live
    pub fn visual(&self) -> Option<ObjectHandle> {
        self.visual
    }

    /// Whether the node currently owns a visual object
    pub fn is_live(&self) -> bool {
        self.visual.is_some()
    }

    /// Whether the node is attached as a scene root
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// The visual object's transform: a pure function of the node's state
    pub fn render_transform(&self, converter: &CoordinateConverter) -> Transform {
        converter.transform_to_render(&self.transform, self.z_index())
    }

    pub(super) fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub(super) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(super) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(super) fn set_layer(&mut self, layer: RenderLayer, z_order: i32) {
        self.layer = layer;
        self.z_order = z_order;
    }
}
