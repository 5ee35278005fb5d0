//! Pointer state and viewport picking
//!
//! Converts screen pixels into logical coordinates through the camera's
//! projection bounds and hit-tests the live scene against node pick extents.

use crate::camera::CameraView;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::RenderBackend;
use crate::scene::{CoordinateConverter, NodeFlags, NodeId, SceneMirror};

/// Pointer state for the viewport
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Last screen-space position (pixels from top-left)
    pub screen: Vec2,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
}

impl PointerState {
    /// Create a pointer state for a window size
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            screen: Vec2::zeros(),
            window_width,
            window_height,
        }
    }

    /// Window size as a vector
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(self.window_width as f32, self.window_height as f32)
    }

    /// Update the pointer position
    pub fn update_position(&mut self, screen: Vec2) {
        self.screen = screen;
    }

    /// Update the window size (call on resize)
    pub fn update_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Logical position under the pointer
    pub fn logical(&self, view: &CameraView, converter: &CoordinateConverter) -> Vec2 {
        screen_to_logical(self.screen, self.window_size(), view, converter)
    }
}

/// Map screen pixels to logical coordinates through a camera view
pub fn screen_to_logical(
    screen: Vec2,
    window_size: Vec2,
    view: &CameraView,
    converter: &CoordinateConverter,
) -> Vec2 {
    let size = window_size.map(|v| v.max(1.0));
    let uv = screen.component_div(&size);
    let bounds = &view.bounds;
    let render = Vec3::new(
        bounds.left + uv.x * bounds.width(),
        bounds.top - uv.y * bounds.height(),
        0.0,
    );
    converter.to_logical_space(render)
}

/// Topmost pickable node under a point
///
/// `logical` is tested against world-space nodes, `screen` against nodes
/// flagged `SCREEN_SPACE`. Candidates are live, visible through all their
/// ancestors, `SELECTABLE`, not `EDITOR_ONLY`, and carry pick extents. Ties on
/// effective z-index go to the node visited last in depth-first order.
pub fn pick<B: RenderBackend>(mirror: &SceneMirror<B>, logical: Vec2, screen: Vec2) -> Option<NodeId> {
    let mut best: Option<(i64, NodeId)> = None;
    let mut stack: Vec<(NodeId, i64)> = mirror.roots().iter().rev().map(|id| (*id, 0)).collect();

    while let Some((id, parent_z)) = stack.pop() {
        let Ok(node) = mirror.node(id) else { continue };
        if !node.visible() {
            continue;
        }
        let z = parent_z + i64::from(node.z_index());
        stack.extend(node.children().iter().rev().map(|child| (*child, z)));

        if !node.has_flag(NodeFlags::SELECTABLE) || node.has_flag(NodeFlags::EDITOR_ONLY) {
            continue;
        }
        let Some(extents) = node.pick_extents() else { continue };
        let Ok(world) = mirror.world_transform(id) else { continue };

        let point = if node.has_flag(NodeFlags::SCREEN_SPACE) { screen } else { logical };
        let local = world
            .rotation
            .inverse_transform_vector(&(Vec3::new(point.x, point.y, 0.0) - world.position));
        let half = extents.component_mul(&world.scale.xy()).abs();
        if local.x.abs() <= half.x && local.y.abs() <= half.y && best.map_or(true, |(top, _)| z >= top) {
            best = Some((z, id));
        }
    }

    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrthoCamera;
    use crate::render::RetainedScene;
    use crate::scene::{NodeDesc, RenderLayer};

    fn boxed(name: &str, position: Vec3) -> NodeDesc {
        NodeDesc::new(name)
            .with_position(position)
            .with_pick_extents(Vec2::new(10.0, 10.0))
    }

    #[test]
    fn test_pointer_logical_tracks_resize() {
        let converter = CoordinateConverter::default();
        let mut camera = OrthoCamera::default();
        camera.set_half_extents(Vec2::new(400.0, 300.0));
        let view = camera.view_at(Vec3::zeros(), &converter);

        let mut pointer = PointerState::new(800, 600);
        pointer.update_position(Vec2::new(400.0, 300.0));
        assert_eq!(pointer.logical(&view, &converter), Vec2::zeros());

        pointer.update_window_size(1600, 1200);
        assert_eq!(pointer.logical(&view, &converter), Vec2::new(-200.0, -150.0));
    }

    #[test]
    fn test_screen_to_logical_through_camera() {
        let converter = CoordinateConverter::default();
        let mut camera = OrthoCamera::default();
        camera.set_half_extents(Vec2::new(400.0, 300.0));
        let view = camera.view_at(Vec3::new(100.0, 50.0, 0.0), &converter);
        let window = Vec2::new(800.0, 600.0);

        let center = screen_to_logical(Vec2::new(400.0, 300.0), window, &view, &converter);
        assert_eq!(center, Vec2::new(100.0, 50.0));

        let top_left = screen_to_logical(Vec2::zeros(), window, &view, &converter);
        assert_eq!(top_left, Vec2::new(-300.0, -250.0));
    }

    #[test]
    fn test_pick_prefers_higher_layer_then_later_node() {
        let mut mirror = SceneMirror::with_backend(RetainedScene::new());
        let back = mirror.create_node_with(boxed("back", Vec3::zeros()).with_layer(RenderLayer::Foreground, 0));
        let front = mirror.create_node_with(boxed("front", Vec3::new(5.0, 0.0, 0.0)));
        let later = mirror.create_node_with(boxed("later", Vec3::new(5.0, 0.0, 0.0)));
        for id in [back, front, later] {
            mirror.attach_root(id).unwrap();
        }

        assert_eq!(pick(&mirror, Vec2::new(4.0, 0.0), Vec2::zeros()), Some(back));

        mirror.set_layer(back, RenderLayer::Background, 0).unwrap();
        assert_eq!(pick(&mirror, Vec2::new(4.0, 0.0), Vec2::zeros()), Some(later));
        assert_eq!(pick(&mirror, Vec2::new(-8.0, 0.0), Vec2::zeros()), Some(back));
        assert_eq!(pick(&mirror, Vec2::new(40.0, 0.0), Vec2::zeros()), None);
    }

    #[test]
    fn test_pick_skips_hidden_and_editor_nodes() {
        let mut mirror = SceneMirror::with_backend(RetainedScene::new());
        let parent = mirror.create_node_with(NodeDesc::new("group").hidden());
        let child = mirror.create_node_with(boxed("child", Vec3::zeros()));
        let helper = mirror.create_node_with(
            boxed("helper", Vec3::zeros()).with_flags(NodeFlags::SELECTABLE | NodeFlags::EDITOR_ONLY),
        );
        mirror.add_child(parent, child).unwrap();
        mirror.attach_root(parent).unwrap();
        mirror.attach_root(helper).unwrap();

        assert_eq!(pick(&mirror, Vec2::zeros(), Vec2::zeros()), None);

        mirror.set_visible(parent, true).unwrap();
        assert_eq!(pick(&mirror, Vec2::zeros(), Vec2::zeros()), Some(child));
    }

    #[test]
    fn test_screen_space_nodes_use_pixels() {
        let mut mirror = SceneMirror::with_backend(RetainedScene::new());
        let button = mirror.create_node_with(
            boxed("button", Vec3::new(700.0, 40.0, 0.0))
                .with_flags(NodeFlags::SELECTABLE | NodeFlags::SCREEN_SPACE)
                .with_layer(RenderLayer::Overlay, 0),
        );
        mirror.attach_root(button).unwrap();

        assert_eq!(pick(&mirror, Vec2::new(700.0, 40.0), Vec2::zeros()), None);
        assert_eq!(pick(&mirror, Vec2::zeros(), Vec2::new(705.0, 35.0)), Some(button));
    }
}
