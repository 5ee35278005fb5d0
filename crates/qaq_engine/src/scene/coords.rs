//! Logical space <-> render space conversion
//!
//! Logical space is the authoring convention: origin top-left, +Y down.
//! Render space is the renderer's: +Y up, with stacked 2D planes separated
//! along Z by `layer_spacing * z_index` so overlapping sprites never z-fight.
//!
//! Conversions are local. A child's z-index offsets it from its parent's plane,
//! not from the scene origin.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Quat, Quaternion, Transform, Vec2, Vec3};

/// Default render-space distance between adjacent z-indices
pub const DEFAULT_LAYER_SPACING: f32 = 0.001;

/// Draw layer of a node
///
/// Each layer owns a band of z-indices; `z_order` picks a slot inside the band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderLayer {
    /// Same plane as the parent
    #[default]
    Inherit,
    /// Backdrops, parallax planes
    Background,
    /// Regular scene content
    World,
    /// Content drawn over the world
    Foreground,
    /// Editor overlays and HUD elements
    Overlay,
}

impl RenderLayer {
    /// Base z-index of the layer band
    pub const fn base_index(self) -> i32 {
        match self {
            Self::Inherit | Self::World => 0,
            Self::Background => -1000,
            Self::Foreground => 1000,
            Self::Overlay => 2000,
        }
    }

    /// z-index of a node in this layer with the given in-layer order
    pub const fn z_index(self, z_order: i32) -> i32 {
        self.base_index().saturating_add(z_order)
    }
}

/// Stateless converter between logical and render space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateConverter {
    layer_spacing: f32,
}

impl Default for CoordinateConverter {
    fn default() -> Self {
        Self::new(DEFAULT_LAYER_SPACING)
    }
}

impl CoordinateConverter {
    /// Create a converter with the given layer spacing
    pub const fn new(layer_spacing: f32) -> Self {
        Self { layer_spacing }
    }

    /// Render-space distance between adjacent z-indices
    pub const fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    /// Render-space depth of a z-index
    #[allow(clippy::cast_precision_loss)]
    pub fn z_offset(&self, z_index: i32) -> f32 {
        z_index as f32 * self.layer_spacing
    }

    /// Map a 2D logical point onto its render-space plane
    pub fn to_render_space(&self, p: Vec2, z_index: i32) -> Vec3 {
        Vec3::new(p.x, -p.y, self.z_offset(z_index))
    }

    /// Inverse of [`Self::to_render_space`] (the plane depth is dropped)
    pub fn to_logical_space(&self, p: Vec3) -> Vec2 {
        Vec2::new(p.x, -p.y)
    }

    /// Map a 3D logical position; its own z is kept on top of the plane depth
    pub fn position_to_render(&self, p: Vec3, z_index: i32) -> Vec3 {
        Vec3::new(p.x, -p.y, p.z + self.z_offset(z_index))
    }

    /// Inverse of [`Self::position_to_render`] for the same z-index
    pub fn position_to_logical(&self, p: Vec3, z_index: i32) -> Vec3 {
        Vec3::new(p.x, -p.y, p.z - self.z_offset(z_index))
    }

    /// Reflect a rotation across the XZ plane
    ///
    /// Mirroring Y turns a rotation about axis `(x, y, z)` into one about
    /// `(-x, y, -z)` by the same angle. The mapping is its own inverse.
    pub fn rotation_to_render(&self, rotation: Quat) -> Quat {
        let q = rotation.quaternion();
        Quat::new_unchecked(Quaternion::new(q.w, -q.i, q.j, -q.k))
    }

    /// Full local transform in render space
    pub fn transform_to_render(&self, transform: &Transform, z_index: i32) -> Transform {
        Transform {
            position: self.position_to_render(transform.position, z_index),
            rotation: self.rotation_to_render(transform.rotation),
            scale: transform.scale,
        }
    }
}
