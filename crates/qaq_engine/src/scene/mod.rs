//! Scene module - logical node tree mirrored onto the renderer
//!
//! - [`coords`]: logical <-> render space conversion and the layer table
//! - [`node`]: node data, ids and capability flags
//! - [`mirror`]: the tree itself and the renderer synchronization

pub mod coords;
pub mod error;
pub mod mirror;
pub mod node;

#[cfg(test)]
mod tests;

pub use coords::{CoordinateConverter, RenderLayer, DEFAULT_LAYER_SPACING};
pub use error::{HierarchyViolation, SceneError, SceneResult};
pub use mirror::SceneMirror;
pub use node::{Node, NodeDesc, NodeFlags, NodeId};
