//! Scene mirror errors

use thiserror::Error;

use super::NodeId;

/// Why a hierarchy change was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyViolation {
    /// A node cannot be its own child
    #[error("a node cannot be its own parent")]
    SelfParent,
    /// The child is an ancestor of the parent
    #[error("the child is an ancestor of the parent")]
    Cycle,
    /// The child already hangs under another node
    #[error("the child already has parent {0:?}; detach it first")]
    AlreadyParented(NodeId),
    /// The child is already a child of this parent
    #[error("the child is already attached to this parent")]
    AlreadyChild,
    /// The node is a live scene root
    #[error("the node is a scene root; detach it first")]
    SceneRoot,
}

/// Scene mirror errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Rejected attachment; the tree is unchanged
    #[error("invalid hierarchy: cannot attach {child:?} under {parent:?}: {reason}")]
    InvalidHierarchy {
        /// Intended parent (`None` when attaching as a scene root)
        parent: Option<NodeId>,
        /// Node being attached
        child: NodeId,
        /// What rule the change broke
        reason: HierarchyViolation,
    },

    /// The id does not name a node (never allocated or already destroyed)
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// `remove_child` on a node that is not a child of the given parent
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Parent named by the caller
        parent: NodeId,
        /// Node named by the caller
        child: NodeId,
    },

    /// `detach_root` on a node that is not a scene root
    #[error("{0:?} is not a scene root")]
    NotARoot(NodeId),

    /// The operation needs a node that owns a live visual object
    #[error("node {0:?} is not part of the live scene")]
    NodeNotLive(NodeId),

    /// The logical tree and the renderer tree disagree
    #[error("scene mirror out of sync: {0}")]
    MirrorMismatch(String),
}

/// Scene result type
pub type SceneResult<T> = Result<T, SceneError>;
