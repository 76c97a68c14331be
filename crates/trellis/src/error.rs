use std::result::Result as StdResult;

use thiserror::Error;

use crate::id::NodeId;

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type. Almost all variants signal caller bugs: structural misuse
/// fails loudly and is never retried or recovered.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// The node is not present in the arena.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// A node was added as its own child.
    #[error("cannot add a node as its own child")]
    AddSelf,
    /// The child already has a parent.
    #[error("node is already attached to a parent")]
    AlreadyAttached,
    /// Attaching would create a parent cycle.
    #[error("attach would create a cycle")]
    WouldCreateCycle,
    /// Child index out of range.
    #[error("child index {0} out of range")]
    IndexOutOfRange(usize),
    /// A removed node was re-added without clearing its removed flag first.
    #[error("node was removed; clear the removed flag before reuse")]
    RemovedNodeReuse,
    /// The node has been closed and rejects further mutation.
    #[error("node has been closed")]
    Closed,
    /// Structural mutation was attempted while a mouse-up dispatch is
    /// unwinding through the tree.
    #[error("structural mutation during mouse-up dispatch")]
    ReentrantMutation,
    /// The capture-state chain is inconsistent.
    #[error("capture invariant violated: {0}")]
    CaptureInvariant(String),
    /// The focus chain is inconsistent.
    #[error("focus invariant violated: {0}")]
    FocusInvariant(String),
    /// A typed engine accessor was used on an engine of a different type.
    #[error("layout engine type mismatch")]
    EngineMismatch,
    /// Geometry failure.
    #[error("geometry: {0}")]
    Geometry(String),
    /// Invalid input error.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}
