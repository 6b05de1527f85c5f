//! Error types.
//!
//! Nothing is recovered locally: host failures and broken fiber links
//! propagate to whoever drives the scheduler.

use thiserror::Error;

use crate::engine::FiberId;

/// Failure reported by a host-tree adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The node handle does not resolve to a live host node.
    #[error("unknown host node {0}")]
    UnknownNode(String),
    /// `remove_child` was called with a node that is not a child of `parent`.
    #[error("host node {child} is not a child of {parent}")]
    NotAChild { parent: String, child: String },
    /// The operation does not apply to this kind of node.
    #[error("cannot {operation} on {node}")]
    Unsupported { operation: &'static str, node: String },
    /// Adapter-specific failure.
    #[error("host adapter error: {0}")]
    Adapter(String),
}

/// Failure while rendering or committing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A host mutation failed. Mutations applied before it stay applied.
    #[error(transparent)]
    Host(#[from] HostError),
    /// No ancestor of the fiber owns a host node to attach to or detach from.
    #[error("fiber {0:?} has no host ancestor")]
    MissingHostParent(FiberId),
    /// A fiber handle no longer resolves in the arena.
    #[error("fiber {0:?} no longer exists")]
    StaleFiber(FiberId),
}

/// Result type for rendering operations.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
