//! Runtime error types for the block interpreter.
//!
//! An absent child is not an error: it simply ends that path. These variants
//! cover the cases that halt a run.

use botblocks_core::NodeId;
use serde::Serialize;

/// Errors that abort a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RunError {
    /// `node` names `parent` as its parent, but no slot of `parent` holds it.
    #[error("corrupted program: {node} names {parent} as parent but is not owned by it")]
    Corrupted { node: NodeId, parent: NodeId },

    /// The current node is not in the program.
    #[error("node {node} is missing from the program")]
    MissingNode { node: NodeId },

    #[error("step limit ({limit}) exceeded at node {node}")]
    StepLimitExceeded { node: NodeId, limit: u64 },
}
