//! Core error types for botblocks-core.
//!
//! Snap rejections are not errors (they return `false`); these variants cover
//! lookups of unknown handles, operations the root refuses, and structural
//! corruption found by the consistency check.

use crate::id::NodeId;
use thiserror::Error;

/// Core errors produced by the botblocks-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A node handle was not found in the live registry.
    #[error("node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// The root block can be neither removed nor dragged.
    #[error("the start block {id} is fixed")]
    RootIsFixed { id: NodeId },

    /// A parent/child invariant was violated.
    #[error("graph inconsistency: {reason}")]
    GraphInconsistency { reason: String },
}
