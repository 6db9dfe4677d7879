//! Session error types.

use botblocks_core::{CoreError, NodeKind};
use botblocks_storage::StorageError;
use botblocks_world::MapError;
use thiserror::Error;

use crate::session::Mode;

/// Errors produced by the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not available in the current mode.
    #[error("{operation} requires {expected} mode, but the session is in {actual} mode")]
    WrongMode {
        operation: &'static str,
        expected: Mode,
        actual: Mode,
    },

    /// The level's palette does not offer this block.
    #[error("block '{kind}' is not available in this level")]
    BlockNotAllowed { kind: NodeKind },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
