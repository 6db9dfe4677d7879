//! Execution trace recording.
//!
//! When tracing is enabled via [`InterpreterConfig::trace_enabled`](super::InterpreterConfig),
//! the interpreter records a [`TraceEntry`] for every tick.

use botblocks_core::{NodeId, NodeKind};
use botblocks_world::{Coord, Direction};
use serde::Serialize;

/// One tick: the block that ran and where the actor ended up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub step: u64,
    pub node: NodeId,
    pub kind: NodeKind,
    pub position: Coord,
    pub facing: Direction,
    /// The block that becomes current next, if any.
    pub next: Option<NodeId>,
}
