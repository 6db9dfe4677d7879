//! Block graph model for the botblocks puzzle.
//!
//! - [`node`]: the [`Node`] record, its closed [`NodeKind`] set and slots
//! - [`graph`]: [`BlockGraph`], the arena plus the snap/disconnect protocol
//! - [`layout`]: slot selection and placement geometry
//! - [`canvas`]: drag, hit-test and drop on top of the graph
//! - [`board`]: canvas bounds used to decide deletion

pub mod board;
pub mod canvas;
pub mod error;
pub mod graph;
pub mod id;
pub mod layout;
pub mod node;

// Re-export commonly used types
pub use board::{BoardBounds, Rect};
pub use canvas::{Canvas, DropOutcome};
pub use error::CoreError;
pub use graph::BlockGraph;
pub use id::NodeId;
pub use node::{Condition, LoopCondition, Node, NodeKind, Position, Shape, Slot, Slots};
