//! Block interpreter.
//!
//! - [`Interpreter`] holds a reference to a [`BlockGraph`](botblocks_core::BlockGraph)
//!   and advances one block per step against a [`World`](botblocks_world::World).
//! - [`ExecutionState`] tracks the lifecycle
//!   `Idle -> Running -> (Completed | Aborted)`.
//! - [`RunError`] describes why a run was aborted.
//! - [`TraceEntry`] records each tick when tracing is enabled.
//!
//! The interpreter is synchronous and never sleeps; pacing and cancellation
//! belong to the [`Runner`](crate::driver::Runner).

pub mod error;
pub mod eval;
pub mod state;
pub mod trace;

pub use error::RunError;
pub use state::{ExecutionState, Interpreter, InterpreterConfig};
pub use trace::TraceEntry;
