//! Running botblocks programs.
//!
//! - [`interpreter`]: the synchronous, step-at-a-time [`Interpreter`]
//! - [`driver`]: the tokio [`Runner`] that paces and cancels runs
//! - [`session`]: the [`Session`] controller gating editing against running
//! - [`config`]: [`RunnerConfig`]

pub mod config;
pub mod driver;
pub mod error;
pub mod interpreter;
pub mod session;

pub use config::RunnerConfig;
pub use driver::{RunEvent, Runner};
pub use error::SessionError;
pub use interpreter::{ExecutionState, Interpreter, InterpreterConfig, RunError, TraceEntry};
pub use session::{Mode, RunOutcome, Session};
