//! Interpreter state machine with step-by-step execution.
//!
//! The [`Interpreter`] walks a [`BlockGraph`] one block per [`step`](Interpreter::step).
//! The state transitions are `Idle -> Running -> (Completed | Aborted)`;
//! [`stop`](Interpreter::stop) returns to `Idle` from anywhere.
//!
//! When a block yields nothing, the interpreter climbs parent links from it.
//! The first loop reached through its `body` slot takes control again and
//! re-evaluates its predicate. Climbing past the root completes the run.

use botblocks_core::{BlockGraph, NodeId, Slot};
use botblocks_world::{Actor, MapOracle, World};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};

use super::error::RunError;
use super::eval::eval_node;
use super::trace::TraceEntry;

/// Execution state of the interpreter state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    /// Not started, or stopped.
    Idle,
    /// `current` runs on the next step.
    Running { current: NodeId },
    /// Control climbed past the root.
    Completed,
    /// Halted by corruption or the step limit.
    Aborted { error: RunError },
}

/// Configuration for the interpreter.
#[derive(Debug, Clone, Default)]
pub struct InterpreterConfig {
    /// Whether to record execution traces.
    pub trace_enabled: bool,
    /// Abort after this many steps. `None` runs until completion.
    pub max_steps: Option<u64>,
}

/// The block interpreter.
///
/// Holds a reference to the program being run; the world is passed to each
/// step so the caller decides how it is shared.
pub struct Interpreter<'g> {
    program: &'g BlockGraph,
    state: ExecutionState,
    steps: u64,
    trace: Option<Vec<TraceEntry>>,
    config: InterpreterConfig,
    rng: Box<dyn RngCore + Send>,
}

impl<'g> Interpreter<'g> {
    /// Creates an idle interpreter with an entropy-seeded speech RNG.
    pub fn new(program: &'g BlockGraph, config: InterpreterConfig) -> Self {
        Self::with_rng(program, config, Box::new(StdRng::from_entropy()))
    }

    /// Like [`new`](Self::new) with an explicit RNG for `Speak`.
    pub fn with_rng(
        program: &'g BlockGraph,
        config: InterpreterConfig,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let trace = config.trace_enabled.then(Vec::new);
        Interpreter {
            program,
            state: ExecutionState::Idle,
            steps: 0,
            trace,
            config,
            rng,
        }
    }

    /// Starts at `root`. Any previous run is discarded.
    pub fn start(&mut self, root: NodeId) {
        self.steps = 0;
        if let Some(trace) = &mut self.trace {
            trace.clear();
        }
        self.state = ExecutionState::Running { current: root };
    }

    /// Returns to `Idle`. Safe to call in any state.
    pub fn stop(&mut self) {
        self.state = ExecutionState::Idle;
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Number of blocks executed since [`start`](Self::start).
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The recorded trace, if tracing is enabled.
    pub fn trace(&self) -> Option<&[TraceEntry]> {
        self.trace.as_deref()
    }

    pub fn take_trace(&mut self) -> Vec<TraceEntry> {
        self.trace.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Executes the current block and advances. Does nothing unless running.
    pub fn step<M: MapOracle, A: Actor>(&mut self, world: &mut World<M, A>) -> &ExecutionState {
        let ExecutionState::Running { current } = self.state else {
            return &self.state;
        };

        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                warn!(node = %current, limit, "step limit exceeded");
                self.state = ExecutionState::Aborted {
                    error: RunError::StepLimitExceeded { node: current, limit },
                };
                return &self.state;
            }
        }

        let program = self.program;
        let Some(node) = program.get(current) else {
            self.state = ExecutionState::Aborted {
                error: RunError::MissingNode { node: current },
            };
            return &self.state;
        };

        let yielded = eval_node(current, node, world, self.rng.as_mut());
        self.steps += 1;

        let next = match yielded {
            Some(next) => Ok(Some(next)),
            None => self.ascend(current),
        };

        let next = match next {
            Ok(next) => next,
            Err(error) => {
                warn!(%error, "run aborted");
                self.state = ExecutionState::Aborted { error };
                return &self.state;
            }
        };

        debug!(step = self.steps, node = %current, kind = %node.kind(), ?next, "tick");
        if let Some(trace) = &mut self.trace {
            trace.push(TraceEntry {
                step: self.steps,
                node: current,
                kind: node.kind(),
                position: world.actor.position(),
                facing: world.actor.facing(),
                next,
            });
        }

        self.state = match next {
            Some(current) => ExecutionState::Running { current },
            None => ExecutionState::Completed,
        };
        &self.state
    }

    /// Steps until the run leaves the `Running` state.
    pub fn run<M: MapOracle, A: Actor>(&mut self, world: &mut World<M, A>) -> &ExecutionState {
        while matches!(self.state, ExecutionState::Running { .. }) {
            self.step(world);
        }
        &self.state
    }

    /// Climbs from a block that yielded nothing. Returns the loop that takes
    /// control back, or `None` once the climb passes the root.
    fn ascend(&self, from: NodeId) -> Result<Option<NodeId>, RunError> {
        let mut segment = from;
        loop {
            let node = self
                .program
                .get(segment)
                .ok_or(RunError::MissingNode { node: segment })?;
            let Some(parent) = node.parent() else {
                return Ok(None);
            };
            let owner = self
                .program
                .get(parent)
                .ok_or(RunError::MissingNode { node: parent })?;
            match owner.slots().slot_of(segment) {
                Some(Slot::Body) => return Ok(Some(parent)),
                Some(_) => segment = parent,
                None => return Err(RunError::Corrupted { node: segment, parent }),
            }
        }
    }
}
