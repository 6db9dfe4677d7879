//! Async execution driver.
//!
//! [`Runner`] owns one background task per run. The task steps a synchronous
//! [`Interpreter`] against the shared world and sleeps between ticks; that
//! sleep is the only suspension point, so [`Runner::stop`] (which aborts the
//! task) always cancels between two blocks, never inside one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use botblocks_core::{BlockGraph, NodeId};
use botblocks_storage::GameSpeed;
use botblocks_world::{Actor, GridMap, MapOracle, Robot, World};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RunnerConfig;
use crate::interpreter::{ExecutionState, Interpreter, RunError, TraceEntry};

/// Progress reported by a running program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started { root: NodeId },
    /// A block ran and `next` is now current.
    Stepped { step: u64, next: NodeId },
    /// Control climbed past the root.
    Completed { steps: u64, trace: Vec<TraceEntry> },
    Aborted { steps: u64, error: RunError },
}

/// Locks the world, recovering from a panicked holder.
pub fn lock_world<M, A>(world: &Mutex<World<M, A>>) -> MutexGuard<'_, World<M, A>> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts, paces and cancels program runs.
pub struct Runner<M = GridMap, A = Robot> {
    world: Arc<Mutex<World<M, A>>>,
    config: RunnerConfig,
    fast_forward: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<M, A> Runner<M, A>
where
    M: MapOracle + Send + 'static,
    A: Actor + Send + 'static,
{
    pub fn new(world: Arc<Mutex<World<M, A>>>, config: RunnerConfig) -> Self {
        Runner {
            world,
            config,
            fast_forward: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Takes effect from the next [`start`](Self::start).
    pub fn set_speed(&mut self, speed: GameSpeed) {
        self.config.speed = speed;
    }

    pub fn world(&self) -> &Arc<Mutex<World<M, A>>> {
        &self.world
    }

    /// Runs `program` from its root in a background task. A run already in
    /// progress is cancelled first. Events arrive on the returned channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, program: BlockGraph) -> mpsc::UnboundedReceiver<RunEvent> {
        self.stop();
        self.fast_forward.store(false, Ordering::Relaxed);

        let (tx, rx) = mpsc::unbounded_channel();
        let world = Arc::clone(&self.world);
        let config = self.config.clone();
        let fast_forward = Arc::clone(&self.fast_forward);
        self.task = Some(tokio::spawn(drive(program, world, config, fast_forward, tx)));
        rx
    }

    /// Cancels the current run. Returns `false` if nothing was running.
    /// Calling it again is harmless.
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    info!("run stopped");
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Shortens the pause between ticks while `on`. Applies from the next
    /// tick of the current run.
    pub fn set_fast_forward(&self, on: bool) {
        self.fast_forward.store(on, Ordering::Relaxed);
    }

    pub fn is_fast_forwarded(&self) -> bool {
        self.fast_forward.load(Ordering::Relaxed)
    }
}

impl<M, A> Drop for Runner<M, A> {
    fn drop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }
}

async fn drive<M: MapOracle, A: Actor>(
    program: BlockGraph,
    world: Arc<Mutex<World<M, A>>>,
    config: RunnerConfig,
    fast_forward: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<RunEvent>,
) {
    let rng: Box<dyn RngCore + Send> = match config.speech_seed {
        Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    };
    let root = program.root();
    let mut interpreter = Interpreter::with_rng(&program, config.interpreter(), rng);
    interpreter.start(root);
    info!(blocks = program.node_count(), "run started");
    let _ = events.send(RunEvent::Started { root });

    loop {
        let state = {
            let mut world = lock_world(&world);
            interpreter.step(&mut *world).clone()
        };
        let steps = interpreter.steps();
        match state {
            ExecutionState::Running { current } => {
                let _ = events.send(RunEvent::Stepped { step: steps, next: current });
                let delay = config.tick_delay(fast_forward.load(Ordering::Relaxed));
                debug!(?delay, "pausing");
                tokio::time::sleep(delay).await;
            }
            ExecutionState::Completed => {
                info!(steps, "run completed");
                let trace = interpreter.take_trace();
                let _ = events.send(RunEvent::Completed { steps, trace });
                break;
            }
            ExecutionState::Aborted { error } => {
                warn!(steps, %error, "run aborted");
                let _ = events.send(RunEvent::Aborted { steps, error });
                break;
            }
            ExecutionState::Idle => break,
        }
    }
}
