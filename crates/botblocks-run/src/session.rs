//! The session controller: one level, its editing canvas and its runs.
//!
//! A session is in one of three modes. Editing happens only in
//! [`Mode::Editor`]; runs only start from [`Mode::Stopped`]. Running
//! executes a snapshot of the program, so the canvas is never read by the
//! background task.

use std::fmt;
use std::sync::{Arc, Mutex};

use botblocks_core::{BlockGraph, Canvas, DropOutcome, NodeId, NodeKind, Position, Rect};
use botblocks_storage::{GameSpeed, ScoreStore};
use botblocks_world::{Level, Robot, World};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::RunnerConfig;
use crate::driver::{lock_world, RunEvent, Runner};
use crate::error::SessionError;
use crate::interpreter::{RunError, TraceEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Stopped,
    Editor,
    Playing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Stopped => "stopped",
            Mode::Editor => "editor",
            Mode::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// How a run ended, as seen by the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The robot finished on the exit. `score` is the number of blocks in the
    /// executable tree; fewer is better.
    Won { score: u32, new_best: bool, steps: u64 },
    /// The program ended away from the exit.
    Finished { steps: u64 },
    Aborted { steps: u64, error: RunError },
}

pub struct Session<S> {
    level: Level,
    canvas: Canvas<Rect>,
    world: Arc<Mutex<World>>,
    runner: Runner,
    scores: S,
    mode: Mode,
    events: Option<mpsc::UnboundedReceiver<RunEvent>>,
    /// Block count of the program snapshot being run.
    running_blocks: u32,
    last_trace: Vec<TraceEntry>,
    /// The robot as the last run left it, before any reset.
    final_robot: Option<Robot>,
}

impl<S: ScoreStore> Session<S> {
    /// Opens `level` with an empty program whose start block sits at
    /// `root_position` on `board`.
    pub fn new(
        level: Level,
        board: Rect,
        root_position: Position,
        scores: S,
        config: RunnerConfig,
    ) -> Result<Self, SessionError> {
        let world = World::from_text(&level.map)?;
        let world = Arc::new(Mutex::new(world));
        let runner = Runner::new(Arc::clone(&world), config);
        Ok(Session {
            level,
            canvas: Canvas::new(board, root_position),
            world,
            runner,
            scores,
            mode: Mode::Stopped,
            events: None,
            running_blocks: 0,
            last_trace: Vec::new(),
            final_robot: None,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn canvas(&self) -> &Canvas<Rect> {
        &self.canvas
    }

    pub fn program(&self) -> &BlockGraph {
        self.canvas.graph()
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }

    /// A copy of the robot as it is right now.
    pub fn robot(&self) -> Robot {
        lock_world(&self.world).actor.clone()
    }

    pub fn at_exit(&self) -> bool {
        lock_world(&self.world).at_exit()
    }

    pub fn best_score(&self) -> Result<Option<u32>, SessionError> {
        Ok(self.scores.best_score(self.level.id)?)
    }

    /// The robot as the last finished run left it.
    pub fn final_robot(&self) -> Option<&Robot> {
        self.final_robot.as_ref()
    }

    /// The trace of the last completed run, if tracing was enabled.
    pub fn last_trace(&self) -> &[TraceEntry] {
        &self.last_trace
    }

    /// Saves `speed` and uses it from the next run.
    pub fn set_game_speed(&mut self, speed: GameSpeed) -> Result<(), SessionError> {
        self.scores.set_game_speed(speed)?;
        self.runner.set_speed(speed);
        Ok(())
    }

    /// Switches between `Stopped` and `Editor`. Has no effect while playing.
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Stopped => Mode::Editor,
            Mode::Editor => Mode::Stopped,
            Mode::Playing => Mode::Playing,
        };
        debug!(mode = %self.mode, "mode toggled");
        self.mode
    }

    fn require(&self, operation: &'static str, expected: Mode) -> Result<(), SessionError> {
        if self.mode != expected {
            return Err(SessionError::WrongMode {
                operation,
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Places a palette block. Only kinds the level offers are accepted.
    pub fn place_block(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, SessionError> {
        self.require("place_block", Mode::Editor)?;
        if !self.level.allows(kind) {
            return Err(SessionError::BlockNotAllowed { kind });
        }
        Ok(self.canvas.place_block(kind, position)?)
    }

    pub fn begin_drag(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.require("begin_drag", Mode::Editor)?;
        Ok(self.canvas.begin_drag(id)?)
    }

    pub fn drag_to(&mut self, id: NodeId, position: Position) -> Result<(), SessionError> {
        self.require("drag_to", Mode::Editor)?;
        Ok(self.canvas.drag_to(id, position)?)
    }

    pub fn drop_block(&mut self, id: NodeId) -> Result<DropOutcome, SessionError> {
        self.require("drop_block", Mode::Editor)?;
        Ok(self.canvas.drop_block(id)?)
    }

    /// Snaps `candidate` beneath `anchor` directly, skipping the drop
    /// hit-test. The slot still follows from their positions.
    pub fn connect(&mut self, candidate: NodeId, anchor: NodeId) -> Result<bool, SessionError> {
        self.require("connect", Mode::Editor)?;
        Ok(self.canvas.graph_mut().snap(candidate, anchor))
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// Resets the world and runs a snapshot of the current program.
    pub fn start_run(&mut self) -> Result<(), SessionError> {
        self.require("start_run", Mode::Stopped)?;
        lock_world(&self.world).reset();

        let snapshot = self.canvas.graph().clone();
        self.running_blocks = u32::try_from(snapshot.node_count()).unwrap_or(u32::MAX);
        self.last_trace.clear();
        self.final_robot = None;
        self.events = Some(self.runner.start(snapshot));
        self.mode = Mode::Playing;
        info!(level = self.level.id, blocks = self.running_blocks, "playing");
        Ok(())
    }

    /// Cancels the run, resets the world and returns to `Stopped`. Does
    /// nothing unless playing.
    pub fn stop_run(&mut self) {
        if self.mode != Mode::Playing {
            return;
        }
        self.runner.stop();
        self.events = None;
        lock_world(&self.world).reset();
        self.mode = Mode::Stopped;
    }

    pub fn fast_forward(&mut self, on: bool) -> Result<(), SessionError> {
        self.require("fast_forward", Mode::Playing)?;
        self.runner.set_fast_forward(on);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Waits for the current run to end and reports how.
    ///
    /// A win records the score and stops the run. A run that ends anywhere
    /// else leaves the robot in place until [`stop_run`](Self::stop_run).
    /// Returns `None` when no run is in progress.
    pub async fn next_outcome(&mut self) -> Result<Option<RunOutcome>, SessionError> {
        loop {
            let event = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => return Ok(None),
            };
            let Some(event) = event else {
                self.events = None;
                return Ok(None);
            };

            match event {
                RunEvent::Started { .. } | RunEvent::Stepped { .. } => continue,
                RunEvent::Completed { steps, trace } => {
                    self.events = None;
                    self.last_trace = trace;
                    self.final_robot = Some(self.robot());
                    if !self.at_exit() {
                        info!(steps, "finished away from the exit");
                        return Ok(Some(RunOutcome::Finished { steps }));
                    }
                    let score = self.running_blocks;
                    let new_best = self.scores.record_score(self.level.id, score)?;
                    info!(level = self.level.id, score, new_best, "level completed");
                    self.stop_run();
                    return Ok(Some(RunOutcome::Won { score, new_best, steps }));
                }
                RunEvent::Aborted { steps, error } => {
                    self.events = None;
                    self.final_robot = Some(self.robot());
                    return Ok(Some(RunOutcome::Aborted { steps, error }));
                }
            }
        }
    }
}
