//! End-to-end runs through the async driver on a paused clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use botblocks_core::{BlockGraph, Condition, LoopCondition, NodeId, NodeKind, Position, Slot};
use botblocks_run::{RunError, RunEvent, Runner, RunnerConfig};
use botblocks_world::{Actor, Coord, Direction, World};
use tokio::time::Instant;

fn shared(map: &str) -> Arc<Mutex<World>> {
    Arc::new(Mutex::new(World::from_text(map).unwrap()))
}

fn place(g: &mut BlockGraph, kind: NodeKind, x: f32, y: f32) -> NodeId {
    g.place_node(kind, Position::new(x, y)).unwrap()
}

async fn drain(events: &mut tokio::sync::mpsc::UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let mut out = Vec::new();
    while let Some(event) = events.recv().await {
        out.push(event);
    }
    out
}

/// root -> Move -> If(front clear) { Move -> Move } else { RotateRight }
fn conditional_program() -> BlockGraph {
    let mut g = BlockGraph::new(Position::new(0.0, 0.0));
    let root = g.root();
    let first = place(&mut g, NodeKind::Move, 0.0, 0.0);
    assert!(g.snap(first, root));
    let cond = place(&mut g, NodeKind::Conditional(Condition::FrontTraversable), 0.0, 0.0);
    assert!(g.snap(cond, first));
    let yes = place(&mut g, NodeKind::Move, -1.0, -3.0);
    assert!(g.snap(yes, cond));
    let yes_again = place(&mut g, NodeKind::Move, 0.0, 0.0);
    assert!(g.snap(yes_again, yes));
    let no = place(&mut g, NodeKind::RotateRight, 1.0, -3.0);
    assert!(g.snap(no, cond));
    assert_eq!(g.parent_slot(yes), Some((cond, Slot::Success)));
    assert_eq!(g.parent_slot(no), Some((cond, Slot::Failure)));
    g
}

#[tokio::test(start_paused = true)]
async fn conditional_scenario_moves_three_times() {
    let world = shared("E\nO\nO\nS");
    let mut runner = Runner::new(Arc::clone(&world), RunnerConfig::default());

    let mut events = runner.start(conditional_program());
    let events = drain(&mut events).await;

    assert!(matches!(events.first(), Some(RunEvent::Started { .. })));
    assert!(matches!(events.last(), Some(RunEvent::Completed { steps: 5, .. })));
    let world = world.lock().unwrap();
    assert_eq!(world.actor.moves(), 3);
    assert_eq!(world.actor.turns(), 0);
    assert!(world.at_exit());
}

#[tokio::test(start_paused = true)]
async fn loop_walks_corridor_to_exit_then_runs_sequel() {
    let mut g = BlockGraph::new(Position::new(0.0, 0.0));
    let root = g.root();
    let lp = place(&mut g, NodeKind::Loop(LoopCondition::NotAtExit), 0.0, 0.0);
    assert!(g.snap(lp, root));
    let body = place(&mut g, NodeKind::Move, 3.0, -1.0);
    assert!(g.snap(body, lp));
    let sequel = place(&mut g, NodeKind::RotateRight, -1.0, -2.0);
    assert!(g.snap(sequel, lp));
    assert_eq!(g.parent_slot(sequel), Some((lp, Slot::Sequel)));

    let world = shared("E\nO\nO\nO\nO\nS");
    let config = RunnerConfig {
        trace_enabled: true,
        ..RunnerConfig::default()
    };
    let mut runner = Runner::new(Arc::clone(&world), config);
    let mut events = runner.start(g);
    let events = drain(&mut events).await;

    // Root, five rounds of loop + move, the exiting loop check, the sequel.
    let Some(RunEvent::Completed { steps: 13, trace }) = events.last() else {
        panic!("unexpected end: {:?}", events.last());
    };
    let sequel_ticks: Vec<_> = trace.iter().filter(|entry| entry.node == sequel).collect();
    assert_eq!(sequel_ticks.len(), 1);
    assert_eq!(sequel_ticks[0].step, 13);
    assert_eq!(sequel_ticks[0].position, Coord::new(0, 5));
    let moves_before = trace
        .iter()
        .filter(|entry| entry.node == body && entry.step < sequel_ticks[0].step)
        .count();
    assert_eq!(moves_before, 5);

    let world = world.lock().unwrap();
    assert_eq!(world.actor.moves(), 5);
    assert_eq!(world.actor.turns(), 1);
    assert_eq!(world.actor.position(), Coord::new(0, 5));
    assert_eq!(world.actor.facing(), Direction::Right);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent_and_freezes_the_world() {
    let mut g = BlockGraph::new(Position::new(0.0, 0.0));
    let root = g.root();
    let lp = place(&mut g, NodeKind::Loop(LoopCondition::NotAtExit), 0.0, 0.0);
    assert!(g.snap(lp, root));
    let body = place(&mut g, NodeKind::RotateLeft, 3.0, -1.0);
    assert!(g.snap(body, lp));

    // The exit is unreachable, so the loop spins forever.
    let world = shared("SXE");
    let mut runner = Runner::new(Arc::clone(&world), RunnerConfig::default());
    let _events = runner.start(g);

    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert!(runner.is_running());
    assert!(runner.stop());
    assert!(!runner.stop());
    assert!(!runner.is_running());

    let turns = world.lock().unwrap().actor.turns();
    assert!(turns > 0);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(world.lock().unwrap().actor.turns(), turns);
}

#[tokio::test(start_paused = true)]
async fn fast_forward_shortens_the_pause() {
    let program = || {
        let mut g = BlockGraph::new(Position::new(0.0, 0.0));
        let root = g.root();
        let a = place(&mut g, NodeKind::Move, 0.0, 0.0);
        let b = place(&mut g, NodeKind::Move, 0.0, 0.0);
        assert!(g.snap(a, root));
        assert!(g.snap(b, a));
        g
    };

    let world = shared("E\nO\nS");
    let mut runner = Runner::new(Arc::clone(&world), RunnerConfig::default());

    let began = Instant::now();
    let mut events = runner.start(program());
    drain(&mut events).await;
    let normal = began.elapsed();

    world.lock().unwrap().reset();
    let began = Instant::now();
    let mut events = runner.start(program());
    runner.set_fast_forward(true);
    drain(&mut events).await;
    let fast = began.elapsed();

    // Two pauses: after the root and after the first move.
    assert!(normal >= Duration::from_secs(2), "{normal:?}");
    assert!(fast < Duration::from_secs(1), "{fast:?}");
    assert!(world.lock().unwrap().at_exit());
}

#[tokio::test(start_paused = true)]
async fn step_limit_aborts_the_run() {
    let mut g = BlockGraph::new(Position::new(0.0, 0.0));
    let root = g.root();
    let lp = place(&mut g, NodeKind::Loop(LoopCondition::NotAtExit), 0.0, 0.0);
    assert!(g.snap(lp, root));

    let world = shared("SE");
    let config = RunnerConfig {
        max_steps: Some(8),
        ..RunnerConfig::default()
    };
    let mut runner = Runner::new(world, config);
    let mut events = runner.start(g);
    let events = drain(&mut events).await;

    assert!(matches!(
        events.last(),
        Some(RunEvent::Aborted { steps: 8, error: RunError::StepLimitExceeded { limit: 8, .. } })
    ));
}

#[tokio::test(start_paused = true)]
async fn seeded_speech_is_reproducible() {
    let program = || {
        let mut g = BlockGraph::new(Position::new(0.0, 0.0));
        let mut previous = g.root();
        for _ in 0..6 {
            let id = place(&mut g, NodeKind::Speak, 0.0, 0.0);
            assert!(g.snap(id, previous));
            previous = id;
        }
        g
    };
    let config = RunnerConfig {
        speech_seed: Some(42),
        step_delay: Duration::from_millis(10),
        ..RunnerConfig::default()
    };

    let mut spoken = Vec::new();
    for _ in 0..2 {
        let world = shared("SE");
        let mut runner = Runner::new(Arc::clone(&world), config.clone());
        let mut events = runner.start(program());
        drain(&mut events).await;
        let said = world.lock().unwrap().actor.spoken().to_vec();
        spoken.push(said);
    }
    assert_eq!(spoken[0].len(), 6);
    assert_eq!(spoken[0], spoken[1]);
}
