//! Session controller: mode gating, runs and score recording.

use std::time::Duration;

use botblocks_core::{DropOutcome, LoopCondition, NodeKind, Position, Rect};
use botblocks_run::{Mode, RunError, RunOutcome, RunnerConfig, Session, SessionError};
use botblocks_storage::{GameSpeed, InMemoryScores, ScoreStore};
use botblocks_world::{Actor, Coord, LevelCatalog};

fn session(level: u32, config: RunnerConfig) -> Session<InMemoryScores> {
    let level = LevelCatalog::seeded().get(level).unwrap().clone();
    let board = Rect::around(Position::new(0.0, 0.0), 10.0, 10.0);
    Session::new(level, board, Position::new(0.0, 8.0), InMemoryScores::new(), config).unwrap()
}

fn quick() -> RunnerConfig {
    RunnerConfig {
        step_delay: Duration::from_millis(10),
        ..RunnerConfig::default()
    }
}

#[test]
fn editing_requires_editor_mode() {
    let mut s = session(1, quick());
    assert_eq!(s.mode(), Mode::Stopped);
    assert!(matches!(
        s.place_block(NodeKind::Move, Position::new(0.0, 0.0)),
        Err(SessionError::WrongMode { expected: Mode::Editor, actual: Mode::Stopped, .. })
    ));

    assert_eq!(s.toggle_mode(), Mode::Editor);
    let id = s.place_block(NodeKind::Move, Position::new(0.2, 7.3)).unwrap();
    assert!(matches!(s.drop_block(id).unwrap(), DropOutcome::Snapped { .. }));
    assert!(matches!(
        s.place_block(NodeKind::RotateLeft, Position::new(0.0, 0.0)),
        Err(SessionError::BlockNotAllowed { kind: NodeKind::RotateLeft })
    ));
    assert_eq!(s.toggle_mode(), Mode::Stopped);
}

#[tokio::test(start_paused = true)]
async fn winning_run_records_score_and_stops() {
    let mut s = session(1, quick());
    s.toggle_mode();
    let a = s.place_block(NodeKind::Move, Position::new(0.2, 7.3)).unwrap();
    s.drop_block(a).unwrap();
    let b = s.place_block(NodeKind::Move, Position::new(0.1, 6.4)).unwrap();
    assert!(matches!(s.drop_block(b).unwrap(), DropOutcome::Snapped { anchor, .. } if anchor == a));
    assert_eq!(s.program().node_count(), 3);

    // Runs start from Stopped only.
    assert!(matches!(s.start_run(), Err(SessionError::WrongMode { .. })));
    s.toggle_mode();
    s.start_run().unwrap();
    assert_eq!(s.mode(), Mode::Playing);
    assert_eq!(s.toggle_mode(), Mode::Playing);
    assert!(s.begin_drag(a).is_err());

    let outcome = s.next_outcome().await.unwrap();
    assert_eq!(outcome, Some(RunOutcome::Won { score: 3, new_best: true, steps: 3 }));
    assert_eq!(s.mode(), Mode::Stopped);
    assert_eq!(s.best_score().unwrap(), Some(3));
    // Stopping resets the robot; the final state is kept aside.
    assert_eq!(s.robot().position(), Coord::new(1, 0));
    assert_eq!(s.final_robot().map(|r| r.position()), Some(Coord::new(1, 2)));
    assert_eq!(s.final_robot().map(|r| r.moves()), Some(2));

    s.start_run().unwrap();
    let outcome = s.next_outcome().await.unwrap();
    assert_eq!(outcome, Some(RunOutcome::Won { score: 3, new_best: false, steps: 3 }));
    assert_eq!(s.next_outcome().await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn finishing_away_from_exit_keeps_playing() {
    let mut s = session(1, quick());
    s.toggle_mode();
    let speak = s.place_block(NodeKind::Speak, Position::new(0.0, 7.4)).unwrap();
    s.drop_block(speak).unwrap();
    s.toggle_mode();

    s.start_run().unwrap();
    let outcome = s.next_outcome().await.unwrap();
    assert_eq!(outcome, Some(RunOutcome::Finished { steps: 2 }));
    assert_eq!(s.mode(), Mode::Playing);
    assert_eq!(s.robot().spoken().len(), 1);
    assert_eq!(s.best_score().unwrap(), None);

    s.stop_run();
    s.stop_run();
    assert_eq!(s.mode(), Mode::Stopped);
    assert!(s.robot().spoken().is_empty());
}

#[tokio::test(start_paused = true)]
async fn spinning_loop_is_aborted_by_step_limit() {
    let config = RunnerConfig {
        max_steps: Some(25),
        ..quick()
    };
    let mut s = session(5, config);
    s.toggle_mode();
    let lp = s
        .place_block(NodeKind::Loop(LoopCondition::NotAtExit), Position::new(0.0, 7.4))
        .unwrap();
    s.drop_block(lp).unwrap();
    s.toggle_mode();

    s.start_run().unwrap();
    s.fast_forward(true).unwrap();
    let outcome = s.next_outcome().await.unwrap();
    assert!(matches!(
        outcome,
        Some(RunOutcome::Aborted { steps: 25, error: RunError::StepLimitExceeded { .. } })
    ));
    s.stop_run();
    assert!(!s.is_running());
    assert!(matches!(s.fast_forward(true), Err(SessionError::WrongMode { .. })));
}

#[test]
fn game_speed_is_persisted() {
    let mut s = session(2, quick());
    s.set_game_speed(GameSpeed::Fast).unwrap();
    assert_eq!(s.scores().game_speed().unwrap(), GameSpeed::Fast);
}
