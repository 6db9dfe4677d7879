//! Programs whose links were damaged after assembly abort instead of
//! wandering off.

use botblocks_core::{BlockGraph, NodeId, NodeKind, Position, Slot};
use botblocks_run::{ExecutionState, Interpreter, InterpreterConfig, RunError};
use botblocks_world::World;

fn program_with_move() -> (BlockGraph, NodeId) {
    let mut g = BlockGraph::new(Position::new(0.0, 0.0));
    let root = g.root();
    let step = g.place_node(NodeKind::Move, Position::new(0.0, -1.0)).unwrap();
    assert!(g.snap(step, root));
    (g, step)
}

#[test]
fn parent_that_does_not_own_the_block_aborts() {
    let (mut g, step) = program_with_move();
    let stranger = g.place_node(NodeKind::Speak, Position::new(9.0, 9.0)).unwrap();
    g.set_parent_unchecked(step, Some(stranger));
    assert!(g.check_consistency().is_err());

    let mut world = World::from_text("E\nO\nS").unwrap();
    let mut interp = Interpreter::new(&g, InterpreterConfig::default());
    interp.start(g.root());

    assert_eq!(
        interp.run(&mut world),
        &ExecutionState::Aborted {
            error: RunError::Corrupted { node: step, parent: stranger },
        }
    );
    // The move itself ran before the climb found the damage.
    assert_eq!(interp.steps(), 2);
    assert_eq!(world.actor.moves(), 1);
}

#[test]
fn slot_naming_a_missing_block_aborts() {
    let (mut g, step) = program_with_move();
    let ghost = NodeId(999);
    assert!(g.set_slot_unchecked(step, Slot::Child, Some(ghost)));

    let mut world = World::from_text("E\nO\nS").unwrap();
    let mut interp = Interpreter::new(&g, InterpreterConfig::default());
    interp.start(g.root());

    assert_eq!(
        interp.run(&mut world),
        &ExecutionState::Aborted {
            error: RunError::MissingNode { node: ghost },
        }
    );
    assert_eq!(interp.steps(), 2);
}
