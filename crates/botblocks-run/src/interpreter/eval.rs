//! Per-kind block behaviour.
//!
//! [`eval_node`] applies one block to the world and returns the block its
//! own slots select next. Ascending out of a finished chain is handled by
//! the interpreter in `state.rs`.

use botblocks_core::{Condition, LoopCondition, Node, NodeId, NodeKind, Slot};
use botblocks_world::{Actor, MapOracle, World};
use rand::seq::SliceRandom;
use rand::RngCore;

/// Messages a `Speak` block picks from.
pub const SPEECH: [&str; 3] = ["hint_1", "hint_2", "comment_1"];

/// Runs `node` against `world` and returns the next block selected by its
/// slots. `id` is the handle of `node`; an empty loop yields itself.
pub fn eval_node<M: MapOracle, A: Actor>(
    id: NodeId,
    node: &Node,
    world: &mut World<M, A>,
    rng: &mut dyn RngCore,
) -> Option<NodeId> {
    match node.kind() {
        NodeKind::Start => node.get(Slot::Child),
        NodeKind::Move => {
            world.actor.move_forward(&world.map);
            node.get(Slot::Child)
        }
        NodeKind::RotateLeft => {
            world.actor.rotate_left();
            node.get(Slot::Child)
        }
        NodeKind::RotateRight => {
            world.actor.rotate_right();
            node.get(Slot::Child)
        }
        NodeKind::Speak => {
            let message = SPEECH.choose(rng).copied().unwrap_or(SPEECH[0]);
            world.actor.speak(message);
            node.get(Slot::Child)
        }
        NodeKind::Interact => {
            world.actor.interact(&world.map);
            node.get(Slot::Child)
        }
        NodeKind::Conditional(condition) => {
            if condition_holds(condition, world) {
                node.get(Slot::Success)
            } else {
                node.get(Slot::Failure)
            }
        }
        NodeKind::Loop(condition) => {
            if loop_holds(condition, world) {
                Some(node.get(Slot::Body).unwrap_or(id))
            } else {
                node.get(Slot::Sequel)
            }
        }
    }
}

pub fn condition_holds<M: MapOracle, A: Actor>(condition: Condition, world: &World<M, A>) -> bool {
    match condition {
        Condition::FrontTraversable => world.front_traversable(),
        Condition::FrontIsButton => world.front_is_button(),
    }
}

pub fn loop_holds<M: MapOracle, A: Actor>(condition: LoopCondition, world: &World<M, A>) -> bool {
    match condition {
        LoopCondition::NotAtExit => !world.at_exit(),
        LoopCondition::FrontTraversable => world.front_traversable(),
    }
}
