//! Property tests: random editing sessions never break the link invariants.

use botblocks_core::{BlockGraph, NodeId, NodeKind, Position, Slot};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Place { kind: usize, x: i8, y: i8 },
    Snap { candidate: usize, anchor: usize },
    Disconnect { node: usize },
    Remove { node: usize },
    Move { node: usize, x: i8, y: i8 },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..NodeKind::PALETTE.len(), any::<i8>(), any::<i8>())
            .prop_map(|(kind, x, y)| Op::Place { kind, x, y }),
        4 => (any::<usize>(), any::<usize>())
            .prop_map(|(candidate, anchor)| Op::Snap { candidate, anchor }),
        2 => any::<usize>().prop_map(|node| Op::Disconnect { node }),
        1 => any::<usize>().prop_map(|node| Op::Remove { node }),
        1 => (any::<usize>(), any::<i8>(), any::<i8>())
            .prop_map(|(node, x, y)| Op::Move { node, x, y }),
    ]
}

fn pick(graph: &BlockGraph, index: usize) -> NodeId {
    let live: Vec<NodeId> = graph.live_nodes().collect();
    live[index % live.len()]
}

fn apply(graph: &mut BlockGraph, op: &Op) {
    match *op {
        Op::Place { kind, x, y } => {
            let position = Position::new(f32::from(x) / 8.0, f32::from(y) / 8.0);
            graph.place_node(NodeKind::PALETTE[kind], position).unwrap();
        }
        Op::Snap { candidate, anchor } => {
            let candidate = pick(graph, candidate);
            let anchor = pick(graph, anchor);
            let had_parent = graph.node(candidate).unwrap().parent().is_some();
            let snapped = graph.snap(candidate, anchor);
            if had_parent {
                assert!(!snapped, "a parented block was snapped again");
            }
            if snapped {
                assert_eq!(graph.node(candidate).unwrap().parent(), Some(anchor));
            }
        }
        Op::Disconnect { node } => {
            let node = pick(graph, node);
            graph.disconnect(node).unwrap();
        }
        Op::Remove { node } => {
            let node = pick(graph, node);
            let _ = graph.remove_node(node);
        }
        Op::Move { node, x, y } => {
            let node = pick(graph, node);
            let position = Position::new(f32::from(x) / 8.0, f32::from(y) / 8.0);
            graph.move_node(node, position).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn links_stay_bidirectional(ops in prop::collection::vec(op(), 1..60)) {
        let mut graph = BlockGraph::new(Position::new(0.0, 0.0));
        for op in &ops {
            apply(&mut graph, op);
            prop_assert!(graph.check_consistency().is_ok(), "after {:?}: {:?}", op, graph.check_consistency());
            prop_assert!(graph.node_count() <= graph.live_count());
            prop_assert_eq!(graph.node(graph.root()).unwrap().parent(), None);
        }
    }

    #[test]
    fn every_occupied_slot_points_back(ops in prop::collection::vec(op(), 1..40)) {
        let mut graph = BlockGraph::new(Position::new(0.0, 0.0));
        for op in &ops {
            apply(&mut graph, op);
        }
        for id in graph.live_nodes() {
            let node = graph.node(id).unwrap();
            for (slot, child) in node.slots().occupied() {
                prop_assert_eq!(graph.node(child).unwrap().parent(), Some(id));
                prop_assert_eq!(graph.parent_slot(child), Some((id, slot)));
            }
        }
    }
}

#[test]
fn disconnecting_every_block_leaves_only_orphans() {
    let mut graph = BlockGraph::new(Position::new(0.0, 0.0));
    let root = graph.root();
    let mut previous = root;
    for _ in 0..5 {
        let id = graph.place_node(NodeKind::Move, Position::new(0.0, -1.0)).unwrap();
        assert!(graph.snap(id, previous));
        previous = id;
    }
    assert_eq!(graph.node_count(), 6);

    let ids: Vec<NodeId> = graph.live_nodes().filter(|&id| id != root).collect();
    for id in ids {
        graph.disconnect(id).unwrap();
        graph.check_consistency().unwrap();
    }
    // Each disconnect heals the chain until nothing is left under the root.
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.live_count(), 6);
    assert_eq!(graph.node(root).unwrap().get(Slot::Child), None);
}
