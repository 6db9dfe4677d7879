//! Drag-and-drop on top of [`BlockGraph`].
//!
//! Picking up an attached block disconnects it (healing the chain it came
//! from). Releasing it outside the board deletes it; releasing it inside
//! tries, nearest first, to snap it beneath every block within the snap
//! radius and stops at the first success.

use serde::Serialize;
use tracing::debug;

use crate::board::BoardBounds;
use crate::error::CoreError;
use crate::graph::BlockGraph;
use crate::id::NodeId;
use crate::node::{NodeKind, Position, Slot};

/// Radius around a released block searched for snap anchors.
pub const SNAP_RADIUS: f32 = 1.0;

/// What happened to a released block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DropOutcome {
    /// Snapped beneath `anchor` in `slot`.
    Snapped { anchor: NodeId, slot: Slot },
    /// Left free on the canvas.
    Placed,
    /// Released outside the board and destroyed.
    Deleted,
}

/// The editing surface: a block graph plus board bounds and drag state.
#[derive(Debug, Clone)]
pub struct Canvas<B> {
    graph: BlockGraph,
    board: B,
    snap_radius: f32,
    dragging: Option<NodeId>,
}

impl<B: BoardBounds> Canvas<B> {
    /// Creates a canvas whose start block sits at `root_position`.
    pub fn new(board: B, root_position: Position) -> Self {
        Canvas {
            graph: BlockGraph::new(root_position),
            board,
            snap_radius: SNAP_RADIUS,
            dragging: None,
        }
    }

    pub fn with_snap_radius(mut self, radius: f32) -> Self {
        self.snap_radius = radius;
        self
    }

    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut BlockGraph {
        &mut self.graph
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// The block currently held, if any.
    pub fn dragging(&self) -> Option<NodeId> {
        self.dragging
    }

    /// Returns `true` if releasing at `point` would delete the block.
    pub fn is_over_bin(&self, point: Position) -> bool {
        !self.board.contains(point)
    }

    /// Places a detached block, as a palette click does.
    pub fn place_block(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, CoreError> {
        self.graph.place_node(kind, position)
    }

    /// Places a block and immediately picks it up, as a palette drag does.
    pub fn spawn_dragging(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, CoreError> {
        let id = self.graph.place_node(kind, position)?;
        self.dragging = Some(id);
        Ok(id)
    }

    /// Picks up `id`, detaching it from its neighbours first.
    pub fn begin_drag(&mut self, id: NodeId) -> Result<(), CoreError> {
        if id == self.graph.root() {
            return Err(CoreError::RootIsFixed { id });
        }
        if self.graph.node(id)?.is_attached() {
            self.graph.disconnect(id)?;
        }
        self.dragging = Some(id);
        Ok(())
    }

    /// Moves a held block to `position`.
    pub fn drag_to(&mut self, id: NodeId, position: Position) -> Result<(), CoreError> {
        if id == self.graph.root() {
            return Err(CoreError::RootIsFixed { id });
        }
        self.graph.move_node(id, position)
    }

    /// Releases `id` where it currently is.
    pub fn drop_block(&mut self, id: NodeId) -> Result<DropOutcome, CoreError> {
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        let position = self.graph.node(id)?.position();

        if !self.board.contains(position) {
            self.graph.remove_node(id)?;
            debug!(%id, %position, "dropped outside the board");
            return Ok(DropOutcome::Deleted);
        }

        for anchor in self.hit_test(id) {
            if self.graph.snap(id, anchor) {
                let slot = self
                    .graph
                    .parent_slot(id)
                    .map(|(_, slot)| slot)
                    .unwrap_or(Slot::Child);
                return Ok(DropOutcome::Snapped { anchor, slot });
            }
        }
        Ok(DropOutcome::Placed)
    }

    /// Blocks within the snap radius of `id`, nearest first. Blocks at the
    /// exact same position are skipped.
    pub fn hit_test(&self, id: NodeId) -> Vec<NodeId> {
        let Some(origin) = self.graph.get(id).map(|n| n.position()) else {
            return Vec::new();
        };
        let mut hits: Vec<(NodeId, f32)> = self
            .graph
            .live_nodes()
            .filter(|&other| other != id)
            .filter_map(|other| {
                let position = self.graph.get(other)?.position();
                let distance = origin.distance(position);
                (position != origin && distance <= self.snap_radius).then_some((other, distance))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.into_iter().map(|(other, _)| other).collect()
    }
}
