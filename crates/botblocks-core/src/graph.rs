//! BlockGraph: the arena of placed blocks and the snap/disconnect protocol.
//!
//! [`BlockGraph`] owns every live block in a petgraph `StableGraph` used as a
//! slab, so a [`NodeId`] stays valid until its block is removed. Links live
//! in the node records as `Option<NodeId>` fields and are only ever written
//! by [`BlockGraph::snap`], [`BlockGraph::disconnect`] and the repair pass,
//! which keep both directions of every link consistent:
//!
//! - if `a.slots.get(s) == Some(b)` then `b.parent == Some(a)`, and
//! - if `b.parent == Some(a)` then exactly one slot of `a` holds `b`.
//!
//! The root (`NodeKind::Start`) is created with the graph, never has a
//! parent and cannot be removed. Blocks not reachable from the root are
//! orphans: they stay on the canvas but do not execute.

use std::collections::HashSet;

use indexmap::IndexSet;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::NodeIndex;
use petgraph::graphmap::DiGraphMap;
use petgraph::stable_graph::StableGraph;
use petgraph::Directed;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::id::NodeId;
use crate::layout;
use crate::node::{Node, NodeKind, Position, Slot};

/// The block arena plus the live-node registry.
#[derive(Debug, Clone)]
pub struct BlockGraph {
    /// Block storage. No edges are stored; links live in the node records.
    arena: StableGraph<Node, (), Directed, u32>,
    /// Live blocks in placement order.
    live: IndexSet<NodeId>,
    root: NodeId,
}

impl BlockGraph {
    /// Creates a graph holding only the start block at `root_position`.
    pub fn new(root_position: Position) -> Self {
        let mut arena = StableGraph::new();
        let root = NodeId::from(arena.add_node(Node::new(NodeKind::Start, root_position)));
        let mut live = IndexSet::new();
        live.insert(root);
        BlockGraph { arena, live, root }
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.node_weight(NodeIndex::from(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Like [`get`](Self::get) but with a typed error for unknown handles.
    pub fn node(&self, id: NodeId) -> Result<&Node, CoreError> {
        self.get(id).ok_or(CoreError::NodeNotFound { id })
    }

    /// Live blocks in placement order, root first.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.live.iter().copied()
    }

    /// Number of live blocks, orphans included.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of blocks in the executable tree, including the root.
    pub fn node_count(&self) -> usize {
        self.subtree(self.root).len()
    }

    /// Returns `true` if `id` is reachable from the root.
    pub fn is_executable(&self, id: NodeId) -> bool {
        self.ancestors(id).last().copied().unwrap_or(id) == self.root
    }

    /// The parent of `id` and the parent's slot holding it.
    pub fn parent_slot(&self, id: NodeId) -> Option<(NodeId, Slot)> {
        let parent = self.get(id)?.parent?;
        let slot = self.get(parent)?.slots.slot_of(id)?;
        Some((parent, slot))
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|n| n.parent);
        while let Some(parent) = cursor {
            // A corrupted parent cycle must not hang the walk.
            if parent == id || out.contains(&parent) {
                break;
            }
            out.push(parent);
            cursor = self.get(parent).and_then(|n| n.parent);
        }
        out
    }

    /// Returns `true` if `ancestor` lies on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// `id` and every block below it, in pre-order (loop bodies before
    /// sequels, success before failure).
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            if !seen.insert(current) {
                continue;
            }
            out.push(current);
            for (_, child) in node.slots.occupied().into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// The lowest y coordinate of any block in the subtree of `id`.
    pub fn lowest_y(&self, id: NodeId) -> f32 {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| self.get(n).map(|node| node.position.y))
            .fold(f32::INFINITY, f32::min)
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Places a new detached block of `kind` at `position`.
    ///
    /// The start block is unique, so `NodeKind::Start` is refused.
    pub fn place_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, CoreError> {
        if kind == NodeKind::Start {
            return Err(CoreError::RootIsFixed { id: self.root });
        }
        let id = NodeId::from(self.arena.add_node(Node::new(kind, position)));
        self.live.insert(id);
        debug!(%id, %kind, %position, "placed block");
        Ok(id)
    }

    /// Moves `id` to `position`, carrying its subtree along.
    pub fn move_node(&mut self, id: NodeId, position: Position) -> Result<(), CoreError> {
        self.node(id)?;
        self.set_subtree_position(id, position);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Snap / disconnect protocol
    // -----------------------------------------------------------------------

    /// Attaches `candidate` beneath `anchor` in the slot chosen by their
    /// horizontal positions.
    ///
    /// Returns `false` without changing anything if either handle is
    /// unknown, the candidate is the anchor or the root, the candidate
    /// already has a parent, the anchor lies inside the candidate's subtree,
    /// or the chosen slot is taken.
    ///
    /// On success the candidate is repositioned under the anchor and every
    /// sub-chain it already owned is detached, seated at its slot position
    /// under the new position and snapped back on, one level at a time. A
    /// sub-chain that does not re-snap is left on the canvas as an orphan;
    /// the call still returns `true` because the candidate itself is linked.
    pub fn snap(&mut self, candidate: NodeId, anchor: NodeId) -> bool {
        let (Some(cand), Some(anch)) = (self.get(candidate), self.get(anchor)) else {
            return false;
        };
        if candidate == anchor || candidate == self.root || cand.parent.is_some() {
            return false;
        }
        if self.is_ancestor(candidate, anchor) {
            debug!(%candidate, %anchor, "snap rejected: anchor is inside candidate's subtree");
            return false;
        }

        let slot = layout::select_slot(anch.kind, anch.position, cand.position);
        if anch.slots.get(slot).is_some() {
            debug!(%candidate, %anchor, %slot, "snap rejected: slot occupied");
            return false;
        }

        let target = self.seat(anchor, slot);
        self.link(anchor, slot, candidate);
        self.set_position(candidate, target);
        debug!(%candidate, %anchor, %slot, "snapped");

        // Cascade: detach whatever the candidate already carried, seat it in
        // its old slot relative to the new position and snap it back.
        let carried = self.arena[NodeIndex::from(candidate)].slots.occupied();
        for (child_slot, child) in carried {
            self.unlink(candidate, child_slot);
            let seat = self.seat(candidate, child_slot);
            self.set_subtree_position(child, seat);
            if !self.snap(child, candidate) {
                warn!(%child, %candidate, "cascade re-snap failed; child left detached");
            }
        }
        true
    }

    /// Detaches `id` from its parent and from all of its children.
    ///
    /// If `id` had both a parent and a successor (`child`, or a loop's
    /// `sequel`), the successor is snapped onto the former parent so the
    /// chain closes over the gap. Conditional branches and loop bodies are
    /// never merged upwards; they stay on the canvas as orphans. Finally the
    /// former neighbours get a [`handle_missing_nodes`](Self::handle_missing_nodes)
    /// pass.
    pub fn disconnect(&mut self, id: NodeId) -> Result<(), CoreError> {
        let node = self.node(id)?;
        let previous_parent = node.parent;
        let previous_children = node.slots.occupied();
        let vacated = self.parent_slot(id);

        if let Some(parent) = previous_parent {
            if let Some(slot) = self.get(parent).and_then(|p| p.slots.slot_of(id)) {
                self.unlink(parent, slot);
            } else {
                self.arena[NodeIndex::from(id)].parent = None;
            }
        }
        for &(slot, _) in &previous_children {
            self.unlink(id, slot);
        }

        if let Some((parent, slot)) = vacated {
            let successor = previous_children
                .iter()
                .find(|(slot, _)| slot.is_successor())
                .map(|&(_, child)| child);
            if let Some(successor) = successor {
                let seat = self.seat(parent, slot);
                self.set_subtree_position(successor, seat);
                let healed = self.snap(successor, parent);
                debug!(%id, %parent, %successor, healed, "healed chain");
            }
        }

        if let Some(parent) = previous_parent {
            self.handle_missing_nodes(parent);
        }
        for (_, child) in previous_children {
            self.handle_missing_nodes(child);
        }
        debug!(%id, "disconnected");
        Ok(())
    }

    /// Disconnects `id` and removes it from the live registry. Only the
    /// single block is destroyed; branches it owned become orphans.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, CoreError> {
        if id == self.root {
            return Err(CoreError::RootIsFixed { id });
        }
        self.disconnect(id)?;
        let node = self
            .arena
            .remove_node(NodeIndex::from(id))
            .ok_or(CoreError::NodeNotFound { id })?;
        self.live.shift_remove(&id);
        debug!(%id, kind = %node.kind, "removed block");
        Ok(node)
    }

    // -----------------------------------------------------------------------
    // Consistency
    // -----------------------------------------------------------------------

    /// Nulls any slot of `id` whose target does not point back, and the
    /// parent reference if that parent no longer owns `id`. Returns the
    /// number of links cleared.
    pub fn handle_missing_nodes(&mut self, id: NodeId) -> usize {
        let Some(node) = self.get(id) else {
            return 0;
        };

        let stale_slots: Vec<Slot> = node
            .slots
            .occupied()
            .into_iter()
            .filter(|&(_, child)| self.get(child).and_then(|c| c.parent) != Some(id))
            .map(|(slot, _)| slot)
            .collect();
        let stale_parent = node.parent.is_some_and(|parent| {
            self.get(parent)
                .and_then(|p| p.slots.slot_of(id))
                .is_none()
        });

        let node = &mut self.arena[NodeIndex::from(id)];
        for &slot in &stale_slots {
            node.slots.set(slot, None);
        }
        if stale_parent {
            node.parent = None;
        }

        let cleared = stale_slots.len() + usize::from(stale_parent);
        if cleared > 0 {
            warn!(%id, cleared, "cleared dangling links");
        }
        cleared
    }

    /// Runs [`handle_missing_nodes`](Self::handle_missing_nodes) over every
    /// live block. Returns the total number of links cleared.
    pub fn repair(&mut self) -> usize {
        let ids: Vec<NodeId> = self.live.iter().copied().collect();
        ids.into_iter().map(|id| self.handle_missing_nodes(id)).sum()
    }

    /// Verifies bidirectional links, the parentless root, registry/arena
    /// agreement and acyclicity.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        let inconsistent = |reason: String| Err(CoreError::GraphInconsistency { reason });

        if self.live.len() != self.arena.node_count() {
            return inconsistent(format!(
                "registry holds {} blocks but arena holds {}",
                self.live.len(),
                self.arena.node_count()
            ));
        }
        match self.get(self.root) {
            Some(root) if root.kind == NodeKind::Start && root.parent.is_none() => {}
            Some(_) => return inconsistent(format!("root {} is not a parentless start", self.root)),
            None => return inconsistent(format!("root {} is missing", self.root)),
        }

        let mut links = DiGraphMap::<NodeId, Slot>::new();
        for &id in &self.live {
            let node = self.node(id)?;
            links.add_node(id);
            if let Some(parent) = node.parent {
                let owns = self.get(parent).and_then(|p| p.slots.slot_of(id)).is_some();
                if !owns {
                    return inconsistent(format!("{id} names {parent} as parent but is not its child"));
                }
            }
            for (slot, child) in node.slots.occupied() {
                if self.get(child).and_then(|c| c.parent) != Some(id) {
                    return inconsistent(format!("{id}.{slot} holds {child} which does not point back"));
                }
                links.add_edge(id, child, slot);
            }
        }
        if is_cyclic_directed(&links) {
            return inconsistent("slot links form a cycle".to_string());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Outline
    // -----------------------------------------------------------------------

    /// Renders the executable tree as indented text.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_chain(Some(self.root), 0, &mut out);
        out
    }

    fn outline_chain(&self, mut cursor: Option<NodeId>, depth: usize, out: &mut String) {
        let pad = |depth: usize| "  ".repeat(depth);
        while let Some(id) = cursor {
            let Some(node) = self.get(id) else {
                return;
            };
            out.push_str(&format!("{}{}\n", pad(depth), node.kind));
            cursor = match node.slots.get(Slot::Success).or(node.slots.get(Slot::Failure)) {
                Some(_) => {
                    for (slot, header) in [(Slot::Success, "then:"), (Slot::Failure, "else:")] {
                        if let Some(branch) = node.slots.get(slot) {
                            out.push_str(&format!("{}{header}\n", pad(depth + 1)));
                            self.outline_chain(Some(branch), depth + 2, out);
                        }
                    }
                    None
                }
                None => {
                    if let Some(body) = node.slots.get(Slot::Body) {
                        out.push_str(&format!("{}do:\n", pad(depth + 1)));
                        self.outline_chain(Some(body), depth + 2, out);
                    }
                    node.slots.get(Slot::Child).or(node.slots.get(Slot::Sequel))
                }
            };
        }
    }

    // -----------------------------------------------------------------------
    // Internal link primitives
    // -----------------------------------------------------------------------

    /// Writes both directions of `parent.slot -> child`.
    fn link(&mut self, parent: NodeId, slot: Slot, child: NodeId) {
        let written = self.arena[NodeIndex::from(parent)].slots.set(slot, Some(child));
        debug_assert!(written, "slot {slot} does not exist on {parent}");
        self.arena[NodeIndex::from(child)].parent = Some(parent);
    }

    /// Clears both directions of `parent.slot -> child`.
    fn unlink(&mut self, parent: NodeId, slot: Slot) {
        let Some(child) = self.get(parent).and_then(|p| p.slots.get(slot)) else {
            return;
        };
        self.arena[NodeIndex::from(parent)].slots.set(slot, None);
        if let Some(node) = self.arena.node_weight_mut(NodeIndex::from(child)) {
            if node.parent == Some(parent) {
                node.parent = None;
            }
        }
    }

    /// Where a block snapped into `anchor.slot` would be placed right now.
    fn seat(&self, anchor: NodeId, slot: Slot) -> Position {
        let Some(node) = self.get(anchor) else {
            return Position::default();
        };
        let lowest_body_y = match slot {
            Slot::Sequel => node.slots.get(Slot::Body).map(|body| self.lowest_y(body)),
            _ => None,
        };
        layout::slot_position(node.kind, node.position, slot, lowest_body_y)
    }

    /// Moves the subtree of `id` so that `id` lands exactly on `position`.
    fn set_subtree_position(&mut self, id: NodeId, position: Position) {
        let Some(from) = self.get(id).map(|n| n.position) else {
            return;
        };
        self.translate_subtree(id, position.x - from.x, position.y - from.y);
        self.set_position(id, position);
    }

    fn set_position(&mut self, id: NodeId, position: Position) {
        if let Some(node) = self.arena.node_weight_mut(NodeIndex::from(id)) {
            node.position = position;
        }
    }

    fn translate_subtree(&mut self, id: NodeId, dx: f32, dy: f32) {
        for member in self.subtree(id) {
            if let Some(node) = self.arena.node_weight_mut(NodeIndex::from(member)) {
                node.position = node.position.offset(dx, dy);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Test support: one-sided link writes for building corrupted graphs
    // -----------------------------------------------------------------------

    /// Overwrites the parent reference of `id` without touching any slot.
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_parent_unchecked(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.arena.node_weight_mut(NodeIndex::from(id)) {
            node.parent = parent;
        }
    }

    /// Overwrites `slot` of `id` without touching the target's parent.
    /// Returns `false` if `id` is unknown or has no such slot.
    #[cfg(any(test, feature = "test-support"))]
    pub fn set_slot_unchecked(&mut self, id: NodeId, slot: Slot, target: Option<NodeId>) -> bool {
        self.arena
            .node_weight_mut(NodeIndex::from(id))
            .is_some_and(|node| node.slots.set(slot, target))
    }
}
