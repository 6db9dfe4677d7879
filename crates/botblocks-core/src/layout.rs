//! Snap geometry: which slot a drop selects and where a snapped block lands.
//!
//! Slot choice is a deterministic function of horizontal position. A
//! candidate at or left of the anchor's x picks the left slot (`success`,
//! `sequel`); strictly right picks the right slot (`failure`, `body`).
//! Placement offsets are chosen so that a block snapped into a right slot
//! always lies strictly right of its anchor and one in a left slot lies at or
//! left of it, which lets cascaded re-snaps pick the same slot again.

use crate::node::{NodeKind, Position, Shape, Slot};

/// Vertical distance between a block and the block snapped beneath it.
pub const NODE_HEIGHT: f32 = 1.0;

/// Fraction of a conditional's width its branches are shifted sideways.
pub const BRANCH_OFFSET: f32 = 0.25;

/// Fraction of a loop's width its body is indented.
pub const BODY_INDENT: f32 = 0.2;

/// Rendered width of a block. Conditionals are drawn twice as wide.
pub fn node_width(kind: NodeKind) -> f32 {
    match kind.shape() {
        Shape::Branch => 2.0,
        _ => 1.0,
    }
}

/// Picks the slot of an anchor of `kind` at `anchor` that a candidate at
/// `candidate` would snap into.
pub fn select_slot(kind: NodeKind, anchor: Position, candidate: Position) -> Slot {
    let left_or_equal = anchor.x - candidate.x >= 0.0;
    match kind.shape() {
        Shape::Chain => Slot::Child,
        Shape::Branch if left_or_equal => Slot::Success,
        Shape::Branch => Slot::Failure,
        Shape::Loop if left_or_equal => Slot::Sequel,
        Shape::Loop => Slot::Body,
    }
}

/// Where a block snapped into `slot` of an anchor of `kind` at `anchor` is
/// placed. `lowest_body_y` is the lowest y of the anchor's loop body, if it
/// has one; a sequel hangs beneath it.
pub fn slot_position(
    kind: NodeKind,
    anchor: Position,
    slot: Slot,
    lowest_body_y: Option<f32>,
) -> Position {
    let below = anchor.y - NODE_HEIGHT;
    let branch = node_width(kind) * BRANCH_OFFSET;
    match slot {
        Slot::Child => Position::new(anchor.x, below),
        Slot::Success => Position::new(anchor.x - branch, below),
        Slot::Failure => Position::new(anchor.x + branch, below),
        Slot::Body => Position::new(anchor.x + node_width(kind) * BODY_INDENT, below),
        Slot::Sequel => {
            let top = lowest_body_y.unwrap_or(anchor.y);
            Position::new(anchor.x, top - NODE_HEIGHT)
        }
    }
}
