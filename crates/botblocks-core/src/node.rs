//! The block record stored in the graph arena.
//!
//! Every placed block is one [`Node`]: a closed [`NodeKind`] tag, a canvas
//! [`Position`], an optional parent handle and the kind-specific child
//! [`Slots`]. Link fields are crate-private; the only way to change them is
//! the snap/disconnect protocol on [`BlockGraph`](crate::graph::BlockGraph).

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::id::NodeId;

// ---------------------------------------------------------------------------
// Canvas geometry
// ---------------------------------------------------------------------------

/// A point on the editing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns this point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Predicate evaluated by a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The tile in front of the actor is in bounds and walkable.
    FrontTraversable,
    /// The tile in front of the actor is a button.
    FrontIsButton,
}

/// Predicate evaluated by a loop block on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopCondition {
    /// Repeat until the actor stands on the exit tile.
    NotAtExit,
    /// Repeat while the tile in front of the actor is walkable.
    FrontTraversable,
}

/// The closed set of block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The fixed entry block. Exactly one exists per graph.
    Start,
    Move,
    RotateLeft,
    RotateRight,
    Speak,
    Interact,
    Conditional(Condition),
    Loop(LoopCondition),
}

/// Which set of child slots a kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single `child` slot.
    Chain,
    /// `success` and `failure` slots.
    Branch,
    /// `sequel` and `body` slots.
    Loop,
}

impl NodeKind {
    /// Every kind a palette can offer, in palette order.
    pub const PALETTE: [NodeKind; 9] = [
        NodeKind::Move,
        NodeKind::RotateRight,
        NodeKind::RotateLeft,
        NodeKind::Speak,
        NodeKind::Conditional(Condition::FrontTraversable),
        NodeKind::Conditional(Condition::FrontIsButton),
        NodeKind::Loop(LoopCondition::NotAtExit),
        NodeKind::Loop(LoopCondition::FrontTraversable),
        NodeKind::Interact,
    ];

    pub fn shape(&self) -> Shape {
        match self {
            NodeKind::Conditional(_) => Shape::Branch,
            NodeKind::Loop(_) => Shape::Loop,
            _ => Shape::Chain,
        }
    }

    /// Returns `true` for the single-command blocks.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Move
                | NodeKind::RotateLeft
                | NodeKind::RotateRight
                | NodeKind::Speak
                | NodeKind::Interact
        )
    }

    /// Human-readable label used in outlines and logs.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Move => "move",
            NodeKind::RotateLeft => "rotate left",
            NodeKind::RotateRight => "rotate right",
            NodeKind::Speak => "speak",
            NodeKind::Interact => "interact",
            NodeKind::Conditional(Condition::FrontTraversable) => "if front-clear",
            NodeKind::Conditional(Condition::FrontIsButton) => "if front-button",
            NodeKind::Loop(LoopCondition::NotAtExit) => "until exit",
            NodeKind::Loop(LoopCondition::FrontTraversable) => "while front-clear",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// A named child position on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Child,
    Success,
    Failure,
    /// The block after a loop. Plays the role of `Child` for loops.
    Sequel,
    /// The repeated branch of a loop.
    Body,
}

impl Slot {
    /// Returns `true` for the slot that continues a chain (`Child` or a
    /// loop's `Sequel`). Only these heal when their owner is disconnected.
    pub fn is_successor(&self) -> bool {
        matches!(self, Slot::Child | Slot::Sequel)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::Child => "child",
            Slot::Success => "success",
            Slot::Failure => "failure",
            Slot::Sequel => "sequel",
            Slot::Body => "body",
        };
        f.write_str(name)
    }
}

/// Kind-specific child links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slots {
    Chain {
        child: Option<NodeId>,
    },
    Branch {
        success: Option<NodeId>,
        failure: Option<NodeId>,
    },
    Loop {
        sequel: Option<NodeId>,
        body: Option<NodeId>,
    },
}

impl Slots {
    /// Empty slots matching the shape of `kind`.
    pub fn empty_for(kind: NodeKind) -> Self {
        match kind.shape() {
            Shape::Chain => Slots::Chain { child: None },
            Shape::Branch => Slots::Branch {
                success: None,
                failure: None,
            },
            Shape::Loop => Slots::Loop {
                sequel: None,
                body: None,
            },
        }
    }

    /// Returns the node held in `slot`, or `None` if the slot is empty or
    /// does not exist on this shape.
    pub fn get(&self, slot: Slot) -> Option<NodeId> {
        match (self, slot) {
            (Slots::Chain { child }, Slot::Child) => *child,
            (Slots::Branch { success, .. }, Slot::Success) => *success,
            (Slots::Branch { failure, .. }, Slot::Failure) => *failure,
            (Slots::Loop { sequel, .. }, Slot::Sequel) => *sequel,
            (Slots::Loop { body, .. }, Slot::Body) => *body,
            _ => None,
        }
    }

    /// Returns `true` if `slot` exists on this shape.
    pub fn has(&self, slot: Slot) -> bool {
        matches!(
            (self, slot),
            (Slots::Chain { .. }, Slot::Child)
                | (Slots::Branch { .. }, Slot::Success | Slot::Failure)
                | (Slots::Loop { .. }, Slot::Sequel | Slot::Body)
        )
    }

    /// Writes `value` into `slot`. Returns `false` if the slot does not exist
    /// on this shape.
    pub(crate) fn set(&mut self, slot: Slot, value: Option<NodeId>) -> bool {
        let target = match (self, slot) {
            (Slots::Chain { child }, Slot::Child) => child,
            (Slots::Branch { success, .. }, Slot::Success) => success,
            (Slots::Branch { failure, .. }, Slot::Failure) => failure,
            (Slots::Loop { sequel, .. }, Slot::Sequel) => sequel,
            (Slots::Loop { body, .. }, Slot::Body) => body,
            _ => return false,
        };
        *target = value;
        true
    }

    /// All occupied slots. Loop bodies come before sequels so that re-snapping
    /// in this order lays a sequel out beneath the finished body.
    pub fn occupied(&self) -> SmallVec<[(Slot, NodeId); 2]> {
        let pairs: [(Slot, Option<NodeId>); 2] = match self {
            Slots::Chain { child } => [(Slot::Child, *child), (Slot::Child, None)],
            Slots::Branch { success, failure } => {
                [(Slot::Success, *success), (Slot::Failure, *failure)]
            }
            Slots::Loop { sequel, body } => [(Slot::Body, *body), (Slot::Sequel, *sequel)],
        };
        pairs
            .into_iter()
            .filter_map(|(slot, id)| id.map(|id| (slot, id)))
            .collect()
    }

    /// Which slot, if any, holds `child`.
    pub fn slot_of(&self, child: NodeId) -> Option<Slot> {
        self.occupied()
            .into_iter()
            .find(|(_, id)| *id == child)
            .map(|(slot, _)| slot)
    }

    pub fn is_empty(&self) -> bool {
        self.occupied().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A block placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) position: Position,
    pub(crate) parent: Option<NodeId>,
    pub(crate) slots: Slots,
}

impl Node {
    /// Creates a detached block of `kind` at `position`.
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Node {
            kind,
            position,
            parent: None,
            slots: Slots::empty_for(kind),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    /// Shorthand for `self.slots().get(slot)`.
    pub fn get(&self, slot: Slot) -> Option<NodeId> {
        self.slots.get(slot)
    }

    /// A node is attached when it has a parent or any child.
    pub fn is_attached(&self) -> bool {
        self.parent.is_some() || !self.slots.is_empty()
    }
}
