//! Canvas bounds. A block released outside the board is deleted.

use serde::{Deserialize, Serialize};

use crate::node::Position;

/// Answers whether a point lies on the editable canvas.
pub trait BoardBounds {
    fn contains(&self, point: Position) -> bool;
}

/// An axis-aligned board, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Position,
    pub max: Position,
}

impl Rect {
    /// Builds a rectangle from two opposite corners in any order.
    pub fn from_corners(a: Position, b: Position) -> Self {
        Rect {
            min: Position::new(a.x.min(b.x), a.y.min(b.y)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A rectangle of the given half extents around `center`.
    pub fn around(center: Position, half_width: f32, half_height: f32) -> Self {
        Rect::from_corners(
            center.offset(-half_width, -half_height),
            center.offset(half_width, half_height),
        )
    }

    pub fn center(&self) -> Position {
        Position::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

impl BoardBounds for Rect {
    fn contains(&self, point: Position) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }
}
