//! Map parsing errors.

use thiserror::Error;

/// Errors produced while parsing a level map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map is empty")]
    Empty,

    /// Every row must be as wide as the first one.
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("map must contain exactly one start tile, found {found}")]
    StartCount { found: usize },

    #[error("map has no end tile")]
    MissingEnd,

    #[error("unknown tile {ch:?} at row {row}, column {column}")]
    UnknownTile { ch: char, row: usize, column: usize },
}
