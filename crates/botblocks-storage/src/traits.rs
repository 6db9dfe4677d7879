//! The [`ScoreStore`] trait: best scores per level plus player settings.
//!
//! Both backends ([`InMemoryScores`](crate::InMemoryScores) and
//! [`SqliteScores`](crate::SqliteScores)) implement it with identical
//! semantics, so callers can swap them freely.

use crate::error::StorageError;
use crate::types::{BestScore, GameSpeed};

pub trait ScoreStore {
    /// The best (lowest) score recorded for `level`.
    fn best_score(&self, level: u32) -> Result<Option<u32>, StorageError>;

    /// Records `score` for `level` if it beats the current best. Returns
    /// `true` when the stored best changed.
    fn record_score(&mut self, level: u32, score: u32) -> Result<bool, StorageError>;

    /// Every recorded best, ordered by level.
    fn all_scores(&self) -> Result<Vec<BestScore>, StorageError>;

    /// The saved game speed, or the default if none was saved.
    fn game_speed(&self) -> Result<GameSpeed, StorageError>;

    fn set_game_speed(&mut self, speed: GameSpeed) -> Result<(), StorageError>;

    /// Forgets all scores and settings.
    fn clear(&mut self) -> Result<(), StorageError>;
}
