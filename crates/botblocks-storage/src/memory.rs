//! In-memory implementation of [`ScoreStore`].

use std::collections::BTreeMap;

use crate::error::StorageError;
use crate::traits::ScoreStore;
use crate::types::{BestScore, GameSpeed};

/// Scores and settings kept for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScores {
    best: BTreeMap<u32, u32>,
    speed: Option<GameSpeed>,
}

impl InMemoryScores {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for InMemoryScores {
    fn best_score(&self, level: u32) -> Result<Option<u32>, StorageError> {
        Ok(self.best.get(&level).copied())
    }

    fn record_score(&mut self, level: u32, score: u32) -> Result<bool, StorageError> {
        match self.best.get(&level) {
            Some(&best) if best <= score => Ok(false),
            _ => {
                self.best.insert(level, score);
                Ok(true)
            }
        }
    }

    fn all_scores(&self) -> Result<Vec<BestScore>, StorageError> {
        Ok(self
            .best
            .iter()
            .map(|(&level, &score)| BestScore { level, score })
            .collect())
    }

    fn game_speed(&self) -> Result<GameSpeed, StorageError> {
        Ok(self.speed.unwrap_or_default())
    }

    fn set_game_speed(&mut self, speed: GameSpeed) -> Result<(), StorageError> {
        self.speed = Some(speed);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.best.clear();
        self.speed = None;
        Ok(())
    }
}
