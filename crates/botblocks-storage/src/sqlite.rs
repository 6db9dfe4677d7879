//! SQLite implementation of [`ScoreStore`].
//!
//! Best scores live in the `scores` table keyed by level; settings are
//! key/value rows in `settings`. Every write runs in its own transaction.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::StorageError;
use crate::traits::ScoreStore;
use crate::types::{BestScore, GameSpeed};

const GAME_SPEED_KEY: &str = "game_speed";

/// SQLite-backed implementation of [`ScoreStore`].
pub struct SqliteScores {
    conn: Connection,
}

impl SqliteScores {
    /// Opens (or creates) a database at `path`.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let conn = crate::schema::open_database(path)?;
        Ok(SqliteScores { conn })
    }

    /// Opens an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteScores { conn })
    }

    fn setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }
}

impl ScoreStore for SqliteScores {
    fn best_score(&self, level: u32) -> Result<Option<u32>, StorageError> {
        let score = self
            .conn
            .query_row("SELECT score FROM scores WHERE level = ?1", params![level], |row| row.get(0))
            .optional()?;
        Ok(score)
    }

    fn record_score(&mut self, level: u32, score: u32) -> Result<bool, StorageError> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "INSERT INTO scores (level, score) VALUES (?1, ?2)
             ON CONFLICT(level) DO UPDATE
                SET score = excluded.score, recorded_at = CURRENT_TIMESTAMP
                WHERE excluded.score < scores.score",
            params![level, score],
        )?;
        tx.commit()?;
        debug!(level, score, improved = changed > 0, "recorded score");
        Ok(changed > 0)
    }

    fn all_scores(&self) -> Result<Vec<BestScore>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT level, score FROM scores ORDER BY level")?;
        let rows = stmt.query_map([], |row| {
            Ok(BestScore {
                level: row.get(0)?,
                score: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn game_speed(&self) -> Result<GameSpeed, StorageError> {
        match self.setting(GAME_SPEED_KEY)? {
            None => Ok(GameSpeed::default()),
            Some(value) => value.parse().map_err(|_| StorageError::InvalidValue {
                key: GAME_SPEED_KEY.to_string(),
                value,
            }),
        }
    }

    fn set_game_speed(&mut self, speed: GameSpeed) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![GAME_SPEED_KEY, speed.as_str()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM scores", [])?;
        tx.execute("DELETE FROM settings", [])?;
        tx.commit()?;
        Ok(())
    }
}
