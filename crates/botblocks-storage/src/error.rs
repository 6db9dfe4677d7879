//! Storage error types for botblocks-storage.

use thiserror::Error;

/// Errors produced by score and settings stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying SQLite call failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A stored value could not be interpreted.
    #[error("invalid stored value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}
