//! Persistence of best scores and player settings.
//!
//! - [`traits`]: the [`ScoreStore`] contract
//! - [`memory`]: [`InMemoryScores`]
//! - [`sqlite`] and [`schema`]: [`SqliteScores`] with migrations
//! - [`types`]: [`GameSpeed`], [`BestScore`]

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use memory::InMemoryScores;
pub use sqlite::SqliteScores;
pub use traits::ScoreStore;
pub use types::{BestScore, GameSpeed};
