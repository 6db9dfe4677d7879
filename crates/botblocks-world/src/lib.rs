//! The world a botblocks program runs in.
//!
//! - [`tile`] and [`map`]: level text, tiles and the [`MapOracle`] trait
//! - [`actor`]: the [`Actor`] trait and the reference [`Robot`]
//! - [`world`]: map plus actor, with the predicates blocks query
//! - [`level`]: levels and the seeded [`LevelCatalog`]

pub mod actor;
pub mod coord;
pub mod error;
pub mod level;
pub mod map;
pub mod tile;
pub mod world;

pub use actor::{Actor, Robot};
pub use coord::{Coord, Direction};
pub use error::MapError;
pub use level::{Difficulty, Level, LevelCatalog};
pub use map::{GridMap, MapOracle};
pub use tile::Tile;
pub use world::World;
