//! A map and the actor walking on it.

use crate::actor::{Actor, Robot};
use crate::error::MapError;
use crate::map::{GridMap, MapOracle};

/// The runtime world a program drives.
#[derive(Debug, Clone)]
pub struct World<M = GridMap, A = Robot> {
    pub map: M,
    pub actor: A,
}

impl World {
    /// Parses `text` and puts a fresh robot on its start tile.
    pub fn from_text(text: &str) -> Result<Self, MapError> {
        let map = GridMap::parse(text)?;
        let actor = Robot::on(&map);
        Ok(World { map, actor })
    }
}

impl<M: MapOracle, A: Actor> World<M, A> {
    pub fn new(map: M, actor: A) -> Self {
        World { map, actor }
    }

    /// Returns `true` if the actor stands on the exit tile.
    pub fn at_exit(&self) -> bool {
        self.map.is_exit(self.actor.position())
    }

    pub fn front_traversable(&self) -> bool {
        self.map.is_traversable(self.actor.front())
    }

    pub fn front_is_button(&self) -> bool {
        self.map.is_button(self.actor.front())
    }

    pub fn reset(&mut self) {
        self.actor.reset(&self.map);
    }
}
