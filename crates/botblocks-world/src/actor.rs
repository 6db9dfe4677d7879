//! The actor interface and the reference robot.

use serde::Serialize;
use tracing::{debug, info};

use crate::coord::{Coord, Direction};
use crate::map::MapOracle;

/// Commands a program can issue, plus the state conditionals query.
pub trait Actor {
    fn position(&self) -> Coord;

    fn facing(&self) -> Direction;

    /// The cell directly ahead.
    fn front(&self) -> Coord {
        self.position().step(self.facing())
    }

    /// Steps forward if the tile ahead is traversable. Returns whether the
    /// robot moved.
    fn move_forward(&mut self, map: &dyn MapOracle) -> bool;

    fn rotate_left(&mut self);

    fn rotate_right(&mut self);

    fn speak(&mut self, message: &str);

    /// Presses the button ahead, if there is one. Returns whether anything
    /// was pressed.
    fn interact(&mut self, map: &dyn MapOracle) -> bool;

    /// Back to the map's start, facing up, with history cleared.
    fn reset(&mut self, map: &dyn MapOracle);
}

/// The reference actor. Records everything it does so runs can be
/// inspected afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Robot {
    position: Coord,
    facing: Direction,
    moves: u32,
    turns: u32,
    spoken: Vec<String>,
    pressed: Vec<Coord>,
}

impl Robot {
    /// A robot standing on the start tile of `map`, facing up.
    pub fn on(map: &dyn MapOracle) -> Self {
        Robot {
            position: map.start(),
            ..Robot::default()
        }
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }

    pub fn pressed(&self) -> &[Coord] {
        &self.pressed
    }
}

impl Actor for Robot {
    fn position(&self) -> Coord {
        self.position
    }

    fn facing(&self) -> Direction {
        self.facing
    }

    fn move_forward(&mut self, map: &dyn MapOracle) -> bool {
        let target = self.front();
        if !map.is_traversable(target) {
            debug!(%target, "position is not a valid position");
            return false;
        }
        self.position = target;
        self.moves += 1;
        true
    }

    fn rotate_left(&mut self) {
        self.facing = self.facing.rotate_left();
        self.turns += 1;
    }

    fn rotate_right(&mut self) {
        self.facing = self.facing.rotate_right();
        self.turns += 1;
    }

    fn speak(&mut self, message: &str) {
        info!(message, "robot says");
        self.spoken.push(message.to_string());
    }

    fn interact(&mut self, map: &dyn MapOracle) -> bool {
        let target = self.front();
        if !map.is_button(target) {
            debug!(%target, "nothing to interact with");
            return false;
        }
        self.pressed.push(target);
        true
    }

    fn reset(&mut self, map: &dyn MapOracle) {
        *self = Robot::on(map);
    }
}
