//! Map tiles and their text encoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One cell of a level map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Start,
    End,
    Floor,
    /// Can be pressed from an adjacent tile but not walked on.
    Button,
    Void,
}

impl Tile {
    pub fn from_char(ch: char) -> Option<Tile> {
        match ch {
            'S' => Some(Tile::Start),
            'E' => Some(Tile::End),
            'O' => Some(Tile::Floor),
            'B' => Some(Tile::Button),
            'X' => Some(Tile::Void),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Tile::Start => 'S',
            Tile::End => 'E',
            Tile::Floor => 'O',
            Tile::Button => 'B',
            Tile::Void => 'X',
        }
    }

    /// Returns `true` if the robot may stand on this tile.
    pub fn is_traversable(self) -> bool {
        matches!(self, Tile::Start | Tile::End | Tile::Floor)
    }

    pub fn is_button(self) -> bool {
        self == Tile::Button
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_encoding_is_bijective() {
        for tile in [Tile::Start, Tile::End, Tile::Floor, Tile::Button, Tile::Void] {
            assert_eq!(Tile::from_char(tile.to_char()), Some(tile));
        }
        assert_eq!(Tile::from_char('?'), None);
        assert_eq!(Tile::from_char('o'), None);
    }

    #[test]
    fn only_walkable_tiles_are_traversable() {
        assert!(Tile::Start.is_traversable());
        assert!(Tile::End.is_traversable());
        assert!(Tile::Floor.is_traversable());
        assert!(!Tile::Button.is_traversable());
        assert!(!Tile::Void.is_traversable());
        assert!(Tile::Button.is_button());
    }
}
