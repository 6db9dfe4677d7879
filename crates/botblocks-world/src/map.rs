//! The map oracle and the reference grid map parsed from level text.

use serde::Serialize;

use crate::coord::Coord;
use crate::error::MapError;
use crate::tile::Tile;

/// Read-only view of a level map, as consumed by blocks and the actor.
pub trait MapOracle {
    /// The tile at `coord`, or `None` outside the map.
    fn tile_at(&self, coord: Coord) -> Option<Tile>;

    /// Where the robot starts.
    fn start(&self) -> Coord;

    /// In bounds and walkable.
    fn is_traversable(&self, coord: Coord) -> bool {
        self.tile_at(coord).is_some_and(Tile::is_traversable)
    }

    fn is_button(&self, coord: Coord) -> bool {
        self.tile_at(coord).is_some_and(Tile::is_button)
    }

    fn is_exit(&self, coord: Coord) -> bool {
        self.tile_at(coord) == Some(Tile::End)
    }
}

/// A rectangular tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridMap {
    width: usize,
    height: usize,
    /// Row-major, bottom row (`y == 0`) first.
    tiles: Vec<Tile>,
    start: Coord,
}

impl GridMap {
    /// Parses `\n`-separated rows of tile characters. The first row of text
    /// is the top of the map. A single trailing newline is ignored.
    pub fn parse(text: &str) -> Result<GridMap, MapError> {
        let mut rows: Vec<&str> = text
            .split('\n')
            .map(|row| row.trim_end_matches('\r'))
            .collect();
        if rows.len() > 1 && rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        if rows.iter().all(|row| row.is_empty()) {
            return Err(MapError::Empty);
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        let mut tiles = vec![Tile::Void; width * height];
        let mut starts = Vec::new();
        let mut has_end = false;

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapError::RaggedRow { row, expected: width, found });
            }
            let y = height - 1 - row;
            for (column, ch) in line.chars().enumerate() {
                let tile = Tile::from_char(ch).ok_or(MapError::UnknownTile { ch, row, column })?;
                match tile {
                    Tile::Start => starts.push(Coord::new(column as i32, y as i32)),
                    Tile::End => has_end = true,
                    _ => {}
                }
                tiles[y * width + column] = tile;
            }
        }

        let start = match starts.as_slice() {
            [start] => *start,
            _ => return Err(MapError::StartCount { found: starts.len() }),
        };
        if !has_end {
            return Err(MapError::MissingEnd);
        }
        Ok(GridMap { width, height, tiles, start })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Renders the map back to its text form.
    pub fn to_text(&self) -> String {
        let mut rows = Vec::with_capacity(self.height);
        for y in (0..self.height).rev() {
            let row = &self.tiles[y * self.width..(y + 1) * self.width];
            rows.push(row.iter().map(|t| t.to_char()).collect::<String>());
        }
        rows.join("\n")
    }
}

impl MapOracle for GridMap {
    fn tile_at(&self, coord: Coord) -> Option<Tile> {
        let x = usize::try_from(coord.x).ok()?;
        let y = usize::try_from(coord.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get(y * self.width + x).copied()
    }

    fn start(&self) -> Coord {
        self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "XEX\nXOX\nXSX";

    #[test]
    fn parse_places_top_row_highest() {
        let map = GridMap::parse(BASIC).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 3);
        assert_eq!(map.start(), Coord::new(1, 0));
        assert_eq!(map.tile_at(Coord::new(1, 2)), Some(Tile::End));
        assert!(map.is_exit(Coord::new(1, 2)));
        assert_eq!(map.to_text(), BASIC);
    }

    #[test]
    fn out_of_bounds_is_not_traversable() {
        let map = GridMap::parse(BASIC).unwrap();
        assert!(map.is_traversable(Coord::new(1, 1)));
        assert!(!map.is_traversable(Coord::new(0, 1)));
        assert!(!map.is_traversable(Coord::new(-1, 0)));
        assert!(!map.is_traversable(Coord::new(1, 3)));
        assert_eq!(map.tile_at(Coord::new(3, 0)), None);
    }

    #[test]
    fn rectangular_maps_are_allowed() {
        let map = GridMap::parse("SOOBE").unwrap();
        assert_eq!((map.width(), map.height()), (5, 1));
        assert!(map.is_button(Coord::new(3, 0)));
        assert!(!map.is_traversable(Coord::new(3, 0)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(GridMap::parse(""), Err(MapError::Empty));
        assert_eq!(
            GridMap::parse("SOE\nOO"),
            Err(MapError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
        assert_eq!(GridMap::parse("OOE"), Err(MapError::StartCount { found: 0 }));
        assert_eq!(GridMap::parse("SSE"), Err(MapError::StartCount { found: 2 }));
        assert_eq!(GridMap::parse("SOO"), Err(MapError::MissingEnd));
        assert_eq!(
            GridMap::parse("SOE\nO?O"),
            Err(MapError::UnknownTile { ch: '?', row: 1, column: 1 })
        );
    }

    #[test]
    fn carriage_returns_are_ignored() {
        let map = GridMap::parse("XEX\r\nXSX").unwrap();
        assert_eq!(map.width(), 3);
    }

    #[test]
    fn one_trailing_newline_is_ignored() {
        let map = GridMap::parse("SE\n").unwrap();
        assert_eq!((map.width(), map.height()), (2, 1));
        assert_eq!(map.to_text(), "SE");
        assert_eq!(GridMap::parse("XEX\r\nXSX\r\n").unwrap().height(), 2);

        // A blank row in the middle, or a second trailing one, is still ragged.
        assert_eq!(
            GridMap::parse("SE\n\n"),
            Err(MapError::RaggedRow { row: 1, expected: 2, found: 0 })
        );
    }
}
