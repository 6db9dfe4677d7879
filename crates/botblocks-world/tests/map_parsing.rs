//! Property tests for map parsing.

use botblocks_world::{Coord, GridMap, MapOracle, Tile};
use proptest::prelude::*;

fn tile() -> impl Strategy<Value = char> {
    prop_oneof![Just('O'), Just('X'), Just('B'), Just('E')]
}

proptest! {
    /// Any rectangle with one start and at least one end parses, and
    /// re-renders to the same text.
    #[test]
    fn rectangles_round_trip(
        width in 1usize..8,
        height in 1usize..8,
        cells in prop::collection::vec(tile(), 64),
        start in 0usize..64,
        end in 0usize..64,
    ) {
        let total = width * height;
        prop_assume!(total >= 2);
        let start = start % total;
        let end = end % total;
        prop_assume!(start != end);

        let mut grid: Vec<char> = cells[..total].to_vec();
        grid[start] = 'S';
        grid[end] = 'E';
        let text = grid
            .chunks(width)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");

        let map = GridMap::parse(&text).unwrap();
        prop_assert_eq!(map.to_text(), text);
        prop_assert_eq!(map.tile_at(map.start()), Some(Tile::Start));

        let row = start / width;
        let column = start % width;
        prop_assert_eq!(map.start(), Coord::new(column as i32, (height - 1 - row) as i32));
    }

    #[test]
    fn nothing_outside_is_traversable(x in -20i32..20, y in -20i32..20) {
        let map = GridMap::parse("SOE\nOOO").unwrap();
        let inside = (0..3).contains(&x) && (0..2).contains(&y);
        prop_assert_eq!(map.is_traversable(Coord::new(x, y)), inside);
    }
}
