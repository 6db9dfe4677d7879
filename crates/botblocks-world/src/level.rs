//! Level definitions and the seeded catalog.

use std::fmt;

use botblocks_core::{Condition, LoopCondition, NodeKind};
use serde::Serialize;

use crate::error::MapError;
use crate::map::GridMap;
use crate::tile::Tile;

/// A playable level: a map plus the blocks the palette offers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
    pub map: String,
    pub blocks: Vec<NodeKind>,
}

/// Coarse difficulty label derived from [`Level::complexity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Intermediate,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl Level {
    pub fn grid(&self) -> Result<GridMap, MapError> {
        GridMap::parse(&self.map)
    }

    /// `(0.5 * floor + end) / len`, counted over the raw map text
    /// (separators included). Ranges over `[0, 1]`.
    pub fn complexity(&self) -> f32 {
        let total = self.map.chars().count();
        if total == 0 {
            return 0.0;
        }
        let weight: f32 = self
            .map
            .chars()
            .map(|ch| match Tile::from_char(ch) {
                Some(Tile::Floor) => 0.5,
                Some(Tile::End) => 1.0,
                _ => 0.0,
            })
            .sum();
        weight / total as f32
    }

    pub fn difficulty(&self) -> Difficulty {
        let complexity = self.complexity();
        if complexity < 0.3 {
            Difficulty::Easy
        } else if complexity > 0.7 {
            Difficulty::Hard
        } else {
            Difficulty::Intermediate
        }
    }

    /// Returns `true` if the palette offers `kind`.
    pub fn allows(&self, kind: NodeKind) -> bool {
        self.blocks.contains(&kind)
    }
}

/// Ordered set of levels, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in levels.
    pub fn seeded() -> Self {
        use NodeKind::*;
        let if_clear = Conditional(Condition::FrontTraversable);
        let if_button = Conditional(Condition::FrontIsButton);
        let until_exit = Loop(LoopCondition::NotAtExit);
        let while_clear = Loop(LoopCondition::FrontTraversable);

        let mut catalog = LevelCatalog::new();
        let seeds: [(&str, &str, Vec<NodeKind>); 6] = [
            ("Basic Movement", "XEX\nXOX\nXSX", vec![Move, Speak]),
            (
                "Rotate Right",
                "XXXXX\nXXOEX\nXXOXX\nXXSXX\nXXXXX",
                vec![Move, RotateRight],
            ),
            (
                "Conditional Test",
                "OOOOO\nOXXXO\nOXXXO\nOXXXO\nSXXXE",
                vec![Move, RotateRight, if_clear],
            ),
            (
                "Left and Right rotate",
                "XXXXE\nXXXOO\nXXOOX\nXOOXX\nXSXXX",
                vec![Move, RotateRight, RotateLeft],
            ),
            (
                "Complexity experiment",
                "OOOOE\nOOOOO\nOOOOO\nOOOOO\nSOOOO",
                vec![Move, RotateRight, RotateLeft, if_clear, until_exit, while_clear],
            ),
            (
                "Button Press",
                "XXEXX\nXXOBX\nXXOXX\nXXSXX",
                vec![Move, Interact, Speak, if_button, until_exit],
            ),
        ];
        for (name, map, blocks) in seeds {
            // Seed maps are fixed; a failure here is a typo in the table.
            if let Err(err) = catalog.add(name, map, blocks) {
                panic!("seed level {name:?} is invalid: {err}");
            }
        }
        catalog
    }

    /// Validates `map` and appends a level with the next free id.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        map: impl Into<String>,
        blocks: Vec<NodeKind>,
    ) -> Result<u32, MapError> {
        let map = map.into();
        GridMap::parse(&map)?;
        let id = self.levels.iter().map(|l| l.id).max().map_or(1, |max| max + 1);
        self.levels.push(Level {
            id,
            name: name.into(),
            map,
            blocks,
        });
        Ok(id)
    }

    pub fn get(&self, id: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_has_six_valid_levels() {
        let catalog = LevelCatalog::seeded();
        assert_eq!(catalog.len(), 6);
        let ids: Vec<u32> = catalog.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
        for level in catalog.iter() {
            level.grid().unwrap();
        }
        assert_eq!(catalog.get(1).unwrap().name, "Basic Movement");
        assert!(catalog.get(99).is_none());
    }

    #[test]
    fn complexity_counts_separators() {
        let catalog = LevelCatalog::seeded();
        // One floor, one end, eleven characters.
        let basic = catalog.get(1).unwrap();
        assert!((basic.complexity() - 1.5 / 11.0).abs() < 1e-6);
        assert_eq!(basic.difficulty(), Difficulty::Easy);

        // Twenty-three floors, one end, twenty-nine characters.
        let open = catalog.get(5).unwrap();
        assert!((open.complexity() - 12.5 / 29.0).abs() < 1e-6);
        assert_eq!(open.difficulty(), Difficulty::Intermediate);
    }

    #[test]
    fn add_assigns_next_id_and_validates() {
        let mut catalog = LevelCatalog::seeded();
        let id = catalog.add("Corridor", "SOOOOE", vec![NodeKind::Move]).unwrap();
        assert_eq!(id, 7);
        assert!(catalog.get(7).unwrap().allows(NodeKind::Move));
        assert!(!catalog.get(7).unwrap().allows(NodeKind::Speak));

        assert_eq!(catalog.add("Broken", "OOO", vec![]), Err(MapError::StartCount { found: 0 }));
        assert_eq!(catalog.len(), 7);
    }

    #[test]
    fn level_serializes_with_palette() {
        let level = LevelCatalog::seeded().get(2).unwrap().clone();
        let json = serde_json::to_value(&level).unwrap();
        assert_eq!(json["id"], 2);
        assert_eq!(json["name"], "Rotate Right");
        assert_eq!(json["blocks"].as_array().unwrap().len(), 2);
        assert_eq!(serde_json::to_value(Difficulty::Intermediate).unwrap(), "intermediate");
    }

    #[test]
    fn empty_catalog_starts_at_one() {
        let mut catalog = LevelCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.add("Only", "SE", vec![]).unwrap(), 1);
    }
}
