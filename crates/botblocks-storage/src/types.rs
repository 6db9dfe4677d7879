//! Storage-layer value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Player-selectable pacing of program runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl GameSpeed {
    /// Factor applied to the base delay between interpreter steps.
    pub fn delay_factor(self) -> f32 {
        match self {
            GameSpeed::Slow => 1.5,
            GameSpeed::Normal => 1.0,
            GameSpeed::Fast => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameSpeed::Slow => "slow",
            GameSpeed::Normal => "normal",
            GameSpeed::Fast => "fast",
        }
    }
}

impl fmt::Display for GameSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slow" => Ok(GameSpeed::Slow),
            "normal" => Ok(GameSpeed::Normal),
            "fast" => Ok(GameSpeed::Fast),
            other => Err(format!("unknown game speed {other:?} (expected slow, normal or fast)")),
        }
    }
}

/// A level's best score. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub level: u32,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_parses_its_own_names() {
        for speed in [GameSpeed::Slow, GameSpeed::Normal, GameSpeed::Fast] {
            assert_eq!(speed.as_str().parse::<GameSpeed>(), Ok(speed));
        }
        assert!("ludicrous".parse::<GameSpeed>().is_err());
        assert_eq!(GameSpeed::default(), GameSpeed::Normal);
    }

    #[test]
    fn slow_waits_longest() {
        assert!(GameSpeed::Slow.delay_factor() > GameSpeed::Normal.delay_factor());
        assert!(GameSpeed::Fast.delay_factor() < GameSpeed::Normal.delay_factor());
    }
}
