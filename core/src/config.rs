use alloc::string::ToString;
use serde::{Deserialize, Serialize};

use crate::*;

/// Inclusive range accepted for a numeric setting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    min: i64,
    max: i64,
}

impl Bounds {
    pub const fn new_unchecked(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(GameError::InvertedBounds { min, max });
        }
        Ok(Self::new_unchecked(min, max))
    }

    pub const fn min(&self) -> i64 {
        self.min
    }

    pub const fn max(&self) -> i64 {
        self.max
    }

    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn check(&self, parameter: &'static str, value: i64) -> Result<i64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(GameError::OutOfBounds {
                parameter,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

pub const OXYGEN_BOUNDS: Bounds = Bounds::new_unchecked(160, 500);
pub const MAP_SIZE_BOUNDS: Bounds = Bounds::new_unchecked(15, 30);
pub const PLAYER_COUNT_BOUNDS: Bounds = Bounds::new_unchecked(2, MAX_PLAYERS as i64);

/// Probabilities of each cell category, summing to one.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub bomb: f64,
    pub treasure: f64,
    pub none: f64,
}

impl Odds {
    pub fn total(&self) -> f64 {
        self.bomb + self.treasure + self.none
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(GameError::UnknownDifficulty(index))
    }

    pub const fn index(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    pub const fn odds(self) -> Odds {
        match self {
            Self::Easy => Odds {
                bomb: 0.01,
                treasure: 0.40,
                none: 0.59,
            },
            Self::Medium => Odds {
                bomb: 0.05,
                treasure: 0.40,
                none: 0.55,
            },
            Self::Hard => Odds {
                bomb: 0.15,
                treasure: 0.35,
                none: 0.50,
            },
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Easy
    }
}

#[derive(Deserialize)]
struct RawGameConfig {
    oxygen: i64,
    map_size: i64,
    player_count: i64,
    #[serde(default)]
    difficulty: Difficulty,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        let map_size = MAP_SIZE_BOUNDS.check("map_size", raw.map_size)?;
        let player_count = PLAYER_COUNT_BOUNDS.check("player_count", raw.player_count)?;
        // both bounds fit in a u8
        Self::new(
            raw.oxygen,
            map_size as Coord,
            player_count as u8,
            raw.difficulty,
        )
    }
}

/// Validated settings for a single game.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    oxygen: i64,
    map_size: Coord,
    player_count: u8,
    difficulty: Difficulty,
}

impl GameConfig {
    pub fn new(
        oxygen: i64,
        map_size: Coord,
        player_count: u8,
        difficulty: Difficulty,
    ) -> Result<Self> {
        OXYGEN_BOUNDS.check("oxygen", oxygen)?;
        MAP_SIZE_BOUNDS.check("map_size", map_size.into())?;
        PLAYER_COUNT_BOUNDS.check("player_count", player_count.into())?;
        Ok(Self {
            oxygen,
            map_size,
            player_count,
            difficulty,
        })
    }

    pub fn from_json(document: &str) -> Result<Self> {
        serde_json::from_str(document).map_err(|err| GameError::MalformedConfig(err.to_string()))
    }

    pub const fn oxygen(&self) -> i64 {
        self.oxygen
    }

    pub const fn map_size(&self) -> Coord {
        self.map_size
    }

    pub const fn player_count(&self) -> u8 {
        self.player_count
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            oxygen: 160,
            map_size: 15,
            player_count: 2,
            difficulty: Difficulty::Easy,
        }
    }
}
