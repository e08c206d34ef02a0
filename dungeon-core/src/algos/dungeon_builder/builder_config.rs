use crate::{
    constants::WALL_THICKNESS,
    error::ConfigError,
    types::{Position, Size},
};

use derive_more::From;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

const FURNISHINGS: [&str; 5] = ["chest", "fountain", "rock", "flowers", "barrel"];

/// Seed of the generator's random stream.
///
/// Text seeds are hashed so that any string maps to a reproducible stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, From, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    Number(u64),
    Text(String),
}

impl Seed {
    pub fn value(&self) -> u64 {
        match self {
            Seed::Number(seed) => *seed,
            Seed::Text(seed) => xxh3_64(seed.as_bytes()),
        }
    }
}

impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        Seed::Text(seed.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBounds {
    // Interior size, walls excluded.
    pub min_size: Size,
    pub max_size: Size,
    // Upper bound on the exits of a single room, its entrance included.
    pub max_exits: u32,
    // Pins the top-left corner of the initial room. Ignored for other rooms.
    #[serde(default)]
    pub position: Option<Position>,
}

impl RoomBounds {
    pub fn new(min_size: Size, max_size: Size, max_exits: u32) -> Self {
        RoomBounds {
            min_size,
            max_size,
            max_exits,
            position: None,
        }
    }

    pub fn fixed(size: Size, max_exits: u32) -> Self {
        Self::new(size, size, max_exits)
    }

    fn validate(&self, which: &'static str, grid_size: Size) -> Result<(), ConfigError> {
        if self.min_size.is_empty() {
            return Err(ConfigError::EmptyRoom {
                which,
                size: self.min_size,
            });
        }

        if !self.min_size.fits_within(&self.max_size) {
            return Err(ConfigError::InvertedRoomBounds {
                which,
                min: self.min_size,
                max: self.max_size,
            });
        }

        if !self.min_size.grown_by(WALL_THICKNESS).fits_within(&grid_size) {
            return Err(ConfigError::RoomLargerThanGrid {
                which,
                min: self.min_size,
                grid: grid_size,
            });
        }

        Ok(())
    }
}

/// What a room may be furnished with.
///
/// Every placed room draws up to `max_count` slots, each one of `kinds`.
/// Hosts decide what a kind stands for.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoomContents {
    pub kinds: Vec<String>,
    pub max_count: u32,
}

impl RoomContents {
    pub fn new<S: Into<String>>(kinds: impl IntoIterator<Item = S>, max_count: u32) -> Self {
        RoomContents {
            kinds: kinds.into_iter().map(Into::into).collect(),
            max_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty() || self.max_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonConfig {
    pub grid_size: Size,
    pub initial_room: RoomBounds,
    pub generic_room: RoomBounds,
    // Inclusive corridor length bounds. A drawn length of 0 attaches rooms
    // directly to each other.
    pub corridor_length: (u32, u32),
    // Probability of growing a corridor before attaching a room.
    pub corridor_density: f64,
    pub symmetric_rooms: bool,
    // Attempts at joining leftover exits once growth is over.
    pub interconnects: u32,
    pub max_interconnect_length: u32,
    pub room_count: u32,
    #[serde(default)]
    pub room_contents: RoomContents,
    #[serde(default)]
    pub seed: Option<Seed>,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        DungeonConfig {
            grid_size: Size::new(100, 100),
            initial_room: RoomBounds::fixed(Size::new(3, 3), 1),
            generic_room: RoomBounds::new(Size::new(2, 2), Size::new(5, 5), 4),
            corridor_length: (2, 6),
            corridor_density: 0.5,
            symmetric_rooms: false,
            interconnects: 1,
            max_interconnect_length: 10,
            room_count: 10,
            room_contents: RoomContents::default(),
            seed: None,
        }
    }
}

impl DungeonConfig {
    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size.is_empty() {
            return Err(ConfigError::EmptyGrid(self.grid_size));
        }

        if self.room_count == 0 {
            return Err(ConfigError::NoRooms);
        }

        self.initial_room.validate("initial", self.grid_size)?;
        self.generic_room.validate("generic", self.grid_size)?;

        // Attached rooms spend one exit on their entrance
        if self.room_count > 1 && self.generic_room.max_exits == 0 {
            return Err(ConfigError::GenericRoomWithoutExits);
        }

        let (min, max) = self.corridor_length;
        if min > max {
            return Err(ConfigError::InvertedCorridorBounds { min, max });
        }

        if !(0.0..=1.0).contains(&self.corridor_density) {
            return Err(ConfigError::InvalidCorridorDensity(self.corridor_density));
        }

        Ok(())
    }

    pub fn from_style(style: DungeonStyle) -> Self {
        let mut base = Self::default();

        match style {
            DungeonStyle::Compact => {
                base.grid_size = Size::new(40, 30);
                base.initial_room = RoomBounds::fixed(Size::new(3, 3), 2);
                base.generic_room = RoomBounds::new(Size::new(2, 2), Size::new(5, 4), 3);
                base.corridor_length = (0, 2);
                base.corridor_density = 0.2;
                base.interconnects = 2;
                base.max_interconnect_length = 8;
                base.room_count = 10;
            }
            DungeonStyle::Sprawling => {
                base.initial_room = RoomBounds::new(Size::new(3, 3), Size::new(5, 5), 4);
                base.generic_room = RoomBounds::new(Size::new(3, 3), Size::new(8, 6), 4);
                base.corridor_length = (2, 8);
                base.corridor_density = 0.6;
                base.interconnects = 4;
                base.max_interconnect_length = 12;
                base.room_count = 25;
                base.room_contents = RoomContents::new(FURNISHINGS, 4);
            }
            DungeonStyle::Symmetric => {
                base.grid_size = Size::new(60, 60);
                base.initial_room = RoomBounds::fixed(Size::new(3, 3), 4);
                base.generic_room = RoomBounds::new(Size::new(3, 3), Size::new(5, 5), 4);
                base.corridor_length = (1, 4);
                base.symmetric_rooms = true;
                base.interconnects = 2;
                base.room_count = 12;
                base.room_contents = RoomContents::new(["chest", "fountain"], 1);
            }
            DungeonStyle::Labyrinth => {
                base.grid_size = Size::new(80, 60);
                base.initial_room = RoomBounds::fixed(Size::new(3, 3), 4);
                base.generic_room = RoomBounds::new(Size::new(2, 2), Size::new(4, 4), 4);
                base.corridor_length = (2, 10);
                base.corridor_density = 0.9;
                base.interconnects = 8;
                base.max_interconnect_length = 16;
                base.room_count = 30;
                base.room_contents = RoomContents::new(FURNISHINGS, 2);
            }
        }

        base
    }
}

#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DungeonStyle {
    #[default]
    Compact,
    Sprawling,
    Symmetric,
    Labyrinth,
}
