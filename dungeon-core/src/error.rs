use crate::types::{Position, Size};

use thiserror::Error;

/// A configuration that can never produce a dungeon.
///
/// Detected before any placement happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid size must be greater than zero, got {0}")]
    EmptyGrid(Size),
    #[error("{which} room minimum size must be greater than zero, got {size}")]
    EmptyRoom { which: &'static str, size: Size },
    #[error("{which} room minimum size {min} exceeds its maximum size {max}")]
    InvertedRoomBounds {
        which: &'static str,
        min: Size,
        max: Size,
    },
    #[error("{which} room of minimum size {min} cannot fit inside a {grid} grid")]
    RoomLargerThanGrid {
        which: &'static str,
        min: Size,
        grid: Size,
    },
    #[error("room count must be greater than zero")]
    NoRooms,
    #[error("generic rooms need room for their entrance, max_exits must be at least 1")]
    GenericRoomWithoutExits,
    #[error("corridor minimum length {min} exceeds its maximum length {max}")]
    InvertedCorridorBounds { min: u32, max: u32 },
    #[error("corridor density must lie within [0, 1], got {0}")]
    InvalidCorridorDensity(f64),
    #[error("piece dimensions must be greater than zero, got {0}")]
    InvalidPieceSize(Size),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("initial room {size} placed at {position} does not fit inside a {grid} grid")]
    InitialRoomDoesNotFit {
        position: Position,
        size: Size,
        grid: Size,
    },
}

/// `Map::remove_object` was asked for a handle it does not track at that cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no object {handle} registered at {position}")]
pub struct ObjectNotFound {
    pub handle: String,
    pub position: Position,
}
