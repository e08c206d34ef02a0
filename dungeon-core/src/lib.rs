mod algos;
mod constants;
mod dungeon;
mod error;
mod grid;
mod map;
mod nav_grid;
mod pieces;
mod types;

use tracing::{Level, span};

pub use algos::{DungeonBuilder, DungeonConfig, DungeonStyle, RoomBounds, RoomContents, Seed};
pub use constants::{BASE_COST, DIAGONAL_COST, OBJECT_PENALTY};
pub use dungeon::{Dungeon, GenerationReport};
pub use error::{ConfigError, GenerationError, ObjectNotFound};
pub use grid::Grid;
pub use map::{Exit, Map, PathQuery, PlacedObject, Room, RoomId};
pub use nav_grid::{NavGrid, NavSnapshot};
pub use pieces::{Piece, PieceExit, PieceId, PieceKind};
pub use types::{Direction, Position, Rect, Size};

/// Validates `config` and runs one generation pass over it.
pub fn generate_dungeon(config: DungeonConfig) -> Result<Dungeon, GenerationError> {
    let span = span!(Level::DEBUG, "generate_dungeon");
    let _guard = span.enter();

    let builder = DungeonBuilder::new(config)?;

    builder.build()
}
