use super::{ExitCandidate, Piece, PieceKind};
use crate::{
    constants::WALL_THICKNESS,
    error::ConfigError,
    types::{Direction, Position, Rect, Size},
};

impl Piece {
    /// Creates an unplaced room whose walkable interior is `room_size`.
    ///
    /// The outer size adds one wall cell on every side. A symmetric room only
    /// offers the middle cell of each wall as an exit; any other room offers
    /// every wall cell but the corners.
    pub fn new_room(room_size: Size, symmetric: bool, max_exits: u32) -> Result<Self, ConfigError> {
        if room_size.is_empty() {
            return Err(ConfigError::InvalidPieceSize(room_size));
        }

        let size = room_size.grown_by(WALL_THICKNESS);
        let mut room = Piece::new_solid(
            PieceKind::Room {
                room_size,
                symmetric,
            },
            size,
            max_exits,
        );

        room.walls.set_square(
            Rect::from_position_and_size(Position::new(1, 1), room_size),
            false,
        );

        let right = size.width as i32 - 1;
        let bottom = size.height as i32 - 1;

        if symmetric {
            let center = Piece::center_of(size);

            room.set_perimeter(vec![
                ExitCandidate::new(Position::new(center.x, 0), Direction::North),
                ExitCandidate::new(Position::new(right, center.y), Direction::East),
                ExitCandidate::new(Position::new(center.x, bottom), Direction::South),
                ExitCandidate::new(Position::new(0, center.y), Direction::West),
            ]);
        } else {
            room.add_perimeter(
                Position::new(1, 0),
                Position::new(right - 1, 0),
                Direction::North,
            );
            room.add_perimeter(
                Position::new(0, 1),
                Position::new(0, bottom - 1),
                Direction::West,
            );
            room.add_perimeter(
                Position::new(1, bottom),
                Position::new(right - 1, bottom),
                Direction::South,
            );
            room.add_perimeter(
                Position::new(right, 1),
                Position::new(right, bottom - 1),
                Direction::East,
            );
        }

        Ok(room)
    }

    pub fn room_size(&self) -> Option<Size> {
        match self.kind {
            PieceKind::Room { room_size, .. } => Some(room_size),
            _ => None,
        }
    }

    pub(crate) fn candidates_facing(&self, direction: Direction) -> Vec<ExitCandidate> {
        self.perimeter
            .iter()
            .copied()
            .filter(|candidate| candidate.direction == direction)
            .collect()
    }
}
