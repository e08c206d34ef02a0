use super::{ExitCandidate, Piece, PieceKind};
use crate::{
    constants::{CORRIDOR_WIDTH, WALL_THICKNESS},
    error::ConfigError,
    grid::Grid,
    types::{Direction, Position, Rect, Size},
};

impl Piece {
    /// Creates an unplaced straight corridor growing towards `direction`.
    ///
    /// The corridor is one floor cell wide between two wall rows. Its only
    /// exit candidates are the two ends of the floor line: the near end faces
    /// back where the corridor came from, the far end faces onwards. Both
    /// stay closed until linked.
    pub fn new_corridor(length: u32, direction: Direction) -> Result<Self, ConfigError> {
        let size = if direction.is_horizontal() {
            Size::new(length, CORRIDOR_WIDTH)
        } else {
            Size::new(CORRIDOR_WIDTH, length)
        };

        if size.is_empty() {
            return Err(ConfigError::InvalidPieceSize(size));
        }

        let mut corridor = Piece::new_solid(PieceKind::Corridor { length, direction }, size, 2);

        let axis = WALL_THICKNESS as i32;
        let last = length as i32 - 1;

        let (first_cell, last_cell) = if direction.is_horizontal() {
            (Position::new(0, axis), Position::new(last, axis))
        } else {
            (Position::new(axis, 0), Position::new(axis, last))
        };

        // Ends stay closed until linked
        if length > 2 {
            let floor = if direction.is_horizontal() {
                Rect::new(1, axis, length - 2, 1)
            } else {
                Rect::new(axis, 1, 1, length - 2)
            };
            corridor.walls.set_square(floor, false);
        }

        let (near, far) = match direction {
            Direction::South | Direction::East => (first_cell, last_cell),
            Direction::North | Direction::West => (last_cell, first_cell),
        };

        corridor.set_perimeter(vec![
            ExitCandidate::new(near, direction.reverse()),
            ExitCandidate::new(far, direction),
        ]);

        Ok(corridor)
    }

    pub(crate) fn near_end(&self) -> Option<ExitCandidate> {
        match self.kind {
            PieceKind::Corridor { .. } => self.perimeter.first().copied(),
            _ => None,
        }
    }

    pub(crate) fn far_end(&self) -> Option<ExitCandidate> {
        match self.kind {
            PieceKind::Corridor { .. } => self.perimeter.get(1).copied(),
            _ => None,
        }
    }

    // Floor follows `path` in global coordinates, walled in except where
    // `is_foreign` reports a cell as already claimed. Both ends of the path
    // become exit candidates facing `start` and `end`
    pub(crate) fn new_interconnect(
        path: &[Position],
        start: Direction,
        end: Direction,
        is_foreign: impl Fn(Position) -> bool,
    ) -> Result<Self, ConfigError> {
        let (Some(first), Some(last)) = (path.first().copied(), path.last().copied()) else {
            return Err(ConfigError::InvalidPieceSize(Size::default()));
        };

        let min_x = path.iter().map(|cell| cell.x).min().unwrap_or(first.x);
        let min_y = path.iter().map(|cell| cell.y).min().unwrap_or(first.y);
        let max_x = path.iter().map(|cell| cell.x).max().unwrap_or(first.x);
        let max_y = path.iter().map(|cell| cell.y).max().unwrap_or(first.y);

        let bounds = Rect::new(
            min_x,
            min_y,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        )
        .expanded_by(WALL_THICKNESS);

        let mut corridor = Piece::new_solid(
            PieceKind::Interconnect {
                length: path.len() as u32,
            },
            bounds.size(),
            2,
        );
        corridor.place_at(bounds.origin);
        corridor.footprint = Grid::new(bounds.size(), false);

        for cell in path {
            for shell in cell.neighbours() {
                if !is_foreign(shell) {
                    corridor.footprint.set(corridor.local_pos(shell), true);
                }
            }
        }

        for cell in path {
            let local = corridor.local_pos(*cell);
            corridor.footprint.set(local, true);
            corridor.walls.set(local, false);
        }

        corridor.set_perimeter(vec![
            ExitCandidate::new(corridor.local_pos(first), start),
            ExitCandidate::new(corridor.local_pos(last), end),
        ]);

        Ok(corridor)
    }
}
