//! Placed structures and their connection points.
//!
//! A [`Piece`] keeps its walls and exit candidates in piece-local
//! coordinates, with `(0, 0)` at its top-left corner. Everything a piece
//! exposes publicly is translated to global coordinates first.

mod corridor;
mod room;

use crate::{
    grid::Grid,
    types::{Direction, Position, Rect, Size},
};

use std::fmt::{Display, Formatter};

pub type PieceId = usize;

// A perimeter cell a piece could open towards its surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ExitCandidate {
    pub local: Position,
    pub direction: Direction,
}

impl ExitCandidate {
    pub fn new(local: Position, direction: Direction) -> Self {
        ExitCandidate { local, direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LinkedExit {
    local: Position,
    direction: Direction,
    target: PieceId,
}

/// A connection seen from one of its two pieces, in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceExit {
    pub position: Position,
    pub direction: Direction,
    pub target: PieceId,
}

impl PieceExit {
    /// The first cell of the target piece.
    pub fn step_in(&self) -> Position {
        self.position.step(self.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Walkable interior of `room_size` surrounded by a one cell wall.
    Room { room_size: Size, symmetric: bool },
    /// Straight corridor grown away from its parent towards `direction`.
    Corridor { length: u32, direction: Direction },
    /// Straight or bent corridor joining two pieces after growth ended.
    Interconnect { length: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    position: Position,
    walls: Grid,
    footprint: Grid,
    perimeter: Vec<ExitCandidate>,
    exits: Vec<LinkedExit>,
    max_exits: u32,
    contents: Vec<String>,
}

impl Piece {
    fn new_solid(kind: PieceKind, size: Size, max_exits: u32) -> Self {
        Piece {
            kind,
            position: Position::ORIGIN,
            walls: Grid::new(size, true),
            footprint: Grid::new(size, true),
            perimeter: Vec::new(),
            exits: Vec::new(),
            max_exits,
            contents: Vec::new(),
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn is_room(&self) -> bool {
        matches!(self.kind, PieceKind::Room { .. })
    }

    pub fn is_corridor(&self) -> bool {
        !self.is_room()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.walls.size()
    }

    pub fn rect(&self) -> Rect {
        Rect::from_position_and_size(self.position, self.size())
    }

    /// Walkable area of a room in global coordinates.
    pub fn interior(&self) -> Option<Rect> {
        match self.kind {
            PieceKind::Room { room_size, .. } => Some(Rect::from_position_and_size(
                self.position.offset_by(1, 1),
                room_size,
            )),
            _ => None,
        }
    }

    pub fn max_exits(&self) -> u32 {
        self.max_exits
    }

    /// Content slots drawn for a room. Corridors hold none.
    pub fn contents(&self) -> &[String] {
        &self.contents
    }

    pub(crate) fn set_contents(&mut self, contents: Vec<String>) {
        self.contents = contents;
    }

    /// Centre cell of the bounding box, rounding towards the top-left.
    pub fn center(&self) -> Position {
        self.global_pos(Self::center_of(self.size()))
    }

    pub(crate) fn center_of(size: Size) -> Position {
        Position::new(
            (size.width.saturating_sub(1) / 2) as i32,
            (size.height.saturating_sub(1) / 2) as i32,
        )
    }

    pub(crate) fn place_at(&mut self, position: Position) {
        self.position = position;
    }

    pub fn global_pos(&self, local: Position) -> Position {
        local.offset_by(self.position.x, self.position.y)
    }

    pub(crate) fn local_pos(&self, global: Position) -> Position {
        global.offset_by(-self.position.x, -self.position.y)
    }

    pub fn occupies(&self, global: Position) -> bool {
        self.footprint.get(self.local_pos(global)).unwrap_or(false)
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.footprint
            .iter()
            .filter(|(_, occupied)| *occupied)
            .map(|(local, _)| self.global_pos(local))
    }

    /// Wall state of an occupied global cell, `None` outside the footprint.
    pub fn wall_at(&self, global: Position) -> Option<bool> {
        if !self.occupies(global) {
            return None;
        }

        self.walls.get(self.local_pos(global))
    }

    pub(crate) fn add_perimeter(&mut self, from: Position, to: Position, direction: Direction) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.perimeter
                    .push(ExitCandidate::new(Position::new(x, y), direction));
            }
        }
    }

    pub(crate) fn perimeter(&self) -> &[ExitCandidate] {
        &self.perimeter
    }

    pub(crate) fn set_perimeter(&mut self, perimeter: Vec<ExitCandidate>) {
        self.perimeter = perimeter;
    }

    pub fn exit_candidates(&self) -> impl Iterator<Item = (Position, Direction)> + '_ {
        self.perimeter
            .iter()
            .map(|candidate| (self.global_pos(candidate.local), candidate.direction))
    }

    // Opens the candidate's cell and records where it leads
    pub(crate) fn add_exit(&mut self, candidate: ExitCandidate, target: PieceId) {
        self.walls.set(candidate.local, false);
        self.exits.push(LinkedExit {
            local: candidate.local,
            direction: candidate.direction,
            target,
        });
    }

    pub fn exits(&self) -> impl Iterator<Item = PieceExit> + '_ {
        self.exits.iter().map(|exit| PieceExit {
            position: self.global_pos(exit.local),
            direction: exit.direction,
            target: exit.target,
        })
    }

    pub fn exit_count(&self) -> usize {
        self.exits.len()
    }

    pub fn is_linked_to(&self, other: PieceId) -> bool {
        self.exits.iter().any(|exit| exit.target == other)
    }

    pub(crate) fn paint_onto(&self, grid: &mut Grid) {
        for (local, occupied) in self.footprint.iter() {
            if occupied {
                let is_wall = self.walls.blocked(local);
                grid.set(self.global_pos(local), is_wall);
            }
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self.kind {
            PieceKind::Room { .. } => "room",
            PieceKind::Corridor { .. } => "corridor",
            PieceKind::Interconnect { .. } => "interconnect",
        };

        write!(f, "{} {}", name, self.rect())
    }
}
