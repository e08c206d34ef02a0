use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A cell coordinate on the dungeon grid.
///
/// Coordinates are signed so that placement code can step past the grid
/// edge and reject the result instead of wrapping around.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub const fn offset_by(&self, dx: i32, dy: i32) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.step_in();
        self.offset_by(dx, dy)
    }

    pub fn manhattan_distance(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev adjacency, the cell itself excluded.
    pub fn is_adjacent_to(&self, other: &Position) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }

    pub fn neighbours(&self) -> [Position; 8] {
        [
            self.offset_by(0, -1),
            self.offset_by(1, 0),
            self.offset_by(0, 1),
            self.offset_by(-1, 0),
            self.offset_by(1, -1),
            self.offset_by(1, 1),
            self.offset_by(-1, 1),
            self.offset_by(-1, -1),
        ]
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(position: Position) -> Self {
        (position.x, position.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn grown_by(&self, amount: u32) -> Size {
        Size {
            width: self.width + amount * 2,
            height: self.height + amount * 2,
        }
    }

    pub fn fits_within(&self, other: &Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}x{}]", self.width, self.height)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Size { width, height }
    }
}

/// The side of a piece an exit faces.
///
/// Exits are also described by a rotation in degrees: 0 faces south (+y),
/// 90 faces west (-x), 180 faces north (-y) and 270 faces east (+x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn is_horizontal(&self) -> bool {
        match self {
            Direction::North | Direction::South => false,
            Direction::East | Direction::West => true,
        }
    }

    pub fn reverse(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Direction::South => 0,
            Direction::West => 90,
            Direction::North => 180,
            Direction::East => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees % 360 {
            0 => Some(Direction::South),
            90 => Some(Direction::West),
            180 => Some(Direction::North),
            270 => Some(Direction::East),
            _ => None,
        }
    }

    /// Unit vector leading from an exit cell into whatever lies beyond it.
    pub fn step_in(&self) -> (i32, i32) {
        match self {
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::East => (1, 0),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// An axis-aligned rectangle of cells, `origin` being its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub origin: Position,
    pub width: u32,
    pub height: u32,
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({},{}):[{}x{}]",
            self.origin.x, self.origin.y, self.width, self.height
        )
    }
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rect {
            origin: Position::new(x, y),
            width,
            height,
        }
    }

    pub fn from_position_and_size(origin: Position, size: Size) -> Self {
        Rect {
            origin,
            width: size.width,
            height: size.height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.origin.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.origin.y + self.height as i32
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.origin.x
            && position.x < self.right()
            && position.y >= self.origin.y
            && position.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.origin.x >= self.origin.x
            && other.origin.y >= self.origin.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.origin.x < other.right()
            && other.origin.x < self.right()
            && self.origin.y < other.bottom()
            && other.origin.y < self.bottom()
    }

    pub fn expanded_by(&self, amount: u32) -> Rect {
        Rect {
            origin: self.origin.offset_by(-(amount as i32), -(amount as i32)),
            width: self.width + amount * 2,
            height: self.height + amount * 2,
        }
    }

    pub fn get_cells(&self) -> Vec<Position> {
        let mut cells = Vec::with_capacity(self.area() as usize);

        for y in self.origin.y..self.bottom() {
            for x in self.origin.x..self.right() {
                cells.push(Position { x, y });
            }
        }

        cells
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}
