use crate::types::{Position, Rect, Size};

use std::fmt::{Display, Formatter};

/// A dense boolean matrix where `true` marks a wall.
///
/// Reads outside the matrix report a wall, so callers never need to bounds
/// check before asking whether a cell can be walked on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: Size,
    cells: Vec<bool>,
}

impl Grid {
    pub fn new(size: Size, fill: bool) -> Self {
        Grid {
            size,
            cells: vec![fill; size.area() as usize],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn rect(&self) -> Rect {
        Rect::from_position_and_size(Position::ORIGIN, self.size)
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.x < 0
            || position.y < 0
            || position.x as u32 >= self.size.width
            || position.y as u32 >= self.size.height
        {
            return None;
        }

        Some(position.y as usize * self.size.width as usize + position.x as usize)
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    pub fn get(&self, position: Position) -> Option<bool> {
        self.index(position).map(|idx| self.cells[idx])
    }

    pub fn blocked(&self, position: Position) -> bool {
        self.get(position).unwrap_or(true)
    }

    /// Writes a cell, returning `false` when it lies outside the grid.
    pub fn set(&mut self, position: Position, value: bool) -> bool {
        match self.index(position) {
            Some(idx) => {
                self.cells[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn set_square(&mut self, rect: Rect, value: bool) {
        for cell in rect.get_cells() {
            self.set(cell, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, bool)> + '_ {
        let width = self.size.width.max(1) as usize;

        self.cells.iter().enumerate().map(move |(idx, value)| {
            (
                Position::new((idx % width) as i32, (idx / width) as i32),
                *value,
            )
        })
    }

    pub fn count(&self, value: bool) -> usize {
        self.cells.iter().filter(|cell| **cell == value).count()
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.size.height as i32 {
            for x in 0..self.size.width as i32 {
                let glyph = if self.blocked(Position::new(x, y)) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
