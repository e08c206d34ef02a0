use crate::{
    grid::Grid,
    pieces::{Piece, PieceId},
    types::{Position, Size},
};

use std::collections::VecDeque;

pub(crate) type NeighbourSet = tinyset::SetUsize;

// Which piece claims each cell of the dungeon
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PieceMap {
    size: Size,
    owners: Vec<Option<PieceId>>,
}

impl PieceMap {
    pub fn new(size: Size) -> Self {
        PieceMap {
            size,
            owners: vec![None; size.area() as usize],
        }
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

    pub fn get(&self, position: Position) -> Option<PieceId> {
        self.index(position).and_then(|idx| self.owners[idx])
    }

    pub fn claim(&mut self, position: Position, piece: PieceId) {
        if let Some(idx) = self.index(position) {
            self.owners[idx] = Some(piece);
        }
    }
}

/// How close generation came to what was asked of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationReport {
    pub requested_rooms: u32,
    pub placed_rooms: u32,
    pub placed_corridors: u32,
    pub requested_interconnects: u32,
    pub placed_interconnects: u32,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        self.placed_rooms >= self.requested_rooms
            && self.placed_interconnects >= self.requested_interconnects
    }
}

/// A finished dungeon: its pieces, their connections and the merged walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dungeon {
    seed: u64,
    grid: Grid,
    pieces: Vec<Piece>,
    piece_map: PieceMap,
    neighbours: Vec<NeighbourSet>,
    initial_room: PieceId,
    start_pos: Position,
    report: GenerationReport,
}

impl Dungeon {
    pub(crate) fn new(
        seed: u64,
        size: Size,
        pieces: Vec<Piece>,
        piece_map: PieceMap,
        initial_room: PieceId,
        report: GenerationReport,
    ) -> Self {
        let mut grid = Grid::new(size, true);
        for piece in pieces.iter() {
            piece.paint_onto(&mut grid);
        }

        let neighbours = pieces
            .iter()
            .map(|piece| piece.exits().map(|exit| exit.target).collect::<NeighbourSet>())
            .collect::<Vec<_>>();

        let start_pos = pieces[initial_room].center();

        Dungeon {
            seed,
            grid,
            pieces,
            piece_map,
            neighbours,
            initial_room,
            start_pos,
            report,
        }
    }

    /// The seed the dungeon was generated from, drawn at random if the
    /// configuration did not carry one.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn size(&self) -> Size {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| piece.is_room())
    }

    pub fn corridors(&self) -> impl Iterator<Item = (PieceId, &Piece)> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| piece.is_corridor())
    }

    pub fn initial_room(&self) -> PieceId {
        self.initial_room
    }

    pub fn start_pos(&self) -> Position {
        self.start_pos
    }

    pub fn report(&self) -> GenerationReport {
        self.report
    }

    pub fn blocked(&self, position: Position) -> bool {
        self.grid.blocked(position)
    }

    pub fn piece_at(&self, position: Position) -> Option<PieceId> {
        self.piece_map.get(position)
    }

    pub fn neighbours(&self, id: PieceId) -> impl Iterator<Item = PieceId> + '_ {
        self.neighbours
            .get(id)
            .into_iter()
            .flat_map(|neighbours| neighbours.iter())
    }

    /// Pieces reachable from `from` through exits, `from` included.
    pub fn reachable_from(&self, from: PieceId) -> Vec<bool> {
        let mut visited = vec![false; self.pieces.len()];
        if from >= self.pieces.len() {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited[from] = true;
        queue.push_back(from);

        while let Some(piece_id) = queue.pop_front() {
            for neighbour_id in self.neighbours(piece_id) {
                if !visited[neighbour_id] {
                    visited[neighbour_id] = true;
                    queue.push_back(neighbour_id);
                }
            }
        }

        visited
    }

    pub fn is_connected(&self) -> bool {
        self.reachable_from(self.initial_room)
            .into_iter()
            .all(|reached| reached)
    }
}

#[cfg(test)]
impl Dungeon {
    // Two 3x3 rooms side by side on a 12x6 grid, linked through their
    // facing east and west walls at row 2
    pub(crate) fn new_test_dungeon() -> Dungeon {
        use crate::types::Direction;

        let mut first = Piece::new_room(Size::new(3, 3), true, 1).unwrap();
        let mut second = Piece::new_room(Size::new(3, 3), true, 1).unwrap();
        first.place_at(Position::new(0, 0));
        second.place_at(Position::new(5, 0));

        let east = first.candidates_facing(Direction::East)[0];
        let west = second.candidates_facing(Direction::West)[0];
        first.add_exit(east, 1);
        second.add_exit(west, 0);

        let size = Size::new(12, 6);
        let mut piece_map = PieceMap::new(size);
        for (id, piece) in [&first, &second].into_iter().enumerate() {
            for cell in piece.occupied_cells() {
                piece_map.claim(cell, id);
            }
        }

        Dungeon::new(
            1,
            size,
            vec![first, second],
            piece_map,
            0,
            GenerationReport::default(),
        )
    }
}
