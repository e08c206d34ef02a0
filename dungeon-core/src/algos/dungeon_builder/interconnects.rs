use super::{BuildState, FrontierExit};
use crate::{
    pieces::{Piece, PieceId, PieceKind},
    types::Position,
};

use rand::Rng;
use tracing::{Level, event};

impl BuildState<'_> {
    // Joins pairs of leftover exits with extra corridors, creating loops.
    // Every attempt draws one leftover exit and tries its partners nearest
    // first. An attempt that finds no partner consumes its exit and moves on
    pub(super) fn add_interconnects(&mut self) {
        let mut leftovers = std::mem::take(&mut self.frontier);

        for _ in 0..self.config.interconnects {
            if leftovers.len() < 2 {
                break;
            }

            let from = leftovers.remove(self.rng.random_range(0..leftovers.len()));
            let from_outside = self.outside_of(&from);

            let mut partners = leftovers
                .iter()
                .enumerate()
                .filter(|(_, to)| {
                    to.piece != from.piece && !self.already_joined(from.piece, to.piece)
                })
                .map(|(idx, to)| (from_outside.manhattan_distance(&self.outside_of(to)), idx))
                .filter(|(distance, _)| *distance < self.config.max_interconnect_length)
                .collect::<Vec<_>>();
            partners.sort();

            let joined = partners
                .into_iter()
                .find(|(_, idx)| self.try_interconnect(&from, &leftovers[*idx]).is_some());

            match joined {
                Some((_, idx)) => {
                    leftovers.remove(idx);
                }
                None => event!(
                    Level::TRACE,
                    "No interconnect found for exit {} of piece [{}]",
                    self.exit_position(&from),
                    from.piece
                ),
            }
        }

        self.frontier = leftovers;
    }

    // Directly, or through an interconnect placed earlier
    fn already_joined(&self, a: PieceId, b: PieceId) -> bool {
        self.pieces[a].is_linked_to(b)
            || self.pieces[a].exits().any(|exit| {
                let via = &self.pieces[exit.target];
                matches!(via.kind(), PieceKind::Interconnect { .. }) && via.is_linked_to(b)
            })
    }

    fn outside_of(&self, exit: &FrontierExit) -> Position {
        self.exit_position(exit).step(exit.candidate.direction)
    }

    fn try_interconnect(&mut self, from: &FrontierExit, to: &FrontierExit) -> Option<PieceId> {
        let start = self.outside_of(from);
        let end = self.outside_of(to);

        // Prefer the bend that leaves the first exit straight ahead
        let corners = if from.candidate.direction.is_horizontal() {
            [Position::new(end.x, start.y), Position::new(start.x, end.y)]
        } else {
            [Position::new(start.x, end.y), Position::new(end.x, start.y)]
        };

        let path = corners
            .into_iter()
            .map(|corner| trace_path(start, corner, end))
            .find(|path| self.interconnect_fits(path, from.piece, to.piece))?;

        let corridor = Piece::new_interconnect(
            &path,
            from.candidate.direction.reverse(),
            to.candidate.direction.reverse(),
            |cell| self.piece_map.get(cell).is_some(),
        )
        .ok()?;

        let start_end = corridor.perimeter()[0];
        let finish_end = corridor.perimeter()[1];

        let corridor_id = self.commit(corridor);
        self.link(from.piece, from.candidate, corridor_id, start_end);
        self.link(to.piece, to.candidate, corridor_id, finish_end);
        self.placed_interconnects += 1;

        event!(
            Level::TRACE,
            "Joined pieces [{}] and [{}] through a {} cell interconnect",
            from.piece,
            to.piece,
            path.len()
        );

        Some(corridor_id)
    }

    // The floor must be free; its wall shell may only touch the two pieces
    // being joined, and both must stay inside the grid
    fn interconnect_fits(&self, path: &[Position], a: PieceId, b: PieceId) -> bool {
        let floor_is_free = path
            .iter()
            .all(|cell| self.bounds.contains(*cell) && self.piece_map.get(*cell).is_none());

        floor_is_free
            && path.iter().flat_map(|cell| cell.neighbours()).all(|cell| {
                self.bounds.contains(cell)
                    && self
                        .piece_map
                        .get(cell)
                        .is_none_or(|owner| owner == a || owner == b)
            })
    }
}

// Cells from `start` to `end` through `corner`, each appearing once
fn trace_path(start: Position, corner: Position, end: Position) -> Vec<Position> {
    let mut path = vec![start];

    for target in [corner, end] {
        let mut cell = *path.last().unwrap_or(&start);

        while cell != target {
            cell = Position::new(
                cell.x + (target.x - cell.x).signum(),
                cell.y + (target.y - cell.y).signum(),
            );
            path.push(cell);
        }
    }

    path
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        algos::{DungeonConfig, RoomBounds, RoomContents, Seed},
        pieces::ExitCandidate,
        types::{Direction, Size},
    };

    fn config() -> DungeonConfig {
        DungeonConfig {
            grid_size: Size::new(30, 20),
            initial_room: RoomBounds::fixed(Size::new(3, 3), 4),
            generic_room: RoomBounds::fixed(Size::new(3, 3), 4),
            corridor_length: (0, 0),
            corridor_density: 0.0,
            symmetric_rooms: true,
            interconnects: 1,
            max_interconnect_length: 10,
            room_count: 2,
            room_contents: RoomContents::default(),
            seed: Some(Seed::Number(0)),
        }
    }

    // Two unlinked symmetric rooms on the same row, their facing exits
    // waiting in the frontier
    fn state_with_facing_rooms(config: &DungeonConfig, gap: i32) -> BuildState<'_> {
        let mut state = BuildState::new(config, 0);

        let mut west = Piece::new_room(Size::new(3, 3), true, 4).unwrap();
        let mut east = Piece::new_room(Size::new(3, 3), true, 4).unwrap();
        west.place_at(Position::new(2, 2));
        east.place_at(Position::new(7 + gap, 2));

        let west_exit = west.candidates_facing(Direction::East)[0];
        let east_exit = east.candidates_facing(Direction::West)[0];

        let west_id = state.commit(west);
        let east_id = state.commit(east);

        state.frontier = vec![
            FrontierExit {
                piece: west_id,
                candidate: west_exit,
            },
            FrontierExit {
                piece: east_id,
                candidate: east_exit,
            },
        ];

        state
    }

    #[test]
    fn test_trace_path() {
        let path = trace_path(Position::new(0, 0), Position::new(2, 0), Position::new(2, 2));
        assert_eq!(
            path,
            vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(2, 0),
                Position::new(2, 1),
                Position::new(2, 2),
            ]
        );

        let straight = trace_path(Position::new(3, 1), Position::new(3, 1), Position::new(0, 1));
        assert_eq!(straight.len(), 4);

        let single = trace_path(Position::new(3, 1), Position::new(3, 1), Position::new(3, 1));
        assert_eq!(single, vec![Position::new(3, 1)]);
    }

    #[test]
    fn test_straight_interconnect() {
        let config = config();
        let mut state = state_with_facing_rooms(&config, 3);

        state.add_interconnects();

        assert_eq!(state.placed_interconnects, 1);
        assert!(state.frontier.is_empty());

        let corridor_id = state.pieces.len() - 1;
        let corridor = &state.pieces[corridor_id];
        assert_eq!(corridor.kind(), PieceKind::Interconnect { length: 3 });
        assert!(state.pieces[0].is_linked_to(corridor_id));
        assert!(state.pieces[1].is_linked_to(corridor_id));

        let dungeon = state.into_dungeon(0);
        assert!(dungeon.is_connected());

        // West exit, three corridor cells and the east exit form an open row
        for x in 6..=10 {
            assert!(!dungeon.blocked(Position::new(x, 4)), "{}", x);
        }
        assert!(dungeon.blocked(Position::new(8, 3)));
        assert!(dungeon.blocked(Position::new(8, 5)));
    }

    #[test]
    fn test_single_cell_interconnect() {
        let config = config();
        let mut state = state_with_facing_rooms(&config, 1);

        state.add_interconnects();

        assert_eq!(state.placed_interconnects, 1);
        let corridor = state.pieces.last().unwrap();
        assert_eq!(corridor.exit_count(), 2);
        assert_eq!(corridor.kind(), PieceKind::Interconnect { length: 1 });
    }

    #[test]
    fn test_interconnect_respects_max_length() {
        let mut config = config();
        config.max_interconnect_length = 2;
        let mut state = state_with_facing_rooms(&config, 3);

        state.add_interconnects();

        assert_eq!(state.placed_interconnects, 0);
        assert_eq!(state.pieces.len(), 2);
    }

    #[test]
    fn test_interconnect_needs_distinct_unlinked_pieces() {
        let config = config();
        let mut state = state_with_facing_rooms(&config, 3);

        let north = state.pieces[0].candidates_facing(Direction::North)[0];
        state.frontier[1] = FrontierExit {
            piece: 0,
            candidate: north,
        };

        state.add_interconnects();

        assert_eq!(state.placed_interconnects, 0);
    }

    #[test]
    fn test_pieces_are_joined_at_most_once() {
        let mut config = config();
        config.interconnects = 2;
        let mut state = state_with_facing_rooms(&config, 3);

        // A second pair of exits between the same two rooms
        let west_south = state.pieces[0].candidates_facing(Direction::South)[0];
        let east_south = state.pieces[1].candidates_facing(Direction::South)[0];
        state.frontier.extend([
            FrontierExit {
                piece: 0,
                candidate: west_south,
            },
            FrontierExit {
                piece: 1,
                candidate: east_south,
            },
        ]);

        assert!(!state.already_joined(0, 1));

        state.add_interconnects();

        // The second attempt found no partner and used up its exit
        assert_eq!(state.placed_interconnects, 1);
        assert_eq!(state.frontier.len(), 1);
        assert!(state.already_joined(0, 1));
        assert!(state.already_joined(1, 0));
        assert!(!state.pieces[0].is_linked_to(1));

        let corridors = state
            .pieces
            .iter()
            .filter(|piece| matches!(piece.kind(), PieceKind::Interconnect { .. }))
            .count();
        assert_eq!(corridors, 1);
    }

    #[test]
    fn test_bent_interconnect() {
        let config = config();
        let mut state = BuildState::new(&config, 0);

        let mut upper = Piece::new_room(Size::new(3, 3), true, 4).unwrap();
        let mut lower = Piece::new_room(Size::new(3, 3), true, 4).unwrap();
        upper.place_at(Position::new(2, 2));
        lower.place_at(Position::new(10, 8));

        let upper_exit = upper.candidates_facing(Direction::East)[0];
        let lower_exit = lower.candidates_facing(Direction::North)[0];
        assert_eq!(upper_exit, ExitCandidate::new(Position::new(4, 2), Direction::East));

        let upper_id = state.commit(upper);
        let lower_id = state.commit(lower);
        state.frontier = vec![
            FrontierExit {
                piece: upper_id,
                candidate: upper_exit,
            },
            FrontierExit {
                piece: lower_id,
                candidate: lower_exit,
            },
        ];

        state.add_interconnects();

        assert_eq!(state.placed_interconnects, 1);

        let dungeon = state.into_dungeon(0);
        assert!(dungeon.is_connected());
        // Bend cell above the lower room's north exit
        assert!(!dungeon.blocked(Position::new(12, 4)));
        assert!(!dungeon.blocked(Position::new(12, 7)));
    }
}
