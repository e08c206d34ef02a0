use super::{DungeonRng, RngHandler};
use crate::{
    constants::PLACEMENT_BUFFER,
    dungeon::{Dungeon, GenerationReport, PieceMap},
    error::{ConfigError, GenerationError},
    pieces::{ExitCandidate, Piece, PieceId},
    types::{Position, Rect, Size},
};

use rand::Rng;
use tracing::{Level, event, span};

mod builder_config;
mod furnish_rooms;
mod interconnects;
mod place_rooms;

pub use builder_config::{DungeonConfig, DungeonStyle, RoomBounds, RoomContents, Seed};

/// Grows a dungeon out of a validated configuration.
#[derive(Debug, Clone)]
pub struct DungeonBuilder {
    config: DungeonConfig,
}

impl DungeonBuilder {
    pub fn new(config: DungeonConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(DungeonBuilder { config })
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Runs a full generation pass.
    ///
    /// The same configuration and seed always produce the same dungeon. Only
    /// an initial room that cannot be placed is an error; running out of room
    /// for the rest shows up in [`Dungeon::report`] instead.
    pub fn build(&self) -> Result<Dungeon, GenerationError> {
        let span = span!(Level::DEBUG, "build_dungeon");
        let _guard = span.enter();

        let build_start = std::time::Instant::now();

        let seed = match &self.config.seed {
            Some(seed) => seed.value(),
            None => {
                let seed = RngHandler::entropy_seed();
                event!(Level::INFO, "No seed configured, generating with seed [{}]", seed);
                seed
            }
        };

        let mut state = BuildState::new(&self.config, seed);

        let initial_room = state.place_initial_room()?;
        state.grow_rooms();

        let growth_time = std::time::Instant::now();
        event!(
            Level::DEBUG,
            "Placed {} rooms and {} corridors in {:.2}ms",
            state.placed_rooms,
            state.placed_corridors,
            growth_time.duration_since(build_start).as_millis()
        );

        state.add_interconnects();

        event!(
            Level::DEBUG,
            "Added {} interconnects in {:.2}ms",
            state.placed_interconnects,
            std::time::Instant::now()
                .duration_since(growth_time)
                .as_millis()
        );

        let dungeon = state.into_dungeon(initial_room);

        let report = dungeon.report();
        if !report.is_complete() {
            event!(
                Level::WARN,
                "Generation fell short: {}/{} rooms, {}/{} interconnects",
                report.placed_rooms,
                report.requested_rooms,
                report.placed_interconnects,
                report.requested_interconnects
            );
        }

        Ok(dungeon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierExit {
    piece: PieceId,
    candidate: ExitCandidate,
}

struct BuildState<'a> {
    config: &'a DungeonConfig,
    seed: u64,
    rng: DungeonRng,
    bounds: Rect,
    pieces: Vec<Piece>,
    piece_map: PieceMap,
    frontier: Vec<FrontierExit>,
    placed_rooms: u32,
    placed_corridors: u32,
    placed_interconnects: u32,
}

impl<'a> BuildState<'a> {
    fn new(config: &'a DungeonConfig, seed: u64) -> Self {
        BuildState {
            config,
            seed,
            rng: RngHandler::seeded(seed),
            bounds: Rect::from_position_and_size(Position::ORIGIN, config.grid_size),
            pieces: Vec::new(),
            piece_map: PieceMap::new(config.grid_size),
            frontier: Vec::new(),
            placed_rooms: 0,
            placed_corridors: 0,
            placed_interconnects: 0,
        }
    }

    fn random_room_size(&mut self, bounds: &RoomBounds) -> Size {
        let width = self
            .rng
            .random_range(bounds.min_size.width..=bounds.max_size.width);
        let height = self
            .rng
            .random_range(bounds.min_size.height..=bounds.max_size.height);

        Size::new(width, height)
    }

    // The rect must lie inside the grid over free cells, and the one cell
    // ring around it may only touch `parent`
    fn fits(&self, rect: Rect, parent: Option<PieceId>) -> bool {
        if !self.bounds.contains_rect(&rect) {
            return false;
        }

        rect.expanded_by(PLACEMENT_BUFFER)
            .get_cells()
            .into_iter()
            .all(|cell| match self.piece_map.get(cell) {
                None => true,
                Some(owner) => !rect.contains(cell) && Some(owner) == parent,
            })
    }

    fn commit(&mut self, piece: Piece) -> PieceId {
        let id = self.pieces.len();

        for cell in piece.occupied_cells() {
            self.piece_map.claim(cell, id);
        }

        event!(Level::TRACE, "Committed {} as piece [{}]", piece, id);

        self.pieces.push(piece);
        id
    }

    fn link(&mut self, a: PieceId, exit_a: ExitCandidate, b: PieceId, exit_b: ExitCandidate) {
        self.pieces[a].add_exit(exit_a, b);
        self.pieces[b].add_exit(exit_b, a);
    }

    fn exit_position(&self, exit: &FrontierExit) -> Position {
        self.pieces[exit.piece].global_pos(exit.candidate.local)
    }

    fn into_dungeon(self, initial_room: PieceId) -> Dungeon {
        let report = GenerationReport {
            requested_rooms: self.config.room_count,
            placed_rooms: self.placed_rooms,
            placed_corridors: self.placed_corridors,
            requested_interconnects: self.config.interconnects,
            placed_interconnects: self.placed_interconnects,
        };

        Dungeon::new(
            self.seed,
            self.config.grid_size,
            self.pieces,
            self.piece_map,
            initial_room,
            report,
        )
    }
}
