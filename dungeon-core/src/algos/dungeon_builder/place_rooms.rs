use super::{BuildState, FrontierExit};
use crate::{
    error::GenerationError,
    pieces::{ExitCandidate, Piece, PieceId},
    types::{Position, Rect},
};

use rand::{Rng, seq::SliceRandom};
use tracing::{Level, event};

impl BuildState<'_> {
    pub(super) fn place_initial_room(&mut self) -> Result<PieceId, GenerationError> {
        let bounds = self.config.initial_room;
        let room_size = self.random_room_size(&bounds);

        let mut room = Piece::new_room(room_size, self.config.symmetric_rooms, bounds.max_exits)?;
        let size = room.size();
        let grid = self.config.grid_size;

        let position = match bounds.position {
            Some(position) => position,
            None if size.fits_within(&grid) => {
                let x = self.rng.random_range(0..=grid.width - size.width);
                let y = self.rng.random_range(0..=grid.height - size.height);

                Position::new(x as i32, y as i32)
            }
            None => Position::ORIGIN,
        };

        if !self.fits(Rect::from_position_and_size(position, size), None) {
            return Err(GenerationError::InitialRoomDoesNotFit {
                position,
                size,
                grid,
            });
        }

        room.place_at(position);

        let room_id = self.commit(room);
        self.placed_rooms += 1;
        self.admit_exits(room_id, None);
        self.furnish_room(room_id);

        event!(
            Level::DEBUG,
            "Placed initial room {}",
            self.pieces[room_id]
        );

        Ok(room_id)
    }

    // `entrance` counts towards the room's exits but is not offered again
    fn admit_exits(&mut self, piece: PieceId, entrance: Option<ExitCandidate>) {
        let room = &self.pieces[piece];

        let budget = room
            .max_exits()
            .saturating_sub(u32::from(entrance.is_some())) as usize;

        let mut candidates = room
            .perimeter()
            .iter()
            .copied()
            .filter(|candidate| Some(*candidate) != entrance)
            .collect::<Vec<_>>();

        candidates.shuffle(&mut self.rng);
        candidates.truncate(budget);

        self.frontier.extend(
            candidates
                .into_iter()
                .map(|candidate| FrontierExit { piece, candidate }),
        );
    }

    pub(super) fn grow_rooms(&mut self) {
        while self.placed_rooms < self.config.room_count && !self.frontier.is_empty() {
            let idx = self.rng.random_range(0..self.frontier.len());
            let exit = self.frontier.swap_remove(idx);

            let mut attachment = exit;
            let mut corridor = None;

            if self.rng.random_bool(self.config.corridor_density) {
                let (min, max) = self.config.corridor_length;
                let length = self.rng.random_range(min..=max);

                if length > 0 {
                    if let Some((corridor_id, far_end)) = self.try_corridor(&exit, length) {
                        attachment = FrontierExit {
                            piece: corridor_id,
                            candidate: far_end,
                        };
                        corridor = Some(corridor_id);
                    }
                }
            }

            if self.try_room(&attachment).is_none() && corridor.is_some() {
                // The corridor stays, so its far end remains usable
                self.frontier.push(attachment);
            }
        }

        if self.placed_rooms < self.config.room_count {
            event!(
                Level::DEBUG,
                "Frontier exhausted after placing {} of {} rooms",
                self.placed_rooms,
                self.config.room_count
            );
        }
    }

    fn try_corridor(&mut self, exit: &FrontierExit, length: u32) -> Option<(PieceId, ExitCandidate)> {
        let direction = exit.candidate.direction;

        let mut corridor = Piece::new_corridor(length, direction).ok()?;
        let near_end = corridor.near_end()?;
        let far_end = corridor.far_end()?;

        let target = self.exit_position(exit).step(direction);
        corridor.place_at(target.offset_by(-near_end.local.x, -near_end.local.y));

        if !self.fits(corridor.rect(), Some(exit.piece)) {
            event!(
                Level::TRACE,
                "Rejected corridor {} from piece [{}]",
                corridor,
                exit.piece
            );
            return None;
        }

        let corridor_id = self.commit(corridor);
        self.link(exit.piece, exit.candidate, corridor_id, near_end);
        self.placed_corridors += 1;

        Some((corridor_id, far_end))
    }

    fn try_room(&mut self, exit: &FrontierExit) -> Option<PieceId> {
        let bounds = self.config.generic_room;
        let room_size = self.random_room_size(&bounds);

        let mut room = Piece::new_room(room_size, self.config.symmetric_rooms, bounds.max_exits).ok()?;

        let entrances = room.candidates_facing(exit.candidate.direction.reverse());
        if entrances.is_empty() {
            return None;
        }
        let entrance = entrances[self.rng.random_range(0..entrances.len())];

        let target = self.exit_position(exit).step(exit.candidate.direction);
        room.place_at(target.offset_by(-entrance.local.x, -entrance.local.y));

        if !self.fits(room.rect(), Some(exit.piece)) {
            event!(
                Level::TRACE,
                "Rejected room {} from piece [{}]",
                room,
                exit.piece
            );
            return None;
        }

        let room_id = self.commit(room);
        self.link(exit.piece, exit.candidate, room_id, entrance);
        self.placed_rooms += 1;
        self.admit_exits(room_id, Some(entrance));
        self.furnish_room(room_id);

        Some(room_id)
    }
}
