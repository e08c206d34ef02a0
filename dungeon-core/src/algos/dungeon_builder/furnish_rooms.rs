use super::BuildState;
use crate::pieces::PieceId;

use rand::Rng;
use tracing::{Level, event};

impl BuildState<'_> {
    // Slot count in `0..=max_count` first, then one kind per slot
    pub(super) fn furnish_room(&mut self, room: PieceId) {
        let contents = &self.config.room_contents;
        if contents.is_empty() {
            return;
        }

        let count = self.rng.random_range(0..=contents.max_count);

        let mut slots = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let kind = self.rng.random_range(0..contents.kinds.len());
            slots.push(contents.kinds[kind].clone());
        }

        event!(
            Level::TRACE,
            "Furnished room [{}] with {:?}",
            room,
            slots
        );

        self.pieces[room].set_contents(slots);
    }
}
