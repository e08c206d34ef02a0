mod dungeon_builder;
mod path_finder;

pub use dungeon_builder::{
    DungeonBuilder, DungeonConfig, DungeonStyle, RoomBounds, RoomContents, Seed,
};
pub(crate) use path_finder::{find_path, path_cost};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub(crate) type DungeonRng = ChaCha8Rng;

pub(crate) struct RngHandler;

impl RngHandler {
    // The single stream every placement decision is drawn from
    pub fn seeded(seed: u64) -> DungeonRng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    // A fresh seed for configurations that did not pin one
    pub fn entropy_seed() -> u64 {
        rand::rng().random()
    }
}
