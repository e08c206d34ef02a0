use dungeon_core::{
    ConfigError, Direction, Dungeon, DungeonBuilder, DungeonConfig, DungeonStyle, GenerationError,
    PieceKind, Position, RoomBounds, RoomContents, Seed, Size, generate_dungeon,
};

use std::collections::{HashMap, HashSet};

const STYLES: [DungeonStyle; 4] = [
    DungeonStyle::Compact,
    DungeonStyle::Sprawling,
    DungeonStyle::Symmetric,
    DungeonStyle::Labyrinth,
];

fn generate(style: DungeonStyle, seed: u64) -> (DungeonConfig, Dungeon) {
    let config = DungeonConfig::from_style(style).with_seed(seed);
    let dungeon = generate_dungeon(config.clone()).unwrap();

    (config, dungeon)
}

fn for_each_dungeon(mut check: impl FnMut(&DungeonConfig, &Dungeon)) {
    for style in STYLES {
        for seed in 0..8 {
            let (config, dungeon) = generate(style, seed);
            check(&config, &dungeon);
        }
    }
}

#[test]
fn test_same_seed_same_dungeon() {
    for style in STYLES {
        for seed in [0, 7, 12345] {
            let (_, first) = generate(style, seed);
            let (_, second) = generate(style, seed);

            assert_eq!(first, second, "{:?} seed {}", style, seed);
            assert_eq!(first.start_pos(), second.start_pos());
            assert_eq!(first.grid(), second.grid());
        }
    }
}

#[test]
fn test_text_seed_is_reproducible() {
    let config = DungeonConfig::from_style(DungeonStyle::Sprawling).with_seed("mossy cellar");

    let first = generate_dungeon(config.clone()).unwrap();
    let second = generate_dungeon(config).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.seed(), Seed::from("mossy cellar").value());
}

#[test]
fn test_different_seeds_differ() {
    let (_, first) = generate(DungeonStyle::Sprawling, 1);
    let (_, second) = generate(DungeonStyle::Sprawling, 2);

    assert_ne!(first.grid(), second.grid());
}

#[test]
fn test_unseeded_generation_reports_its_seed() {
    let config = DungeonConfig::from_style(DungeonStyle::Compact);
    assert!(config.seed.is_none());

    let dungeon = generate_dungeon(config.clone()).unwrap();
    let replay = generate_dungeon(config.with_seed(dungeon.seed())).unwrap();

    assert_eq!(dungeon, replay);
}

#[test]
fn test_pieces_never_overlap() {
    for_each_dungeon(|_, dungeon| {
        let mut owners = HashMap::new();

        for (id, piece) in dungeon.pieces().iter().enumerate() {
            for cell in piece.occupied_cells() {
                if let Some(other) = owners.insert(cell, id) {
                    panic!("pieces {} and {} both claim {}", other, id, cell);
                }
                assert_eq!(dungeon.piece_at(cell), Some(id));
            }
        }
    });
}

#[test]
fn test_every_room_is_reachable() {
    for_each_dungeon(|_, dungeon| {
        let reached = dungeon.reachable_from(dungeon.initial_room());

        for (id, _) in dungeon.rooms() {
            assert!(reached[id], "room {} is unreachable", id);
        }
        assert!(dungeon.is_connected());
    });
}

#[test]
fn test_linked_exits_face_each_other() {
    for_each_dungeon(|_, dungeon| {
        for (id, piece) in dungeon.pieces().iter().enumerate() {
            for exit in piece.exits() {
                let target = dungeon.piece(exit.target).unwrap();

                let back = target
                    .exits()
                    .find(|other| other.target == id && other.position == exit.step_in())
                    .unwrap_or_else(|| panic!("{} has no way back to {}", target, piece));

                assert_eq!(back.direction, exit.direction.reverse());
                assert_eq!(back.step_in(), exit.position);
                assert!(!dungeon.blocked(exit.position));
                assert!(!dungeon.blocked(back.position));
            }
        }
    });
}

#[test]
fn test_sizes_stay_within_bounds() {
    for_each_dungeon(|config, dungeon| {
        for (id, piece) in dungeon.rooms() {
            let bounds = if id == dungeon.initial_room() {
                config.initial_room
            } else {
                config.generic_room
            };
            let size = piece.room_size().unwrap();

            assert!(bounds.min_size.fits_within(&size), "{}", piece);
            assert!(size.fits_within(&bounds.max_size), "{}", piece);
            assert!(piece.exit_count() as u32 <= bounds.max_exits, "{}", piece);
        }

        let (min, max) = config.corridor_length;
        for (_, piece) in dungeon.corridors() {
            match piece.kind() {
                PieceKind::Corridor { length, .. } => {
                    assert!((min..=max).contains(&length), "{}", piece)
                }
                PieceKind::Interconnect { length } => {
                    assert!(length <= config.max_interconnect_length, "{}", piece)
                }
                PieceKind::Room { .. } => unreachable!(),
            }
        }

        let grid = dungeon.grid().rect();
        for piece in dungeon.pieces() {
            assert!(grid.contains_rect(&piece.rect()), "{}", piece);
        }
    });
}

#[test]
fn test_report_matches_pieces() {
    for_each_dungeon(|config, dungeon| {
        let report = dungeon.report();

        assert_eq!(report.requested_rooms, config.room_count);
        assert_eq!(report.placed_rooms as usize, dungeon.rooms().count());
        assert!(report.placed_rooms <= config.room_count);
        assert!(report.placed_interconnects <= config.interconnects);

        let interconnects = dungeon
            .corridors()
            .filter(|(_, piece)| matches!(piece.kind(), PieceKind::Interconnect { .. }))
            .count();
        assert_eq!(report.placed_interconnects as usize, interconnects);
        assert_eq!(
            report.placed_corridors as usize + interconnects,
            dungeon.corridors().count()
        );
    });
}

#[test]
fn test_room_contents_stay_within_bounds() {
    for_each_dungeon(|config, dungeon| {
        let contents = &config.room_contents;

        for (_, room) in dungeon.rooms() {
            assert!(room.contents().len() as u32 <= contents.max_count, "{}", room);
            assert!(room.contents().iter().all(|kind| contents.kinds.contains(kind)));
        }
        for (_, corridor) in dungeon.corridors() {
            assert!(corridor.contents().is_empty(), "{}", corridor);
        }
    });
}

#[test]
fn test_room_contents_follow_the_seed() {
    let config = DungeonConfig {
        room_contents: RoomContents::new(["chest", "fountain", "rock"], 5),
        ..DungeonConfig::from_style(DungeonStyle::Labyrinth)
    };

    let contents_of = |seed: u64| {
        generate_dungeon(config.clone().with_seed(seed))
            .unwrap()
            .rooms()
            .map(|(_, room)| room.contents().to_vec())
            .collect::<Vec<_>>()
    };

    assert_eq!(contents_of(6), contents_of(6));
    assert_ne!(contents_of(6), contents_of(7));
}

#[test]
fn test_symmetric_rooms_only_offer_wall_midpoints() {
    for seed in 0..8 {
        let (_, dungeon) = generate(DungeonStyle::Symmetric, seed);

        for (_, room) in dungeon.rooms() {
            let rect = room.rect();
            let (mid_x, mid_y) = (
                rect.origin.x + (rect.width as i32 - 1) / 2,
                rect.origin.y + (rect.height as i32 - 1) / 2,
            );

            let expected = HashSet::from([
                (Position::new(mid_x, rect.origin.y), Direction::North),
                (Position::new(mid_x, rect.bottom() - 1), Direction::South),
                (Position::new(rect.origin.x, mid_y), Direction::West),
                (Position::new(rect.right() - 1, mid_y), Direction::East),
            ]);
            let candidates = room.exit_candidates().collect::<HashSet<_>>();

            assert_eq!(candidates, expected, "{}", room);

            for exit in room.exits() {
                assert!(expected.contains(&(exit.position, exit.direction)), "{}", room);
            }
        }
    }
}

#[test]
fn test_start_position_is_inside_initial_room() {
    for_each_dungeon(|_, dungeon| {
        let room = dungeon.piece(dungeon.initial_room()).unwrap();

        assert!(room.interior().unwrap().contains(dungeon.start_pos()));
        assert!(!dungeon.blocked(dungeon.start_pos()));
    });
}

#[test]
fn test_single_fixed_room() {
    let config = DungeonConfig {
        grid_size: Size::new(20, 20),
        initial_room: RoomBounds::fixed(Size::new(3, 3), 4),
        room_count: 1,
        interconnects: 0,
        seed: Some(Seed::from("abc")),
        ..DungeonConfig::default()
    };

    let dungeon = generate_dungeon(config).unwrap();

    assert_eq!(dungeon.rooms().count(), 1);
    assert!(dungeon.report().is_complete());

    let (_, room) = dungeon.rooms().next().unwrap();
    assert_eq!(room.room_size(), Some(Size::new(3, 3)));
    assert!(room.interior().unwrap().contains(dungeon.start_pos()));
}

#[test]
fn test_pinned_initial_room() {
    let mut config = DungeonConfig::from_style(DungeonStyle::Compact).with_seed(3_u64);
    config.initial_room.position = Some(Position::new(4, 6));

    let dungeon = generate_dungeon(config.clone()).unwrap();
    let room = dungeon.piece(dungeon.initial_room()).unwrap();
    assert_eq!(room.position(), Position::new(4, 6));

    config.initial_room.position = Some(Position::new(38, 6));
    assert!(matches!(
        generate_dungeon(config),
        Err(GenerationError::InitialRoomDoesNotFit { .. })
    ));
}

#[test]
fn test_invalid_config_is_rejected_before_placement() {
    let mut config = DungeonConfig::from_style(DungeonStyle::Compact);
    config.generic_room.min_size = Size::new(0, 2);

    assert!(DungeonBuilder::new(config.clone()).is_err());
    assert!(matches!(
        generate_dungeon(config),
        Err(GenerationError::InvalidConfig(_))
    ));

    // Attached rooms could never honour a zero exit cap
    let mut config = DungeonConfig::from_style(DungeonStyle::Compact).with_seed(1_u64);
    config.generic_room = RoomBounds::fixed(Size::new(3, 3), 0);
    config.room_count = 3;
    assert_eq!(
        generate_dungeon(config),
        Err(GenerationError::InvalidConfig(ConfigError::GenericRoomWithoutExits))
    );
}
