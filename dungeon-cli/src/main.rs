use dungeon_core::{
    Dungeon, DungeonConfig, DungeonStyle, GenerationReport, Map, Position, RoomId, Seed, Size,
    generate_dungeon,
};

use std::{collections::HashSet, time::Instant};

use anyhow::{Context, bail};
use clap::Parser;
use rayon::prelude::*;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, long_about = None)]
struct Args {
    #[clap(short, long, default_value_t, value_enum)]
    style: DungeonStyle,

    /// Seed to generate from, a number or any text
    #[arg(long)]
    seed: Option<String>,

    /// Number of columns in the dungeon, overriding the style
    #[arg(short, long)]
    columns: Option<u32>,

    /// Number of rows in the dungeon, overriding the style
    #[arg(short, long)]
    rows: Option<u32>,

    /// Number of rooms to place, overriding the style
    #[arg(long)]
    rooms: Option<u32>,

    /// Draw the path from the start position to this room
    #[arg(short, long)]
    path: Option<RoomId>,

    /// Generate this many seeds in parallel and print statistics instead
    #[arg(short, long)]
    batch: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> DungeonConfig {
        let mut config = DungeonConfig::from_style(self.style);

        if self.columns.is_some() || self.rows.is_some() {
            config.grid_size = Size::new(
                self.columns.unwrap_or(config.grid_size.width),
                self.rows.unwrap_or(config.grid_size.height),
            );
        }
        if let Some(rooms) = self.rooms {
            config.room_count = rooms;
        }
        config.seed = self.seed.as_deref().map(|seed| match seed.parse::<u64>() {
            Ok(number) => Seed::Number(number),
            Err(_) => Seed::from(seed),
        });

        config
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .init();

    let config = args.config();

    match args.batch {
        Some(count) => run_batch(config, count),
        None => run_single(config, args.path),
    }
}

fn run_single(config: DungeonConfig, target: Option<RoomId>) -> anyhow::Result<()> {
    let map: Map<()> = Map::new(config)?;

    let path = match target {
        Some(room_id) => {
            let Some(room) = map.room(room_id) else {
                bail!(
                    "Room {} does not exist, the dungeon has rooms {:?}",
                    room_id,
                    map.rooms().iter().map(|room| room.id()).collect::<Vec<_>>()
                );
            };

            let area = room.area();
            let goal = Position::new(
                area.origin.x + (area.width as i32 - 1) / 2,
                area.origin.y + (area.height as i32 - 1) / 2,
            );

            let path = map.find_path(map.initial_position(), goal);
            if path.is_empty() {
                bail!("No path from the start position to room {}", room_id);
            }

            path
        }
        None => Vec::new(),
    };

    print!("{}", render(map.dungeon(), map.initial_position(), &path));

    let report = map.dungeon().report();
    println!(
        "seed {} | rooms {}/{} | corridors {} | interconnects {}/{}",
        map.dungeon().seed(),
        report.placed_rooms,
        report.requested_rooms,
        report.placed_corridors,
        report.placed_interconnects,
        report.requested_interconnects
    );
    if !path.is_empty() {
        println!("path of {} cells", path.len());
    }

    Ok(())
}

fn run_batch(config: DungeonConfig, count: u64) -> anyhow::Result<()> {
    let base_seed = config.seed.as_ref().map(Seed::value).unwrap_or_default();
    let batch_start = Instant::now();

    let outcomes = (0..count)
        .into_par_iter()
        .map(|offset| -> anyhow::Result<(GenerationReport, bool)> {
            let seed = base_seed.wrapping_add(offset);
            let dungeon = generate_dungeon(config.clone().with_seed(seed))
                .with_context(|| format!("Generating seed {}", seed))?;

            Ok((dungeon.report(), dungeon.is_connected()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let elapsed = batch_start.elapsed();

    let complete = outcomes
        .iter()
        .filter(|(report, _)| report.is_complete())
        .count();
    let disconnected = outcomes
        .iter()
        .filter(|(_, connected)| !connected)
        .count();
    let (rooms, corridors, interconnects) = outcomes.iter().fold(
        (0_u64, 0_u64, 0_u64),
        |(rooms, corridors, interconnects), (report, _)| {
            (
                rooms + report.placed_rooms as u64,
                corridors + report.placed_corridors as u64,
                interconnects + report.placed_interconnects as u64,
            )
        },
    );

    let total = outcomes.len().max(1) as f64;

    println!("dungeons       {}", outcomes.len());
    println!("complete       {}", complete);
    println!("disconnected   {}", disconnected);
    println!("avg rooms      {:.2}", rooms as f64 / total);
    println!("avg corridors  {:.2}", corridors as f64 / total);
    println!("avg loops      {:.2}", interconnects as f64 / total);
    println!("total time     {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}

/// Walls as `#`, floor as `.`, untouched ground blank, the start as `@` and
/// the path as `*`.
fn render(dungeon: &Dungeon, start: Position, path: &[Position]) -> String {
    let path = path.iter().copied().collect::<HashSet<_>>();
    let size = dungeon.size();

    let mut output = String::with_capacity(((size.width + 1) * size.height) as usize);

    for y in 0..size.height as i32 {
        for x in 0..size.width as i32 {
            let cell = Position::new(x, y);

            let glyph = if cell == start {
                '@'
            } else if path.contains(&cell) {
                '*'
            } else if dungeon.piece_at(cell).is_none() {
                ' '
            } else if dungeon.blocked(cell) {
                '#'
            } else {
                '.'
            };

            output.push(glyph);
        }
        output.push('\n');
    }

    output
}
