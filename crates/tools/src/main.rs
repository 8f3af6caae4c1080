use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use meiro_core::{
    EnemyKind, Faction, GameConfig, GameRng, GeneratedFloor, ItemKind, LayoutKind, MapGenerator,
    Pos, TrapKind,
};
use meiro_core::rng::derive_floor_seed;
use meiro_tools::config_file::{load_config, write_config_atomic};
use meiro_tools::render::render_floor;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Rooms,
    Maze,
}

#[derive(Parser)]
#[command(author, version, about = "Generate a floor and print it", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1)]
    depth: u32,
    /// Overrides the per-depth width; even values are rounded up to odd.
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
    /// TOML file with configuration overrides
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print a JSON dump instead of the ASCII map
    #[arg(long)]
    json: bool,
    /// Also write the resolved configuration (file plus flags) to this TOML path
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

#[derive(Serialize)]
struct EnemyDump {
    kind: EnemyKind,
    faction: Faction,
    pos: Pos,
}

#[derive(Serialize)]
struct ItemDump {
    kind: ItemKind,
    pos: Pos,
}

#[derive(Serialize)]
struct TrapDump {
    kind: TrapKind,
    pos: Pos,
}

#[derive(Serialize)]
struct FloorDump {
    seed: u64,
    depth: u32,
    width: usize,
    height: usize,
    start: Pos,
    goal: Pos,
    rows: Vec<String>,
    enemies: Vec<EnemyDump>,
    items: Vec<ItemDump>,
    traps: Vec<TrapDump>,
    restarts: u32,
    junction_ratio: f64,
}

impl FloorDump {
    fn new(seed: u64, floor: &GeneratedFloor) -> Self {
        let traps = floor
            .grid
            .positions()
            .filter_map(|pos| floor.grid.trap(pos).map(|trap| TrapDump { kind: trap.kind, pos }))
            .collect();
        Self {
            seed,
            depth: floor.depth,
            width: floor.width(),
            height: floor.height(),
            start: floor.start,
            goal: floor.goal,
            rows: render_floor(floor),
            enemies: floor
                .enemy_spawns
                .iter()
                .map(|spawn| EnemyDump { kind: spawn.kind, faction: spawn.faction, pos: spawn.pos })
                .collect(),
            items: floor
                .item_spawns
                .iter()
                .map(|spawn| ItemDump { kind: spawn.kind, pos: spawn.pos })
                .collect(),
            traps,
            restarts: floor.report.restarts,
            junction_ratio: floor.report.junction_ratio,
        }
    }
}

fn summary(floor: &GeneratedFloor) -> String {
    let report = &floor.report;
    format!(
        "{}x{} depth {} | restarts {} | dead ends {} -> {} (ratio {:.2}, braided {}) | branch carves {} | \
         alternate carves {} | widened runs {} | rocks {} | traps {} | junction ratio {:.3}",
        floor.width(),
        floor.height(),
        floor.depth,
        report.restarts,
        report.dead_ends_before_braid,
        report.dead_ends_after_braid,
        report.braid_ratio,
        report.braided,
        report.branch_carves,
        report.alternate_carves,
        report.widened_runs,
        report.rocks,
        report.traps,
        report.junction_ratio,
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    if let Some(layout) = args.layout {
        config.generator.layout = match layout {
            LayoutArg::Rooms => LayoutKind::Rooms,
            LayoutArg::Maze => LayoutKind::Maze,
        };
    }

    if let Some(path) = &args.dump_config {
        write_config_atomic(&config, path)?;
    }

    let generator = MapGenerator::new(&config);
    let floor = if args.width.is_some() || args.height.is_some() {
        let (default_width, default_height) = config.level.grid_size(args.depth);
        let mut rng = GameRng::from_seed(derive_floor_seed(args.seed, args.depth));
        generator.generate(
            &mut rng,
            args.width.unwrap_or(default_width),
            args.height.unwrap_or(default_height),
            args.depth,
        )
    } else {
        generator.generate_for_depth(args.seed, args.depth)
    }
    .with_context(|| format!("Generation failed for seed {} depth {}", args.seed, args.depth))?;

    if args.json {
        let dump = FloorDump::new(args.seed, &floor);
        println!("{}", serde_json::to_string_pretty(&dump).context("Failed to serialize floor")?);
    } else {
        for row in render_floor(&floor) {
            println!("{row}");
        }
        println!("{}", summary(&floor));
    }
    Ok(())
}
