use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use meiro_core::{Direction, Game, GameConfig, TurnInput};
use meiro_tools::config_file::load_config;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about = "Play randomized runs and check state invariants", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 8)]
    runs: u64,
    #[arg(short, long, default_value_t = 2000)]
    turns: u64,
    /// Share of turns that follow auto-travel toward the stairs, in percent
    #[arg(long, default_value_t = 70)]
    travel_percent: u64,
    #[arg(short, long)]
    config: Option<PathBuf>,
}

const INPUTS: [TurnInput; 5] = [
    TurnInput::Move(Direction::Up),
    TurnInput::Move(Direction::Right),
    TurnInput::Move(Direction::Down),
    TurnInput::Move(Direction::Left),
    TurnInput::Wait,
];

fn choose_input(game: &Game, rng: &mut ChaCha8Rng, travel_percent: u64) -> TurnInput {
    if rng.next_u64() % 100 < travel_percent
        && let Some(direction) = game.auto_travel_step(game.state().goal)
    {
        return TurnInput::Move(direction);
    }
    INPUTS[rng.next_u64() as usize % INPUTS.len()]
}

fn check_invariants(game: &Game) -> Result<()> {
    let state = game.state();
    let player = &state.player;
    ensure!(player.hp <= player.max_hp, "Invariant failed: HP > Max HP at turn {}", game.turn());
    ensure!(
        state.grid.is_walkable(player.pos),
        "Invariant failed: player inside wall at turn {}",
        game.turn()
    );
    ensure!(
        player.inventory.len() <= player.inventory_capacity,
        "Invariant failed: inventory overflow at turn {}",
        game.turn()
    );
    let mut occupied = BTreeSet::new();
    for enemy in state.enemies.values() {
        ensure!(
            state.grid.is_walkable(enemy.pos),
            "Invariant failed: enemy inside wall at turn {}",
            game.turn()
        );
        ensure!(enemy.pos != player.pos, "Invariant failed: enemy on player at turn {}", game.turn());
        ensure!(occupied.insert(enemy.pos), "Invariant failed: stacked enemies at turn {}", game.turn());
    }
    Ok(())
}

fn soak_run(seed: u64, config: &GameConfig, args: &Args) -> Result<Game> {
    let mut game = Game::new(seed, config.clone())
        .with_context(|| format!("First floor failed for seed {seed}"))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    while !game.is_finished() && game.turn() < args.turns {
        let input = choose_input(&game, &mut rng, args.travel_percent);
        game.step(input).with_context(|| format!("Step failed for seed {seed}"))?;
        check_invariants(&game).with_context(|| format!("Seed {seed}"))?;
    }
    Ok(game)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };

    println!("Starting soak on seed {} for {} runs of up to {} turns...", args.seed, args.runs, args.turns);
    let mut deepest = 0;
    for run in 0..args.runs {
        let seed = args.seed.wrapping_add(run);
        let game = soak_run(seed, &config, &args)?;
        deepest = deepest.max(game.depth());
        println!(
            "seed {seed}: outcome {:?} depth {} turns {} events {} hash {:016x}",
            game.outcome(),
            game.depth(),
            game.turn(),
            game.log().len(),
            game.snapshot_hash()
        );
    }
    println!("Soak completed successfully. Deepest floor reached: {deepest}");
    Ok(())
}
