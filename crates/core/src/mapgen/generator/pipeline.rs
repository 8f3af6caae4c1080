//! One generation attempt: topology, loop passes, decoration, validation, spawns.

use crate::config::{GeneratorConfig, LayoutKind, LevelConfig};
use crate::grid::Grid;
use crate::rng::GameRng;
use crate::types::Terrain;

use super::super::alternate::ensure_alternate_route;
use super::super::braid::braid_dead_ends;
use super::super::branching::enforce_junction_density;
use super::super::corridors::connect_rooms;
use super::super::decorate::{decorate_terrain, revert_rocks};
use super::super::layout::{BaseLayout, build_maze_layout, carve_room, place_rooms};
use super::super::metrics::{check_invariants, junction_ratio, junctions};
use super::super::model::{FloorMetadata, GeneratedFloor, GenerationReport};
use super::super::spawns::{SpawnContext, generate_enemy_spawns, generate_item_spawns, place_traps};
use super::super::widen::widen_corridors;

pub(super) struct AttemptInputs<'a> {
    pub(super) generator: &'a GeneratorConfig,
    pub(super) level: &'a LevelConfig,
    pub(super) smoke_chance: f64,
    pub(super) width: usize,
    pub(super) height: usize,
    pub(super) depth: u32,
}

fn build_rooms_layout(grid: &mut Grid, rng: &mut GameRng, config: &GeneratorConfig) -> Option<BaseLayout> {
    let rooms = place_rooms(grid, rng, config)?;
    for room in &rooms {
        carve_room(grid, room);
    }
    connect_rooms(grid, rng, &rooms, config.extra_corridors);
    let start = rooms.first()?.center();
    let goal = rooms.last()?.center();
    Some(BaseLayout { rooms, start, goal })
}

/// Returns `None` when the attempt cannot satisfy the floor invariants and must restart.
pub(super) fn attempt_floor(rng: &mut GameRng, inputs: &AttemptInputs<'_>) -> Option<GeneratedFloor> {
    let config = inputs.generator;
    let mut grid = Grid::new(inputs.width, inputs.height);
    let layout = match config.layout {
        LayoutKind::Rooms => build_rooms_layout(&mut grid, rng, config)?,
        LayoutKind::Maze => build_maze_layout(&mut grid, rng, config),
    };
    let BaseLayout { rooms, start, goal } = layout;
    if start == goal {
        return None;
    }

    let mut report = GenerationReport::default();
    let braid = braid_dead_ends(
        &mut grid,
        rng,
        config.braid_min,
        config.braid_max,
        config.braid_tunnel_depth,
    );
    report.dead_ends_before_braid = braid.dead_ends_before;
    report.dead_ends_after_braid = braid.dead_ends_after;
    report.braid_ratio = braid.ratio;
    report.braided = braid.opened;
    if report.dead_ends_after_braid + report.braid_quota() > report.dead_ends_before_braid {
        return None;
    }

    report.branch_carves = enforce_junction_density(&mut grid, rng, config.min_junction_ratio);
    report.alternate_carves =
        ensure_alternate_route(&mut grid, rng, start, goal, config.alternative_max_tries);
    let widened = widen_corridors(
        &mut grid,
        rng,
        config.widen_threshold,
        config.widen_chance,
    );
    report.widened_runs = widened.runs;
    // Widening and tunnelling change neighbor counts, so top the density back up.
    report.branch_carves += enforce_junction_density(&mut grid, rng, config.min_junction_ratio);

    let decorations = decorate_terrain(&mut grid, rng, config.decoration_chance, &[start, goal]);
    if !decorations.rocks.is_empty()
        && check_invariants(&grid, start, goal, config.min_junction_ratio).is_err()
    {
        revert_rocks(&mut grid, &decorations.rocks);
    } else {
        report.rocks = decorations.rocks.len();
    }

    grid.set_terrain(goal, Terrain::Stairs);
    check_invariants(&grid, start, goal, config.min_junction_ratio).ok()?;
    report.junction_ratio = junction_ratio(&grid);

    let metadata = FloorMetadata {
        widened: widened.tiles.into_iter().filter(|pos| grid.is_walkable(*pos)).collect(),
        junctions: junctions(&grid),
    };
    let context = SpawnContext {
        depth: inputs.depth,
        level: inputs.level,
        smoke_chance: inputs.smoke_chance,
        start,
        goal,
        rooms: &rooms,
        metadata: &metadata,
    };
    let item_spawns = generate_item_spawns(&grid, rng, &context);
    report.traps = place_traps(&mut grid, rng, &context, &item_spawns);
    let enemy_spawns = generate_enemy_spawns(&grid, rng, &context);

    Some(GeneratedFloor {
        depth: inputs.depth,
        grid,
        rooms,
        start,
        goal,
        metadata,
        report,
        enemy_spawns,
        item_spawns,
    })
}
