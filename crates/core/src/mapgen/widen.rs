//! Corridor widening: long straight runs may grow a parallel lane on one side.

use crate::grid::Grid;
use crate::rng::GameRng;
use crate::types::{Direction, Pos};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct WidenOutcome {
    pub(super) runs: usize,
    pub(super) tiles: Vec<Pos>,
}

pub(super) fn widen_corridors(
    grid: &mut Grid,
    rng: &mut GameRng,
    threshold: usize,
    chance: f64,
) -> WidenOutcome {
    let mut outcome = WidenOutcome::default();
    if threshold == 0 {
        return outcome;
    }
    let mut visited = vec![false; grid.width() * grid.height()];

    let positions: Vec<Pos> = grid.positions().collect();
    for pos in positions {
        let Some(index) = grid.index(pos) else {
            continue;
        };
        if visited[index] || !is_run_cell(grid, pos) {
            continue;
        }
        let open = grid.open_directions(pos);
        let axis = open[0];
        let run = collect_run(grid, pos, axis, &mut visited);
        if run.len() <= threshold || !rng.chance(chance) {
            continue;
        }

        let sides = if axis.is_horizontal() {
            [Direction::Up, Direction::Down]
        } else {
            [Direction::Left, Direction::Right]
        };
        let Some(side) = rng.pick(&sides) else {
            continue;
        };
        outcome.runs += 1;
        for cell in run {
            let lane = cell.step(side);
            if grid.carve(lane) {
                outcome.tiles.push(lane);
            }
        }
    }

    outcome
}

fn is_run_cell(grid: &Grid, pos: Pos) -> bool {
    grid.is_walkable(pos) && grid.room_id(pos).is_none() && grid.is_straight_corridor(pos)
}

/// Straight corridor tiles through `seed` along `axis`, ordered from one end to the other.
fn collect_run(grid: &Grid, seed: Pos, axis: Direction, visited: &mut [bool]) -> Vec<Pos> {
    let mut backward = Vec::new();
    let mut cursor = seed.step(axis.opposite());
    while is_run_cell(grid, cursor) {
        backward.push(cursor);
        cursor = cursor.step(axis.opposite());
    }
    backward.reverse();

    let mut run = backward;
    run.push(seed);
    let mut cursor = seed.step(axis);
    while is_run_cell(grid, cursor) {
        run.push(cursor);
        cursor = cursor.step(axis);
    }

    for pos in &run {
        if let Some(index) = grid.index(*pos) {
            visited[index] = true;
        }
    }
    run
}
