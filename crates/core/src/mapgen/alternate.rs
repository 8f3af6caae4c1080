//! Guarantees a second start-to-goal route by tunnelling around bridge steps.

use std::collections::VecDeque;

use crate::grid::{Grid, neighbors};
use crate::rng::GameRng;
use crate::types::Pos;

use super::metrics::{bridges_on_route, route};

/// Repeatedly finds a bridge on the shortest route and digs the shortest wall
/// tunnel that reconnects the start side with the far side. Returns tiles carved.
pub(super) fn ensure_alternate_route(
    grid: &mut Grid,
    rng: &mut GameRng,
    start: Pos,
    goal: Pos,
    max_tries: usize,
) -> usize {
    let mut carved = 0;
    for _ in 0..max_tries {
        let bridges = bridges_on_route(grid, start, goal);
        let Some(bridge) = rng.pick(&bridges) else {
            break;
        };
        let path = route(grid, start, goal);
        match dig_bypass(grid, rng, start, bridge, &path) {
            Some(count) => carved += count,
            None => break,
        }
    }
    carved
}

/// Walkable tiles reachable from `start` without crossing `edge`.
fn near_side(grid: &Grid, start: Pos, edge: (Pos, Pos)) -> Vec<bool> {
    let mut side = vec![false; grid.width() * grid.height()];
    let Some(start_index) = grid.index(start) else {
        return side;
    };
    side[start_index] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in neighbors(current) {
            if (current == edge.0 && next == edge.1) || (current == edge.1 && next == edge.0) {
                continue;
            }
            let Some(index) = grid.index(next) else {
                continue;
            };
            if !side[index] && grid.is_walkable(next) {
                side[index] = true;
                queue.push_back(next);
            }
        }
    }
    side
}

fn dig_bypass(
    grid: &mut Grid,
    rng: &mut GameRng,
    start: Pos,
    bridge: (Pos, Pos),
    path: &[Pos],
) -> Option<usize> {
    let side = near_side(grid, start, bridge);
    let on_side = |pos: Pos| grid.index(pos).is_some_and(|index| side[index]);

    let mut path_seeds: Vec<Pos> = path.iter().copied().filter(|pos| on_side(*pos)).collect();
    let mut other_seeds: Vec<Pos> = grid
        .walkable_positions()
        .filter(|pos| on_side(*pos) && !path.contains(pos))
        .collect();
    rng.shuffle(&mut path_seeds);
    rng.shuffle(&mut other_seeds);

    let cell_count = grid.width() * grid.height();
    let mut came_from: Vec<Option<Pos>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    let mut queue = VecDeque::new();
    for seed in path_seeds.into_iter().chain(other_seeds) {
        if let Some(index) = grid.index(seed) {
            visited[index] = true;
        }
        queue.push_back(seed);
    }

    let mut exit = None;
    'search: while let Some(current) = queue.pop_front() {
        let current_is_wall = !grid.is_walkable(current);
        for next in neighbors(current) {
            let Some(index) = grid.index(next) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            if grid.is_walkable(next) {
                if current_is_wall && !side[index] {
                    exit = Some(current);
                    break 'search;
                }
                continue;
            }
            if !grid.is_interior(next) {
                continue;
            }
            visited[index] = true;
            came_from[index] = Some(current);
            queue.push_back(next);
        }
    }

    let mut cursor = exit?;
    let mut tunnel = Vec::new();
    while !grid.is_walkable(cursor) {
        tunnel.push(cursor);
        let index = grid.index(cursor)?;
        cursor = came_from[index]?;
    }
    for pos in &tunnel {
        grid.carve(*pos);
    }
    Some(tunnel.len())
}
