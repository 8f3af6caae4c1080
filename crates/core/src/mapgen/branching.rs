//! Junction density top-up: carves short side links until enough tiles are forks.

use crate::grid::{Grid, neighbors};
use crate::rng::GameRng;
use crate::types::{Direction, Pos};

/// Carves single-wall links off corridor tiles until the junction ratio reaches
/// `target_ratio` or attempts run out. Returns the number of tiles carved.
pub(super) fn enforce_junction_density(grid: &mut Grid, rng: &mut GameRng, target_ratio: f64) -> usize {
    let mut corridor: Vec<Pos> =
        grid.walkable_positions().filter(|pos| grid.room_id(*pos).is_none()).collect();
    if corridor.is_empty() {
        corridor = grid.walkable_positions().collect();
    }

    let mut walkable = grid.walkable_count();
    let mut junction_count = grid.walkable_positions().filter(|pos| grid.is_junction(*pos)).count();
    let max_attempts = walkable.saturating_mul(4);
    let mut attempts = 0;
    let mut carved = 0;

    while walkable > 0
        && (junction_count as f64) < target_ratio * walkable as f64
        && attempts < max_attempts
    {
        attempts += 1;
        let Some(cell) = rng.pick(&corridor) else {
            break;
        };
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                let wall = cell.step(*direction);
                grid.is_interior(wall)
                    && !grid.is_walkable(wall)
                    && grid.is_walkable(wall.step(*direction))
            })
            .collect();
        let Some(direction) = rng.pick(&options) else {
            continue;
        };
        let wall = cell.step(direction);

        let affected = neighbors(wall);
        junction_count -= affected.iter().filter(|pos| grid.is_junction(**pos)).count();
        grid.carve(wall);
        junction_count += affected.iter().filter(|pos| grid.is_junction(**pos)).count();
        if grid.is_junction(wall) {
            junction_count += 1;
        }
        walkable += 1;
        carved += 1;
        corridor.push(wall);
    }

    carved
}
