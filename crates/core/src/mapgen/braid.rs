//! Dead-end braiding: reopens a random share of dead ends into loops.

use crate::grid::Grid;
use crate::rng::GameRng;
use crate::types::{Direction, Pos};

use super::metrics::dead_ends;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(super) struct BraidOutcome {
    pub(super) dead_ends_before: usize,
    pub(super) dead_ends_after: usize,
    pub(super) ratio: f64,
    pub(super) opened: usize,
}

pub(super) fn braid_dead_ends(
    grid: &mut Grid,
    rng: &mut GameRng,
    braid_min: f64,
    braid_max: f64,
    tunnel_depth: usize,
) -> BraidOutcome {
    let mut candidates = dead_ends(grid);
    let dead_ends_before = candidates.len();
    let ratio = if braid_max > braid_min { rng.range_f64(braid_min, braid_max) } else { braid_min };
    let target = (candidates.len() as f64 * ratio).floor() as usize;
    rng.shuffle(&mut candidates);

    // Carving never lowers a neighbor count, so every resolved candidate stays resolved.
    // Keep going past the first `target` candidates when some of them cannot be opened.
    let mut opened = 0;
    let mut resolved = 0;
    for cell in candidates {
        if resolved >= target {
            break;
        }
        // An earlier carve may already have joined this one.
        if !grid.is_dead_end(cell) {
            resolved += 1;
            continue;
        }
        if open_through_single_wall(grid, rng, cell) || tunnel_forward(grid, cell, tunnel_depth) {
            opened += 1;
            resolved += 1;
        }
    }

    BraidOutcome { dead_ends_before, dead_ends_after: dead_ends(grid).len(), ratio, opened }
}

fn open_through_single_wall(grid: &mut Grid, rng: &mut GameRng, cell: Pos) -> bool {
    let options: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|direction| {
            let wall = cell.step(*direction);
            let beyond = wall.step(*direction);
            grid.is_interior(wall) && !grid.is_walkable(wall) && grid.is_walkable(beyond)
        })
        .collect();
    match rng.pick(&options) {
        Some(direction) => grid.carve(cell.step(direction)),
        None => false,
    }
}

/// Digs straight ahead, away from the only open side, until it meets open ground.
fn tunnel_forward(grid: &mut Grid, cell: Pos, max_depth: usize) -> bool {
    let open = grid.open_directions(cell);
    let [back] = open.as_slice() else {
        return false;
    };
    let forward = back.opposite();

    let mut dug = Vec::new();
    let mut cursor = cell;
    for _ in 0..max_depth {
        cursor = cursor.step(forward);
        if grid.is_walkable(cursor) {
            if dug.is_empty() {
                return false;
            }
            for pos in dug {
                grid.carve(pos);
            }
            return true;
        }
        if !grid.is_interior(cursor) {
            return false;
        }
        dug.push(cursor);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::layout::carve_backtracker;
    use crate::types::Terrain;

    #[test]
    fn single_wall_dead_end_is_joined() {
        let mut grid = Grid::from_ascii(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.#.#.#",
            "#.#.#.#",
            "#...#.#",
            "#######",
        ]);
        let mut rng = GameRng::from_seed(1);
        let outcome = braid_dead_ends(&mut grid, &mut rng, 1.0, 1.0, 4);
        assert_eq!(outcome.dead_ends_before, 2);
        assert!(outcome.opened >= 1);
        assert!(dead_ends(&grid).is_empty());
    }

    #[test]
    fn tunnel_reaches_open_ground_within_depth() {
        let mut grid = Grid::from_ascii(&[
            "#########",
            "#.......#",
            "#########",
            "#########",
            "#.......#",
            "#########",
        ]);
        grid.set_terrain(Pos::new(4, 2), Terrain::Floor);
        let cell = Pos::new(4, 2);
        assert!(grid.is_dead_end(cell));
        assert!(tunnel_forward(&mut grid, cell, 3));
        assert!(grid.is_walkable(Pos::new(4, 3)));
        assert!(!grid.is_dead_end(cell));
    }

    #[test]
    fn tunnel_gives_up_past_depth() {
        let mut grid = Grid::from_ascii(&[
            "#######",
            "#.....#",
            "#######",
            "#######",
            "#######",
            "#######",
            "#.....#",
            "#######",
        ]);
        grid.set_terrain(Pos::new(3, 2), Terrain::Floor);
        let before = grid.clone();
        assert!(!tunnel_forward(&mut grid, Pos::new(3, 2), 2));
        assert_eq!(grid, before);
    }

    #[test]
    fn zero_ratio_leaves_grid_alone() {
        let mut grid = Grid::from_ascii(&["#######", "#.....#", "#######"]);
        let before = grid.clone();
        let mut rng = GameRng::from_seed(2);
        let outcome = braid_dead_ends(&mut grid, &mut rng, 0.0, 0.0, 6);
        assert_eq!(outcome.opened, 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn braided_mazes_remove_the_chosen_share_of_dead_ends() {
        for seed in 0..200 {
            let mut grid = Grid::new(21, 21);
            let mut rng = GameRng::from_seed(seed);
            carve_backtracker(&mut grid, &mut rng);
            let outcome = braid_dead_ends(&mut grid, &mut rng, 0.25, 0.45, 6);
            assert!((0.25..=0.45).contains(&outcome.ratio));
            assert_eq!(outcome.dead_ends_after, dead_ends(&grid).len());
            let required = (outcome.dead_ends_before as f64 * outcome.ratio).floor() as usize;
            assert!(
                outcome.dead_ends_after + required <= outcome.dead_ends_before,
                "seed {seed}: {outcome:?}"
            );
        }
    }
}
