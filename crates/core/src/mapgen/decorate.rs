//! Cosmetic terrain: water and grass anywhere open, rock only in fully open pockets.

use crate::grid::Grid;
use crate::rng::GameRng;
use crate::types::{Pos, Terrain};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(super) struct Decorations {
    pub(super) painted: usize,
    /// Rock placements with the terrain they replaced, so a failed validation can undo them.
    pub(super) rocks: Vec<(Pos, Terrain)>,
}

pub(super) fn decorate_terrain(
    grid: &mut Grid,
    rng: &mut GameRng,
    chance: f64,
    protected: &[Pos],
) -> Decorations {
    let mut decorations = Decorations::default();
    let candidates: Vec<Pos> = grid
        .walkable_positions()
        .filter(|pos| matches!(grid.terrain(*pos), Terrain::Floor | Terrain::Room))
        .filter(|pos| !protected.contains(pos))
        .collect();

    for pos in candidates {
        if !rng.chance(chance) {
            continue;
        }
        let roll = rng.below(10);
        let terrain = if roll < 4 {
            Terrain::Water
        } else if roll < 8 || !rock_fits(grid, pos, protected) {
            Terrain::Grass
        } else {
            Terrain::Rock
        };
        if terrain == Terrain::Rock {
            decorations.rocks.push((pos, grid.terrain(pos)));
        }
        grid.set_terrain(pos, terrain);
        decorations.painted += 1;
    }

    decorations
}

/// Rock may only sit where all eight surrounding tiles stay open.
fn rock_fits(grid: &Grid, pos: Pos, protected: &[Pos]) -> bool {
    for dy in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let around = pos.offset(dx, dy);
            if !grid.is_walkable(around) || protected.contains(&around) {
                return false;
            }
        }
    }
    true
}

pub(super) fn revert_rocks(grid: &mut Grid, rocks: &[(Pos, Terrain)]) {
    for (pos, terrain) in rocks.iter().rev() {
        grid.set_terrain(*pos, *terrain);
    }
}
