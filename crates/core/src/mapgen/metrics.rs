//! Structural measurements and the invariant gate every finished floor must pass.

use std::fmt;

use crate::grid::Grid;
use crate::pathfinding::{PathRules, bfs_path, reachable_mask};
use crate::types::Pos;

pub fn dead_ends(grid: &Grid) -> Vec<Pos> {
    grid.walkable_positions().filter(|pos| grid.is_dead_end(*pos)).collect()
}

pub fn junctions(grid: &Grid) -> Vec<Pos> {
    grid.walkable_positions().filter(|pos| grid.is_junction(*pos)).collect()
}

/// Share of walkable tiles with three or more open neighbors.
pub fn junction_ratio(grid: &Grid) -> f64 {
    let walkable = grid.walkable_count();
    if walkable == 0 {
        return 0.0;
    }
    junctions(grid).len() as f64 / walkable as f64
}

pub fn is_fully_connected(grid: &Grid, start: Pos) -> bool {
    let mask = reachable_mask(grid, start);
    grid.positions()
        .zip(mask)
        .all(|(pos, reached)| reached || !grid.is_walkable(pos))
}

/// Shortest start-to-goal route including `start`; empty when unreachable.
pub fn route(grid: &Grid, start: Pos, goal: Pos) -> Vec<Pos> {
    if start == goal {
        return vec![start];
    }
    let tail = bfs_path(grid, start, goal, PathRules::default());
    if tail.is_empty() {
        return tail;
    }
    let mut path = Vec::with_capacity(tail.len() + 1);
    path.push(start);
    path.extend(tail);
    path
}

/// Steps of the shortest route whose removal disconnects start from goal.
pub fn bridges_on_route(grid: &Grid, start: Pos, goal: Pos) -> Vec<(Pos, Pos)> {
    let path = route(grid, start, goal);
    path.windows(2)
        .filter(|step| bfs_path(grid, start, goal, PathRules::without_edge(step[0], step[1])).is_empty())
        .map(|step| (step[0], step[1]))
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum InvariantViolation {
    GoalUnreachable,
    Disconnected,
    NoAlternateRoute { bridge: (Pos, Pos) },
    SparseJunctions { ratio: f64, required: f64 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoalUnreachable => write!(formatter, "goal unreachable from start"),
            Self::Disconnected => write!(formatter, "walkable region is split"),
            Self::NoAlternateRoute { bridge } => {
                write!(formatter, "every route crosses {:?} -> {:?}", bridge.0, bridge.1)
            }
            Self::SparseJunctions { ratio, required } => {
                write!(formatter, "junction ratio {ratio:.3} below {required:.3}")
            }
        }
    }
}

pub fn check_invariants(
    grid: &Grid,
    start: Pos,
    goal: Pos,
    min_junction_ratio: f64,
) -> Result<(), InvariantViolation> {
    if route(grid, start, goal).is_empty() {
        return Err(InvariantViolation::GoalUnreachable);
    }
    if !is_fully_connected(grid, start) {
        return Err(InvariantViolation::Disconnected);
    }
    if let Some(bridge) = bridges_on_route(grid, start, goal).first().copied() {
        return Err(InvariantViolation::NoAlternateRoute { bridge });
    }
    let ratio = junction_ratio(grid);
    if ratio < min_junction_ratio {
        return Err(InvariantViolation::SparseJunctions { ratio, required: min_junction_ratio });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_corridor_is_all_bridges() {
        let grid = Grid::from_ascii(&["#######", "#.....#", "#######"]);
        let bridges = bridges_on_route(&grid, Pos::new(1, 1), Pos::new(5, 1));
        assert_eq!(bridges.len(), 4);
        assert_eq!(
            check_invariants(&grid, Pos::new(1, 1), Pos::new(5, 1), 0.0),
            Err(InvariantViolation::NoAlternateRoute { bridge: (Pos::new(1, 1), Pos::new(2, 1)) })
        );
    }

    #[test]
    fn loop_has_no_bridges() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        assert!(bridges_on_route(&grid, Pos::new(1, 1), Pos::new(3, 3)).is_empty());
        assert_eq!(dead_ends(&grid), Vec::new());
        assert_eq!(junction_ratio(&grid), 0.0);
    }

    #[test]
    fn spur_off_a_loop_is_a_bridge_when_goal_sits_on_it() {
        let grid = Grid::from_ascii(&["#######", "#...#.#", "#.#...#", "#...###", "#######"]);
        let start = Pos::new(1, 1);
        let goal = Pos::new(5, 1);
        let bridges = bridges_on_route(&grid, start, goal);
        assert!(bridges.contains(&(Pos::new(5, 2), goal)));
    }

    #[test]
    fn isolated_pocket_breaks_connectivity() {
        let grid = Grid::from_ascii(&["#######", "#...#.#", "#.#.#.#", "#...#.#", "#######"]);
        assert!(!is_fully_connected(&grid, Pos::new(1, 1)));
        assert_eq!(
            check_invariants(&grid, Pos::new(1, 1), Pos::new(3, 3), 0.0),
            Err(InvariantViolation::Disconnected)
        );
    }

    #[test]
    fn sparse_junctions_are_rejected() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let result = check_invariants(&grid, Pos::new(1, 1), Pos::new(3, 3), 0.12);
        assert!(matches!(result, Err(InvariantViolation::SparseJunctions { .. })));
    }
}
