//! Breadth-first and A* routing over the walkable grid.
//! Both searches share the same passability rules so they agree on path length;
//! an empty path always means "no route right now".

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::grid::{Grid, neighbors};
use crate::types::Pos;

#[derive(Clone, Copy, Debug, Default)]
pub struct PathRules<'a> {
    /// Tiles held by other blocking entities; the goal itself is never blocked.
    pub blocked: Option<&'a BTreeSet<Pos>>,
    /// Lets the goal be reached even when its terrain is not walkable.
    pub goal_ignores_terrain: bool,
    /// One undirected step that must not be used.
    pub forbidden_edge: Option<(Pos, Pos)>,
}

impl<'a> PathRules<'a> {
    pub fn avoiding(blocked: &'a BTreeSet<Pos>) -> Self {
        Self { blocked: Some(blocked), ..Self::default() }
    }

    pub fn without_edge(a: Pos, b: Pos) -> Self {
        Self { forbidden_edge: Some((a, b)), ..Self::default() }
    }

    fn allows_step(&self, grid: &Grid, from: Pos, to: Pos, goal: Pos) -> bool {
        if let Some((a, b)) = self.forbidden_edge
            && ((from == a && to == b) || (from == b && to == a))
        {
            return false;
        }
        if to == goal {
            return grid.in_bounds(to) && (self.goal_ignores_terrain || grid.is_walkable(to));
        }
        if self.blocked.is_some_and(|blocked| blocked.contains(&to)) {
            return false;
        }
        grid.is_walkable(to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

/// Unweighted shortest path; the result excludes `start` and ends at `goal`.
pub fn bfs_path(grid: &Grid, start: Pos, goal: Pos, rules: PathRules<'_>) -> Vec<Pos> {
    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };
    if start == goal {
        return Vec::new();
    }

    let mut came_from: Vec<Option<usize>> = vec![None; grid.width() * grid.height()];
    let mut visited = vec![false; grid.width() * grid.height()];
    visited[start_index] = true;
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        let Some(current_index) = grid.index(current) else {
            continue;
        };
        for next in neighbors(current) {
            let Some(next_index) = grid.index(next) else {
                continue;
            };
            if visited[next_index] || !rules.allows_step(grid, current, next, goal) {
                continue;
            }
            visited[next_index] = true;
            came_from[next_index] = Some(current_index);
            queue.push_back(next);
        }
    }

    if !visited[goal_index] {
        return Vec::new();
    }
    let mut path = vec![goal];
    let mut cursor = goal_index;
    while let Some(previous) = came_from[cursor] {
        if previous == start_index {
            break;
        }
        path.push(grid.pos_of(previous));
        cursor = previous;
    }
    path.reverse();
    path
}

/// A* with a Manhattan heuristic and a deterministic `(f, h, y, x)` frontier order.
pub fn astar_path(grid: &Grid, start: Pos, goal: Pos, rules: PathRules<'_>) -> Vec<Pos> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) || start == goal {
        return Vec::new();
    }

    let mut open_set = BTreeSet::new();
    let mut open_entries: BTreeMap<Pos, OpenNode> = BTreeMap::new();
    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut g_score: BTreeMap<Pos, u32> = BTreeMap::new();

    let start_h = start.manhattan(goal);
    let start_node = OpenNode { f: start_h, h: start_h, y: start.y, x: start.x };
    open_set.insert(start_node);
    open_entries.insert(start, start_node);
    g_score.insert(start, 0);

    while let Some(current_node) = open_set.pop_first() {
        let current = Pos { y: current_node.y, x: current_node.x };
        open_entries.remove(&current);

        if current == goal {
            return reconstruct_path(&came_from, start, goal);
        }

        let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
        if current_g == u32::MAX {
            continue;
        }

        for neighbor in neighbors(current) {
            if !rules.allows_step(grid, current, neighbor, goal) {
                continue;
            }

            let tentative_g = current_g.saturating_add(1);
            let existing_g = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g >= existing_g {
                continue;
            }

            if let Some(existing_node) = open_entries.remove(&neighbor) {
                open_set.remove(&existing_node);
            }

            came_from.insert(neighbor, current);
            g_score.insert(neighbor, tentative_g);

            let h = neighbor.manhattan(goal);
            let node = OpenNode { f: tentative_g.saturating_add(h), h, y: neighbor.y, x: neighbor.x };
            open_set.insert(node);
            open_entries.insert(neighbor, node);
        }
    }

    Vec::new()
}

fn reconstruct_path(came_from: &BTreeMap<Pos, Pos>, start: Pos, goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        let Some(previous) = came_from.get(&current).copied() else {
            return Vec::new();
        };
        current = previous;
        path.push(current);
    }

    path.reverse();
    path.remove(0);
    path
}

/// Flood fill over walkable tiles; indexed like the grid.
pub fn reachable_mask(grid: &Grid, start: Pos) -> Vec<bool> {
    let mut seen = vec![false; grid.width() * grid.height()];
    let Some(start_index) = grid.index(start) else {
        return seen;
    };
    if !grid.is_walkable(start) {
        return seen;
    }
    seen[start_index] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in neighbors(current) {
            let Some(next_index) = grid.index(next) else {
                continue;
            };
            if !seen[next_index] && grid.is_walkable(next) {
                seen[next_index] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}
