//! Room connection: a minimum spanning tree over room centers plus a few extra links.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::grid::Grid;
use crate::rng::GameRng;
use crate::types::Pos;

use super::model::Room;

/// Union-find with path compression and union by rank; `find` is iterative.
#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub(super) fn new(len: usize) -> Self {
        Self { parent: (0..len).collect(), rank: vec![0; len] }
    }

    pub(super) fn find(&mut self, item: usize) -> usize {
        let mut root = item;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cursor = item;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    /// Returns false when both items already share a set.
    pub(super) fn union(&mut self, left: usize, right: usize) -> bool {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return false;
        }
        match self.rank[left_root].cmp(&self.rank[right_root]) {
            Ordering::Less => self.parent[left_root] = right_root,
            Ordering::Greater => self.parent[right_root] = left_root,
            Ordering::Equal => {
                self.parent[right_root] = left_root;
                self.rank[left_root] = self.rank[left_root].saturating_add(1);
            }
        }
        true
    }
}

/// Carves an L-shaped corridor; only wall tiles change, rooms stay rooms.
pub(super) fn carve_l_corridor(grid: &mut Grid, from: Pos, to: Pos, horizontal_first: bool) {
    let corner = if horizontal_first { Pos::new(to.x, from.y) } else { Pos::new(from.x, to.y) };
    carve_straight(grid, from, corner);
    carve_straight(grid, corner, to);
}

fn carve_straight(grid: &mut Grid, from: Pos, to: Pos) {
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let mut cursor = from;
    grid.carve(cursor);
    while cursor != to {
        cursor = cursor.offset(dx, dy);
        grid.carve(cursor);
    }
}

/// Kruskal over all center pairs, then `extra_corridors` non-tree links.
/// Returns the connected room index pairs.
pub(super) fn connect_rooms(
    grid: &mut Grid,
    rng: &mut GameRng,
    rooms: &[Room],
    extra_corridors: usize,
) -> Vec<(usize, usize)> {
    if rooms.len() < 2 {
        return Vec::new();
    }

    let mut edges = Vec::new();
    for left in 0..rooms.len() {
        for right in (left + 1)..rooms.len() {
            let distance = rooms[left].center().manhattan(rooms[right].center());
            edges.push((distance, left, right));
        }
    }
    edges.sort_unstable();

    let mut sets = DisjointSet::new(rooms.len());
    let mut linked = BTreeSet::new();
    for (_, left, right) in edges {
        if sets.union(left, right) {
            let horizontal_first = rng.chance(0.5);
            carve_l_corridor(grid, rooms[left].center(), rooms[right].center(), horizontal_first);
            linked.insert((left, right));
        }
    }

    let pair_count = rooms.len() * (rooms.len() - 1) / 2;
    for _ in 0..extra_corridors {
        if linked.len() >= pair_count {
            break;
        }
        for _ in 0..10 {
            let first = rng.below(rooms.len());
            let second = rng.below(rooms.len());
            let pair = (first.min(second), first.max(second));
            if first == second || linked.contains(&pair) {
                continue;
            }
            let horizontal_first = rng.chance(0.5);
            carve_l_corridor(grid, rooms[pair.0].center(), rooms[pair.1].center(), horizontal_first);
            linked.insert(pair);
            break;
        }
    }

    linked.into_iter().collect()
}
