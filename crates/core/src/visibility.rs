//! Fog of war: a flood fill from the viewer bounded by a circular radius.
//! Opaque tiles are revealed when reached but never expanded past.
//! It does not own radius policy; the turn loop decides which radius applies.

use std::collections::VecDeque;

use crate::grid::{Grid, neighbors};
use crate::types::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityGrid {
    width: usize,
    height: usize,
    visible: Vec<bool>,
    seen: Vec<bool>,
}

impl VisibilityGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            visible: vec![false; width * height],
            seen: vec![false; width * height],
        }
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let inside = pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height;
        inside.then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|index| self.visible[index])
    }

    /// Visible at any point since this floor was entered.
    pub fn is_seen(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|index| self.seen[index])
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|visible| **visible).count()
    }

    pub fn recompute(&mut self, grid: &Grid, origin: Pos, radius: u32) {
        if grid.width() != self.width || grid.height() != self.height {
            *self = Self::new(grid.width(), grid.height());
        }
        self.visible = visible_tiles(grid, origin, radius);
        for (seen, visible) in self.seen.iter_mut().zip(&self.visible) {
            *seen |= *visible;
        }
    }
}

/// Tiles visible from `origin`: reachable through walkable tiles with every
/// step inside the squared radius, plus the opaque tiles bordering that region.
pub fn visible_tiles(grid: &Grid, origin: Pos, radius: u32) -> Vec<bool> {
    let mut visible = vec![false; grid.width() * grid.height()];
    let Some(origin_index) = grid.index(origin) else {
        return visible;
    };
    let radius_squared = radius * radius;
    visible[origin_index] = true;
    if !grid.is_walkable(origin) {
        return visible;
    }

    let mut queue = VecDeque::from([origin]);
    while let Some(current) = queue.pop_front() {
        for next in neighbors(current) {
            let Some(index) = grid.index(next) else {
                continue;
            };
            if visible[index] || next.distance_squared(origin) > radius_squared {
                continue;
            }
            visible[index] = true;
            if grid.is_walkable(next) {
                queue.push_back(next);
            }
        }
    }
    visible
}
