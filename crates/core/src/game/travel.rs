//! Auto-travel: the next step of an A* route toward a chosen tile.

use std::collections::BTreeSet;

use super::*;

impl Game {
    /// Prefers routes around armed traps, then accepts any route that avoids enemies.
    /// `None` when already there or nothing reaches the target.
    pub fn auto_travel_step(&self, target: Pos) -> Option<Direction> {
        let start = self.state.player.pos;
        if start == target {
            return None;
        }
        let enemies: BTreeSet<Pos> = self.state.enemies.values().map(|enemy| enemy.pos).collect();
        let mut hazards = enemies.clone();
        hazards.extend(
            self.state
                .grid
                .positions()
                .filter(|pos| self.state.grid.trap(*pos).is_some_and(|trap| trap.armed)),
        );

        [&hazards, &enemies]
            .into_iter()
            .map(|blocked| astar_path(&self.state.grid, start, target, PathRules::avoiding(blocked)))
            .find_map(|path| path.first().copied())
            .and_then(|next| Direction::between(start, next))
    }
}
