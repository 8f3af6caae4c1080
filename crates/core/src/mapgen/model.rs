//! Public data models for generated floors, rooms, and spawn lists.

use crate::grid::Grid;
use crate::types::{EnemyKind, Faction, ItemKind, Pos, Terrain};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Room {
    pub id: u16,
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Room {
    pub fn right(&self) -> usize {
        self.x + self.w - 1
    }

    pub fn bottom(&self) -> usize {
        self.y + self.h - 1
    }

    pub fn center(&self) -> Pos {
        Pos { y: (self.y + self.h / 2) as i32, x: (self.x + self.w / 2) as i32 }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        if pos.x < 0 || pos.y < 0 {
            return false;
        }
        let px = pos.x as usize;
        let py = pos.y as usize;
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }

    /// True when the two rectangles, each grown by `margin`, share a tile.
    pub fn overlaps_with_margin(&self, other: &Room, margin: usize) -> bool {
        let left = self.x.saturating_sub(margin);
        let top = self.y.saturating_sub(margin);
        let right = self.right() + margin;
        let bottom = self.bottom() + margin;
        let other_left = other.x.saturating_sub(margin);
        let other_top = other.y.saturating_sub(margin);
        let other_right = other.right() + margin;
        let other_bottom = other.bottom() + margin;
        left <= other_right && right >= other_left && top <= other_bottom && bottom >= other_top
    }

    pub fn tiles(&self) -> impl Iterator<Item = Pos> + '_ {
        (self.y..=self.bottom()).flat_map(move |y| {
            (self.x..=self.right()).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub faction: Faction,
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub pos: Pos,
}

/// Tiles the spawners treat as preferred placement pools.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FloorMetadata {
    pub widened: Vec<Pos>,
    pub junctions: Vec<Pos>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationReport {
    pub restarts: u32,
    pub dead_ends_before_braid: usize,
    pub dead_ends_after_braid: usize,
    /// Share of dead ends the braid pass was asked to open.
    pub braid_ratio: f64,
    pub braided: usize,
    pub branch_carves: usize,
    pub alternate_carves: usize,
    pub widened_runs: usize,
    pub rocks: usize,
    pub traps: usize,
    pub junction_ratio: f64,
}

impl GenerationReport {
    /// Dead ends braiding had to remove for the ratio it drew.
    pub fn braid_quota(&self) -> usize {
        (self.dead_ends_before_braid as f64 * self.braid_ratio).floor() as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedFloor {
    pub depth: u32,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub start: Pos,
    pub goal: Pos,
    pub metadata: FloorMetadata,
    pub report: GenerationReport,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub item_spawns: Vec<ItemSpawn>,
}

impl GeneratedFloor {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        for tile in self.grid.tiles() {
            bytes.push(match tile.terrain {
                Terrain::Wall => 0,
                Terrain::Room => 1,
                Terrain::Floor => 2,
                Terrain::Water => 3,
                Terrain::Grass => 4,
                Terrain::Rock => 5,
                Terrain::Stairs => 6,
            });
            bytes.push(tile.trap.map_or(0, |trap| 1 + trap.kind as u8));
        }
        for room in &self.rooms {
            bytes.extend((room.x as u32).to_le_bytes());
            bytes.extend((room.y as u32).to_le_bytes());
            bytes.extend((room.w as u32).to_le_bytes());
            bytes.extend((room.h as u32).to_le_bytes());
        }
        bytes.extend(self.start.y.to_le_bytes());
        bytes.extend(self.start.x.to_le_bytes());
        bytes.extend(self.goal.y.to_le_bytes());
        bytes.extend(self.goal.x.to_le_bytes());

        bytes.extend((self.enemy_spawns.len() as u32).to_le_bytes());
        for spawn in &self.enemy_spawns {
            bytes.push(spawn.kind as u8);
            bytes.push(spawn.faction as u8);
            bytes.extend(spawn.pos.y.to_le_bytes());
            bytes.extend(spawn.pos.x.to_le_bytes());
        }

        bytes.extend((self.item_spawns.len() as u32).to_le_bytes());
        for spawn in &self.item_spawns {
            bytes.push(spawn.kind as u8);
            bytes.extend(spawn.pos.y.to_le_bytes());
            bytes.extend(spawn.pos.x.to_le_bytes());
        }

        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_overlap_requires_a_wall_gap() {
        let left = Room { id: 0, x: 1, y: 1, w: 3, h: 3 };
        let touching = Room { id: 1, x: 4, y: 1, w: 3, h: 3 };
        let one_gap = Room { id: 2, x: 5, y: 1, w: 3, h: 3 };
        let two_gap = Room { id: 3, x: 6, y: 1, w: 3, h: 3 };
        assert!(left.overlaps_with_margin(&touching, 1));
        assert!(left.overlaps_with_margin(&one_gap, 1));
        assert!(!left.overlaps_with_margin(&two_gap, 1));
        assert!(!left.overlaps_with_margin(&one_gap, 0));
    }

    #[test]
    fn room_tiles_cover_the_rectangle() {
        let room = Room { id: 0, x: 2, y: 3, w: 4, h: 3 };
        let tiles: Vec<Pos> = room.tiles().collect();
        assert_eq!(tiles.len(), 12);
        assert!(tiles.iter().all(|pos| room.contains(*pos)));
        assert_eq!(room.center(), Pos::new(4, 4));
    }
}
