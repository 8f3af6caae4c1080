//! Tile grid shared by the generator, pathfinding, visibility, and the turn loop.

use crate::types::{Direction, ItemId, Pos, Terrain, TrapKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Trap {
    pub kind: TrapKind,
    pub armed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    pub terrain: Terrain,
    pub trap: Option<Trap>,
    pub item: Option<ItemId>,
    pub room_id: Option<u16>,
}

impl Tile {
    pub const WALL: Tile = Tile { terrain: Terrain::Wall, trap: None, item: None, room_id: None };

    pub fn is_walkable(&self) -> bool {
        self.terrain.is_walkable()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, tiles: vec![Tile::WALL; width * height] }
    }

    /// Parses `#` walls, `.` floor, `r` room, `~` water, `"` grass, `*` rock, `>` stairs.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                let terrain = match glyph {
                    '.' => Terrain::Floor,
                    'r' => Terrain::Room,
                    '~' => Terrain::Water,
                    '"' => Terrain::Grass,
                    '*' => Terrain::Rock,
                    '>' => Terrain::Stairs,
                    _ => Terrain::Wall,
                };
                grid.set_terrain(Pos::new(x as i32, y as i32), terrain);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Inside the outer ring of wall; carving never touches the ring.
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && (pos.x as usize) < self.width.saturating_sub(1)
            && (pos.y as usize) < self.height.saturating_sub(1)
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        self.index(pos).map(|index| &self.tiles[index])
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        self.index(pos).map(|index| &mut self.tiles[index])
    }

    pub fn terrain(&self, pos: Pos) -> Terrain {
        self.tile(pos).map_or(Terrain::Wall, |tile| tile.terrain)
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile(pos).is_some_and(Tile::is_walkable)
    }

    pub fn set_terrain(&mut self, pos: Pos, terrain: Terrain) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.terrain = terrain;
        }
    }

    /// Opens a wall tile as corridor floor; room tiles and other open terrain are left alone.
    pub fn carve(&mut self, pos: Pos) -> bool {
        if !self.is_interior(pos) {
            return false;
        }
        match self.tile_mut(pos) {
            Some(tile) if !tile.is_walkable() => {
                tile.terrain = Terrain::Floor;
                true
            }
            _ => false,
        }
    }

    pub fn room_id(&self, pos: Pos) -> Option<u16> {
        self.tile(pos).and_then(|tile| tile.room_id)
    }

    pub fn trap(&self, pos: Pos) -> Option<Trap> {
        self.tile(pos).and_then(|tile| tile.trap)
    }

    pub fn item(&self, pos: Pos) -> Option<ItemId> {
        self.tile(pos).and_then(|tile| tile.item)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.tiles.len()).map(|index| self.pos_of(index))
    }

    pub fn walkable_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(|pos| self.is_walkable(*pos))
    }

    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_walkable()).count()
    }

    pub fn open_neighbor_count(&self, pos: Pos) -> usize {
        neighbors(pos).into_iter().filter(|next| self.is_walkable(*next)).count()
    }

    pub fn open_directions(&self, pos: Pos) -> Vec<Direction> {
        Direction::ALL.into_iter().filter(|direction| self.is_walkable(pos.step(*direction))).collect()
    }

    /// Exactly two open neighbors, on opposite sides.
    pub fn is_straight_corridor(&self, pos: Pos) -> bool {
        let open = self.open_directions(pos);
        open.len() == 2 && open[0].opposite() == open[1]
    }

    pub fn is_dead_end(&self, pos: Pos) -> bool {
        self.is_walkable(pos) && self.open_neighbor_count(pos) == 1
    }

    pub fn is_junction(&self, pos: Pos) -> bool {
        self.is_walkable(pos) && self.open_neighbor_count(pos) >= 3
    }
}

pub fn neighbors(pos: Pos) -> [Pos; 4] {
    [
        Pos { y: pos.y - 1, x: pos.x },
        Pos { y: pos.y, x: pos.x + 1 },
        Pos { y: pos.y + 1, x: pos.x },
        Pos { y: pos.y, x: pos.x - 1 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_reads_are_walls() {
        let grid = Grid::from_ascii(&["...", "...", "..."]);
        assert!(grid.is_walkable(Pos::new(1, 1)));
        assert!(!grid.is_walkable(Pos::new(-1, 1)));
        assert!(!grid.is_walkable(Pos::new(3, 0)));
        assert_eq!(grid.terrain(Pos::new(9, 9)), Terrain::Wall);
        assert!(grid.tile(Pos::new(0, -4)).is_none());
    }

    #[test]
    fn walkability_excludes_wall_and_rock_only() {
        for terrain in [Terrain::Room, Terrain::Floor, Terrain::Water, Terrain::Grass, Terrain::Stairs] {
            assert!(terrain.is_walkable(), "{terrain:?}");
        }
        assert!(!Terrain::Wall.is_walkable());
        assert!(!Terrain::Rock.is_walkable());
    }

    #[test]
    fn carve_refuses_the_outer_ring_and_open_tiles() {
        let mut grid = Grid::from_ascii(&["#####", "#r#.#", "#####"]);
        assert!(!grid.carve(Pos::new(0, 1)));
        assert!(!grid.carve(Pos::new(1, 1)));
        assert!(grid.carve(Pos::new(2, 1)));
        assert_eq!(grid.terrain(Pos::new(2, 1)), Terrain::Floor);
        assert_eq!(grid.terrain(Pos::new(1, 1)), Terrain::Room);
    }

    #[test]
    fn corridor_shape_classification() {
        let grid = Grid::from_ascii(&[
            "#######",
            "#.....#",
            "###.###",
            "###.###",
            "#######",
        ]);
        assert!(grid.is_dead_end(Pos::new(1, 1)));
        assert!(grid.is_straight_corridor(Pos::new(2, 1)));
        assert!(grid.is_junction(Pos::new(3, 1)));
        assert!(grid.is_straight_corridor(Pos::new(3, 2)));
        assert!(grid.is_dead_end(Pos::new(3, 3)));
        assert!(!grid.is_straight_corridor(Pos::new(1, 1)));
    }
}
