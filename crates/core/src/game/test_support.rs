//! Shared fixtures for the `game` submodule test suites.
//! Floors here are hand-drawn so tests control every tile; no generator randomness is involved.

use super::*;
use crate::mapgen::{EnemySpawn, FloorMetadata, GenerationReport};

fn floor_from_ascii(rows: &[&str], start: Pos, goal: Pos) -> GeneratedFloor {
    let mut grid = Grid::from_ascii(rows);
    grid.set_terrain(goal, Terrain::Stairs);
    GeneratedFloor {
        depth: 1,
        grid,
        rooms: Vec::new(),
        start,
        goal,
        metadata: FloorMetadata::default(),
        report: GenerationReport::default(),
        enemy_spawns: Vec::new(),
        item_spawns: Vec::new(),
    }
}

pub(super) fn game_on(rows: &[&str], start: Pos, goal: Pos) -> Game {
    let config = GameConfig::default();
    let generator = MapGenerator::new(&config);
    Game::from_floor(7, config, generator, floor_from_ascii(rows, start, goal))
}

/// One east-west lane: player at (2, 1), stairs at (11, 1).
pub(super) fn corridor_game() -> Game {
    game_on(&["#############", "#...........#", "#############"], Pos::new(2, 1), Pos::new(11, 1))
}

/// A 9x9 open room with the player in the middle and stairs in a corner.
pub(super) fn open_room_game() -> Game {
    game_on(
        &[
            "###########",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "#rrrrrrrrr#",
            "###########",
        ],
        Pos::new(5, 5),
        Pos::new(9, 9),
    )
}

pub(super) fn add_enemy(game: &mut Game, kind: EnemyKind, faction: Faction, pos: Pos) -> EntityId {
    let spawn = EnemySpawn { kind, faction, pos };
    let order = game.state.enemies.len() as u32;
    let enemy =
        Enemy::spawn(&spawn, order, game.state.depth, &game.config.behavior, &game.state.grid);
    let id = game.state.enemies.insert(enemy);
    game.state.enemies[id].id = id;
    id
}

pub(super) fn place_item(game: &mut Game, kind: ItemKind, pos: Pos) -> ItemId {
    let id = game.state.items.insert(Item { id: ItemId::default(), kind, pos });
    game.state.items[id].id = id;
    if let Some(tile) = game.state.grid.tile_mut(pos) {
        tile.item = Some(id);
    }
    id
}

pub(super) fn place_trap(game: &mut Game, kind: TrapKind, pos: Pos) {
    if let Some(tile) = game.state.grid.tile_mut(pos) {
        tile.trap = Some(Trap { kind, armed: true });
    }
}
