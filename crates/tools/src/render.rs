//! Plain-text rendering of floors and live runs for terminal output.

use meiro_core::{EnemyKind, Game, GeneratedFloor, Grid, Pos, Terrain};

pub fn terrain_glyph(terrain: Terrain) -> char {
    match terrain {
        Terrain::Wall => '#',
        Terrain::Room => 'r',
        Terrain::Floor => '.',
        Terrain::Water => '~',
        Terrain::Grass => '"',
        Terrain::Rock => '*',
        Terrain::Stairs => '>',
    }
}

pub fn enemy_glyph(kind: EnemyKind) -> char {
    match kind {
        EnemyKind::Sprinter => 'S',
        EnemyKind::Strategist => 'T',
        EnemyKind::Wanderer => 'W',
        EnemyKind::Patroller => 'P',
        EnemyKind::Ambusher => 'A',
    }
}

fn base_rows(grid: &Grid) -> Vec<Vec<char>> {
    (0..grid.height())
        .map(|y| {
            (0..grid.width())
                .map(|x| {
                    let pos = Pos::new(x as i32, y as i32);
                    if grid.trap(pos).is_some_and(|trap| trap.armed) {
                        '^'
                    } else if grid.item(pos).is_some() {
                        '!'
                    } else {
                        terrain_glyph(grid.terrain(pos))
                    }
                })
                .collect()
        })
        .collect()
}

fn put(rows: &mut [Vec<char>], pos: Pos, glyph: char) {
    if let Some(cell) = rows.get_mut(pos.y as usize).and_then(|row| row.get_mut(pos.x as usize)) {
        *cell = glyph;
    }
}

/// Full map with spawn lists overlaid: `<` start, `!` items, `^` traps, letters for enemies.
pub fn render_floor(floor: &GeneratedFloor) -> Vec<String> {
    let mut rows = base_rows(&floor.grid);
    for spawn in &floor.item_spawns {
        put(&mut rows, spawn.pos, '!');
    }
    for spawn in &floor.enemy_spawns {
        put(&mut rows, spawn.pos, enemy_glyph(spawn.kind));
    }
    put(&mut rows, floor.start, '<');
    rows.into_iter().map(String::from_iter).collect()
}

/// What the player knows: unseen tiles are blank and enemies show only while visible.
pub fn render_game(game: &Game) -> Vec<String> {
    let state = game.state();
    let mut rows = base_rows(&state.grid);
    for pos in state.grid.positions() {
        if !state.visibility.is_seen(pos) {
            put(&mut rows, pos, ' ');
        }
    }
    for enemy in state.enemies.values() {
        if state.visibility.is_visible(enemy.pos) {
            put(&mut rows, enemy.pos, enemy_glyph(enemy.kind));
        }
    }
    put(&mut rows, state.player.pos, '@');
    rows.into_iter().map(String::from_iter).collect()
}
