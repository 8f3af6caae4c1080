//! Base topology: rectangular rooms for the rooms layout, a recursive backtracker for the maze layout.

use crate::config::GeneratorConfig;
use crate::grid::Grid;
use crate::rng::GameRng;
use crate::types::{Direction, Pos, Terrain};

use super::model::Room;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct BaseLayout {
    pub(super) rooms: Vec<Room>,
    pub(super) start: Pos,
    pub(super) goal: Pos,
}

/// Places non-overlapping rooms and orders them so the start room is first and
/// the room farthest from it is last. Returns `None` when too few rooms fit.
pub(super) fn place_rooms(
    grid: &Grid,
    rng: &mut GameRng,
    config: &GeneratorConfig,
) -> Option<Vec<Room>> {
    let width = grid.width();
    let height = grid.height();
    let target = rng.range_inclusive(config.room_count.min, config.room_count.max.max(config.room_count.min));

    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..config.room_attempts {
        if rooms.len() >= target {
            break;
        }
        let size_max = config.room_size.max.max(config.room_size.min);
        let w = rng.range_inclusive(config.room_size.min, size_max);
        let h = rng.range_inclusive(config.room_size.min, size_max);
        if w == 0 || h == 0 || w + 2 >= width || h + 2 >= height {
            continue;
        }
        let x = rng.range_inclusive(1, width - w - 1);
        let y = rng.range_inclusive(1, height - h - 1);
        let candidate = Room { id: 0, x, y, w, h };
        if rooms.iter().any(|room| room.overlaps_with_margin(&candidate, 1)) {
            continue;
        }
        rooms.push(candidate);
    }

    if rooms.len() < config.room_count.min.max(2) {
        return None;
    }

    rooms.sort_by_key(|room| {
        let center = room.center();
        (center.y, center.x, room.h, room.w)
    });

    let start_center = rooms[0].center();
    let mut goal_index = 0;
    let mut best_distance = 0_u32;
    for (index, room) in rooms.iter().enumerate().skip(1) {
        let center = room.center();
        let distance = start_center.manhattan(center);
        let goal_center = rooms[goal_index].center();
        if distance > best_distance
            || (distance == best_distance && (center.y, center.x) > (goal_center.y, goal_center.x))
        {
            goal_index = index;
            best_distance = distance;
        }
    }
    let goal_room = rooms.remove(goal_index);
    rooms.push(goal_room);

    for (id, room) in rooms.iter_mut().enumerate() {
        room.id = id as u16;
    }
    Some(rooms)
}

pub(super) fn carve_room(grid: &mut Grid, room: &Room) {
    for pos in room.tiles() {
        if let Some(tile) = grid.tile_mut(pos) {
            tile.terrain = Terrain::Room;
            tile.room_id = Some(room.id);
        }
    }
}

/// Perfect maze over odd coordinates, grown from `(1, 1)`.
pub(super) fn carve_backtracker(grid: &mut Grid, rng: &mut GameRng) {
    let origin = Pos::new(1, 1);
    if !grid.is_interior(origin) {
        return;
    }
    grid.set_terrain(origin, Terrain::Floor);
    let mut stack = vec![origin];

    while let Some(&current) = stack.last() {
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                let (dx, dy) = direction.delta();
                let next = current.offset(dx * 2, dy * 2);
                grid.is_interior(next) && grid.terrain(next) == Terrain::Wall
            })
            .collect();

        let Some(direction) = rng.pick(&options) else {
            stack.pop();
            continue;
        };
        let (dx, dy) = direction.delta();
        let between = current.step(direction);
        let next = current.offset(dx * 2, dy * 2);
        grid.set_terrain(between, Terrain::Floor);
        grid.set_terrain(next, Terrain::Floor);
        stack.push(next);
    }
}

/// Stamps a few rooms over the maze, keeping them clear of start and goal.
pub(super) fn stamp_maze_rooms(
    grid: &mut Grid,
    rng: &mut GameRng,
    config: &GeneratorConfig,
    start: Pos,
    goal: Pos,
) -> Vec<Room> {
    let width = grid.width();
    let height = grid.height();
    let mut rooms: Vec<Room> = Vec::new();
    let size_max = config.room_size.max.max(config.room_size.min);

    for _ in 0..config.maze_rooms.saturating_mul(3) {
        if rooms.len() >= config.maze_rooms {
            break;
        }
        let w = rng.range_inclusive(config.room_size.min, size_max);
        let h = rng.range_inclusive(config.room_size.min, size_max);
        if w == 0 || h == 0 || w + 2 >= width || h + 2 >= height {
            continue;
        }
        let x = rng.range_inclusive(1, width - w - 1);
        let y = rng.range_inclusive(1, height - h - 1);
        let candidate = Room { id: rooms.len() as u16, x, y, w, h };
        let guard = Room {
            id: 0,
            x: x.saturating_sub(1),
            y: y.saturating_sub(1),
            w: w + 2,
            h: h + 2,
        };
        if guard.contains(start) || guard.contains(goal) {
            continue;
        }
        if rooms.iter().any(|room| room.overlaps_with_margin(&candidate, 1)) {
            continue;
        }
        carve_room(grid, &candidate);
        rooms.push(candidate);
    }
    rooms
}

pub(super) fn build_maze_layout(
    grid: &mut Grid,
    rng: &mut GameRng,
    config: &GeneratorConfig,
) -> BaseLayout {
    let start = Pos::new(1, 1);
    let goal = Pos::new(grid.width() as i32 - 2, grid.height() as i32 - 2);
    carve_backtracker(grid, rng);
    grid.set_terrain(goal, Terrain::Floor);
    let rooms = stamp_maze_rooms(grid, rng, config, start, goal);
    BaseLayout { rooms, start, goal }
}
