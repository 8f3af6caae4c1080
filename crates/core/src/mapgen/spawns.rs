//! Enemy, item, and trap placement rules for generated floors.

use crate::config::LevelConfig;
use crate::grid::{Grid, Trap};
use crate::rng::GameRng;
use crate::types::{EnemyKind, Faction, ItemKind, Pos, TrapKind};

use super::model::{EnemySpawn, FloorMetadata, ItemSpawn, Room};

const FIRST_ITEM_MIN_STEPS: u32 = 3;
const FIRST_ITEM_MAX_STEPS: u32 = 8;
const BONUS_ITEM_KINDS: [ItemKind; 6] = [
    ItemKind::PowerUp,
    ItemKind::Invincibility,
    ItemKind::Potion,
    ItemKind::Ration,
    ItemKind::Blade,
    ItemKind::Buckler,
];
const FLOOR_FACTIONS: [Faction; 4] =
    [Faction::Brutes, Faction::Thieves, Faction::Wraiths, Faction::Hunters];

pub(super) struct SpawnContext<'a> {
    pub(super) depth: u32,
    pub(super) level: &'a LevelConfig,
    pub(super) smoke_chance: f64,
    pub(super) start: Pos,
    pub(super) goal: Pos,
    pub(super) rooms: &'a [Room],
    pub(super) metadata: &'a FloorMetadata,
}

/// Interior open tiles other than start and goal, in scan order.
fn open_tiles(grid: &Grid, context: &SpawnContext<'_>) -> Vec<Pos> {
    grid.walkable_positions()
        .filter(|pos| grid.is_interior(*pos) && *pos != context.start && *pos != context.goal)
        .collect()
}

pub(super) fn generate_item_spawns(
    grid: &Grid,
    rng: &mut GameRng,
    context: &SpawnContext<'_>,
) -> Vec<ItemSpawn> {
    let mut candidates = open_tiles(grid, context);
    rng.shuffle(&mut candidates);
    let total = context.level.item_count(context.depth).min(candidates.len());

    let mut kinds = Vec::with_capacity(total);
    for index in 0..total {
        let kind = match index {
            0 => ItemKind::PowerUp,
            1 => ItemKind::Invincibility,
            _ if rng.chance(context.smoke_chance) => ItemKind::Smoke,
            _ => rng.pick(&BONUS_ITEM_KINDS).unwrap_or(ItemKind::PowerUp),
        };
        kinds.push(kind);
    }

    // The first item sits a short walk from the start when such a tile exists.
    if let Some(near) = candidates.iter().position(|pos| {
        (FIRST_ITEM_MIN_STEPS..=FIRST_ITEM_MAX_STEPS).contains(&pos.manhattan(context.start))
    }) {
        candidates.swap(0, near);
    }

    kinds
        .into_iter()
        .zip(candidates)
        .map(|(kind, pos)| ItemSpawn { kind, pos })
        .collect()
}

fn trap_pool(depth: u32) -> Vec<TrapKind> {
    let table = [
        (TrapKind::Slow, 1_u32, 3_u32),
        (TrapKind::Snare, 1, 2),
        (TrapKind::Reverse, 2, 2),
        (TrapKind::Fog, 3, 2),
        (TrapKind::Noise, 5, 1),
    ];
    let mut pool = Vec::new();
    for (kind, min_depth, weight) in table {
        if depth < min_depth {
            continue;
        }
        let bonus = (depth - min_depth) / 3;
        for _ in 0..(weight + bonus) {
            pool.push(kind);
        }
    }
    pool
}

/// Arms traps directly on the grid; returns how many were placed.
pub(super) fn place_traps(
    grid: &mut Grid,
    rng: &mut GameRng,
    context: &SpawnContext<'_>,
    items: &[ItemSpawn],
) -> usize {
    let pool = trap_pool(context.depth);
    let mut candidates: Vec<Pos> = open_tiles(grid, context)
        .into_iter()
        .filter(|pos| (pos.x + pos.y) % 3 != 0)
        .filter(|pos| !items.iter().any(|item| item.pos == *pos))
        .collect();
    rng.shuffle(&mut candidates);

    let count = context.level.trap_count(context.depth).min(candidates.len());
    let mut placed = 0;
    for pos in candidates.into_iter().take(count) {
        let Some(kind) = rng.pick(&pool) else {
            break;
        };
        if let Some(tile) = grid.tile_mut(pos) {
            tile.trap = Some(Trap { kind, armed: true });
            placed += 1;
        }
    }
    placed
}

fn enemy_pool(depth: u32) -> Vec<EnemyKind> {
    let mut pool = vec![EnemyKind::Sprinter, EnemyKind::Wanderer];
    if depth >= 2 {
        pool.push(EnemyKind::Strategist);
    }
    if depth >= 3 {
        pool.push(EnemyKind::Sprinter);
    }
    if depth >= 4 {
        pool.push(EnemyKind::Patroller);
    }
    if depth >= 5 {
        pool.push(EnemyKind::Ambusher);
    }
    if depth >= 6 {
        pool.extend([EnemyKind::Strategist, EnemyKind::Sprinter]);
    }
    if depth >= 8 {
        pool.extend([EnemyKind::Patroller, EnemyKind::Wanderer, EnemyKind::Ambusher]);
    }
    pool
}

struct SpawnPools {
    rooms: Vec<Pos>,
    widened: Vec<Pos>,
    junctions: Vec<Pos>,
    general: Vec<Pos>,
}

pub(super) fn generate_enemy_spawns(
    grid: &Grid,
    rng: &mut GameRng,
    context: &SpawnContext<'_>,
) -> Vec<EnemySpawn> {
    let count = context.level.enemy_count(context.depth);
    let mut pools = SpawnPools {
        rooms: context.rooms.iter().flat_map(Room::tiles).collect(),
        widened: context.metadata.widened.clone(),
        junctions: context.metadata.junctions.clone(),
        general: open_tiles(grid, context),
    };
    rng.shuffle(&mut pools.rooms);
    rng.shuffle(&mut pools.widened);
    rng.shuffle(&mut pools.junctions);
    rng.shuffle(&mut pools.general);

    let clearance = context.level.enemy_spawn_clearance;
    let clearance_squared = clearance * clearance;
    let mut taken: Vec<Pos> = Vec::with_capacity(count);
    let accept = |candidate: Pos, taken: &[Pos]| {
        grid.is_walkable(candidate)
            && grid.is_interior(candidate)
            && candidate != context.goal
            && candidate.distance_squared(context.start) >= clearance_squared
            && !grid.is_straight_corridor(candidate)
            && !taken.contains(&candidate)
    };

    let mut positions = Vec::with_capacity(count);
    for pool in [&mut pools.rooms, &mut pools.widened] {
        if positions.len() >= count {
            break;
        }
        if let Some(pos) = take_first(pool, &taken, &accept) {
            taken.push(pos);
            positions.push(pos);
        }
    }
    for pool in [&mut pools.junctions, &mut pools.general] {
        while positions.len() < count {
            let Some(pos) = take_first(pool, &taken, &accept) else {
                break;
            };
            taken.push(pos);
            positions.push(pos);
        }
    }

    let kinds = enemy_pool(context.depth);
    let floor_faction = (context.depth >= context.level.faction_min_depth)
        .then(|| rng.pick(&FLOOR_FACTIONS))
        .flatten();

    positions
        .into_iter()
        .map(|pos| {
            let kind = rng.pick(&kinds).unwrap_or(EnemyKind::Sprinter);
            let faction = match floor_faction {
                Some(faction) if rng.chance(context.level.faction_chance) => faction,
                _ => Faction::Unaligned,
            };
            EnemySpawn { kind, faction, pos }
        })
        .collect()
}

fn take_first(
    pool: &mut Vec<Pos>,
    taken: &[Pos],
    accept: &impl Fn(Pos, &[Pos]) -> bool,
) -> Option<Pos> {
    while let Some(candidate) = pool.pop() {
        if accept(candidate, taken) {
            return Some(candidate);
        }
    }
    None
}
