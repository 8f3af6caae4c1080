//! Runtime state of a run: the current floor, the player, enemies, and floor items.

use std::collections::VecDeque;

use slotmap::SlotMap;

use crate::config::{BehaviorConfig, PlayerConfig};
use crate::grid::Grid;
use crate::mapgen::{EnemySpawn, GenerationReport, Room};
use crate::types::*;
use crate::visibility::VisibilityGrid;

/// Remaining turns for each timed effect; zero means inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusEffects {
    pub slow: u32,
    pub snare: u32,
    pub reverse: u32,
    pub fog: u32,
    pub power: u32,
    pub invincible: u32,
    pub smoke: u32,
}

impl StatusEffects {
    pub fn tick(&mut self) {
        for remaining in [
            &mut self.slow,
            &mut self.snare,
            &mut self.reverse,
            &mut self.fog,
            &mut self.power,
            &mut self.invincible,
            &mut self.smoke,
        ] {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Pos,
    pub facing: Option<Direction>,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub hunger: u32,
    pub max_hunger: u32,
    pub starving_turns: u32,
    pub weapon: Option<ItemKind>,
    pub shield: Option<ItemKind>,
    pub inventory: Vec<ItemKind>,
    pub inventory_capacity: usize,
    pub status: StatusEffects,
}

impl Player {
    pub fn new(config: &PlayerConfig, pos: Pos) -> Self {
        Self {
            pos,
            facing: None,
            hp: config.max_hp,
            max_hp: config.max_hp,
            attack: config.attack,
            defense: config.defense,
            hunger: config.max_hunger,
            max_hunger: config.max_hunger,
            starving_turns: 0,
            weapon: None,
            shield: None,
            inventory: Vec::new(),
            inventory_capacity: config.inventory_capacity,
            status: StatusEffects::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// Static traits of an enemy kind before depth and faction scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    pub speed_factor: f64,
    pub vision: u32,
}

pub fn kind_profile(kind: EnemyKind) -> KindProfile {
    match kind {
        EnemyKind::Sprinter => KindProfile { speed_factor: 1.3, vision: 5 },
        EnemyKind::Strategist => KindProfile { speed_factor: 1.0, vision: 9 },
        EnemyKind::Wanderer => KindProfile { speed_factor: 0.9, vision: 6 },
        EnemyKind::Patroller => KindProfile { speed_factor: 1.05, vision: 7 },
        EnemyKind::Ambusher => KindProfile { speed_factor: 1.0, vision: 8 },
    }
}

/// Combat and movement modifiers granted by a faction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FactionTraits {
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    pub speed_multiplier: f64,
    pub steals: bool,
    pub phase_chance: f64,
    pub relentless: bool,
}

pub fn faction_traits(faction: Faction) -> FactionTraits {
    let base = FactionTraits {
        attack_bonus: 0,
        defense_bonus: 0,
        speed_multiplier: 1.0,
        steals: false,
        phase_chance: 0.0,
        relentless: false,
    };
    match faction {
        Faction::Unaligned => base,
        Faction::Brutes => FactionTraits { attack_bonus: 2, defense_bonus: 1, ..base },
        Faction::Thieves => FactionTraits { speed_multiplier: 1.15, steals: true, ..base },
        Faction::Wraiths => FactionTraits { phase_chance: 0.25, ..base },
        Faction::Hunters => FactionTraits { speed_multiplier: 1.1, relentless: true, ..base },
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub faction: Faction,
    pub spawn_order: u32,
    pub pos: Pos,
    pub home: Pos,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub vision: u32,
    /// Energy gained per turn; one action costs 100.
    pub speed: u32,
    pub energy: u32,
    pub awareness: Awareness,
    pub grace_turns: u32,
    pub lost_turns: u32,
    pub last_seen: Option<Pos>,
    pub path: VecDeque<Pos>,
    pub path_target: Option<Pos>,
    pub repath_cooldown: u32,
    pub patrol: Vec<Pos>,
    pub patrol_index: usize,
    pub wait_turns: u32,
    pub returning_home: bool,
}

impl Enemy {
    pub fn spawn(
        spawn: &EnemySpawn,
        spawn_order: u32,
        depth: u32,
        behavior: &BehaviorConfig,
        grid: &Grid,
    ) -> Self {
        let profile = kind_profile(spawn.kind);
        let traits = faction_traits(spawn.faction);
        let base_speed = behavior.base_speed + behavior.speed_step * depth.saturating_sub(1);
        let speed =
            (f64::from(base_speed) * profile.speed_factor * traits.speed_multiplier).round() as u32;
        let patrol = if spawn.kind == EnemyKind::Patroller {
            patrol_route(grid, spawn.pos)
        } else {
            Vec::new()
        };
        Self {
            id: EntityId::default(),
            kind: spawn.kind,
            faction: spawn.faction,
            spawn_order,
            pos: spawn.pos,
            home: spawn.pos,
            hp: 6 + depth as i32,
            attack: 2 + (depth / 2) as i32 + traits.attack_bonus,
            defense: (depth / 3) as i32 + traits.defense_bonus,
            vision: profile.vision,
            speed,
            energy: 0,
            awareness: Awareness::Dormant,
            grace_turns: behavior.chase_grace_turns,
            lost_turns: 0,
            last_seen: None,
            path: VecDeque::new(),
            path_target: None,
            repath_cooldown: 0,
            patrol,
            patrol_index: 0,
            wait_turns: 0,
            returning_home: false,
        }
    }

    pub fn traits(&self) -> FactionTraits {
        faction_traits(self.faction)
    }

    pub fn is_aware(&self) -> bool {
        self.awareness == Awareness::Aware
    }
}

/// Far ends of the straight lines running from `origin` in each direction.
pub fn patrol_route(grid: &Grid, origin: Pos) -> Vec<Pos> {
    let mut route = Vec::new();
    for direction in Direction::ALL {
        let mut end = origin;
        while grid.is_walkable(end.step(direction)) {
            end = end.step(direction);
        }
        if end != origin {
            route.push(end);
        }
    }
    route
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub pos: Pos,
}

/// A sounding noise trap: enemies nearby are drawn toward `origin` until it fades.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoiseAlert {
    pub origin: Pos,
    pub turns_left: u32,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub depth: u32,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub start: Pos,
    pub goal: Pos,
    pub player: Player,
    pub enemies: SlotMap<EntityId, Enemy>,
    pub items: SlotMap<ItemId, Item>,
    pub visibility: VisibilityGrid,
    pub noise: Option<NoiseAlert>,
    pub generation: GenerationReport,
}

impl GameState {
    pub fn enemy_at(&self, pos: Pos) -> Option<EntityId> {
        self.enemies.iter().find(|(_, enemy)| enemy.pos == pos).map(|(id, _)| id)
    }

    pub fn is_occupied_by_enemy(&self, pos: Pos) -> bool {
        self.enemy_at(pos).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patrol_route_reaches_each_corridor_end() {
        let grid = Grid::from_ascii(&[
            "#######",
            "###.###",
            "#.....#",
            "###.###",
            "###.###",
            "#######",
        ]);
        let route = patrol_route(&grid, Pos::new(3, 2));
        assert_eq!(route, vec![Pos::new(3, 1), Pos::new(5, 2), Pos::new(3, 4), Pos::new(1, 2)]);
    }

    #[test]
    fn spawn_applies_kind_faction_and_depth_scaling() {
        let grid = Grid::from_ascii(&["#####", "#...#", "#####"]);
        let behavior = BehaviorConfig::default();
        let spawn =
            EnemySpawn { kind: EnemyKind::Sprinter, faction: Faction::Brutes, pos: Pos::new(2, 1) };
        let enemy = Enemy::spawn(&spawn, 0, 3, &behavior, &grid);
        assert_eq!(enemy.speed, 140);
        assert_eq!(enemy.vision, 5);
        assert_eq!(enemy.attack, 2 + 1 + 2);
        assert_eq!(enemy.defense, 1 + 1);
        assert_eq!(enemy.awareness, Awareness::Dormant);
        assert_eq!(enemy.grace_turns, behavior.chase_grace_turns);
    }

    #[test]
    fn status_effects_count_down_to_zero() {
        let mut status = StatusEffects { slow: 2, snare: 1, ..StatusEffects::default() };
        status.tick();
        assert_eq!((status.slow, status.snare), (1, 0));
        status.tick();
        status.tick();
        assert_eq!(status, StatusEffects::default());
    }
}
