//! Enemy awareness, targeting, and movement during the enemy phase of a turn.

use std::collections::{BTreeMap, BTreeSet};

use super::scheduler::{accrue, action_order, try_spend};
use super::*;
use crate::state::NoiseAlert;

/// Repath allowance shared by every enemy during one enemy phase.
#[derive(Debug)]
struct PathBudget {
    remaining: u8,
}

impl PathBudget {
    fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

impl Game {
    pub(super) fn run_enemy_phase(&mut self) {
        let mut budget = PathBudget { remaining: self.config.behavior.max_paths_per_turn };
        self.throttle_crowds();

        for id in action_order(&self.state.enemies) {
            self.update_awareness(id);
            let Some(gain) = self.state.enemies.get(id).map(|enemy| self.energy_gain(enemy)) else {
                continue;
            };
            let Some(enemy) = self.state.enemies.get_mut(id) else {
                continue;
            };
            if enemy.wait_turns > 0 {
                enemy.wait_turns -= 1;
                continue;
            }
            accrue(&mut enemy.energy, gain);
            while self.state.enemies.get_mut(id).is_some_and(|enemy| try_spend(&mut enemy.energy)) {
                self.enemy_act(id, &mut budget);
                if !self.state.player.is_alive() {
                    return;
                }
            }
        }

        self.state.noise = self
            .state
            .noise
            .map(|noise| NoiseAlert { turns_left: noise.turns_left.saturating_sub(1), ..noise })
            .filter(|noise| noise.turns_left > 0);
    }

    pub(super) fn alert_enemy(&mut self, id: EntityId) {
        let player_pos = self.state.player.pos;
        let Some(enemy) = self.state.enemies.get_mut(id) else {
            return;
        };
        enemy.grace_turns = 0;
        enemy.lost_turns = 0;
        enemy.returning_home = false;
        enemy.last_seen = Some(player_pos);
        if enemy.awareness == Awareness::Dormant {
            enemy.awareness = Awareness::Aware;
            self.log.push(LogEvent::EnemyAlerted { enemy: id });
        }
    }

    /// Smoke halves every enemy's sight radius.
    fn sees_player(&self, enemy: &Enemy) -> bool {
        let vision =
            if self.state.player.status.smoke > 0 { enemy.vision / 2 } else { enemy.vision };
        enemy.pos.distance_squared(self.state.player.pos) <= vision * vision
    }

    fn update_awareness(&mut self, id: EntityId) {
        let player_pos = self.state.player.pos;
        let grace_radius = self.config.behavior.grace_radius;
        let disengage_turns = self.config.behavior.disengage_turns;
        let Some(enemy) = self.state.enemies.get(id) else {
            return;
        };
        let sees = self.sees_player(enemy);

        if !enemy.is_aware() {
            if !sees {
                return;
            }
            if enemy.grace_turns > 0 && enemy.pos.manhattan(player_pos) > grace_radius {
                if let Some(enemy) = self.state.enemies.get_mut(id) {
                    enemy.grace_turns -= 1;
                }
                return;
            }
            self.alert_enemy(id);
            return;
        }

        // Wanderers keep the trail until the player is twice their sight away.
        let lost = if enemy.kind == EnemyKind::Wanderer {
            enemy.pos.distance_squared(player_pos) > (enemy.vision * 2).pow(2)
        } else {
            !sees
        };
        let relentless = enemy.traits().relentless;
        let Some(enemy) = self.state.enemies.get_mut(id) else {
            return;
        };
        if sees {
            enemy.last_seen = Some(player_pos);
        }
        if !lost {
            enemy.lost_turns = 0;
            return;
        }
        enemy.lost_turns += 1;
        if enemy.lost_turns >= disengage_turns && !relentless {
            self.disengage(id, false);
        }
    }

    fn disengage(&mut self, id: EntityId, return_home: bool) {
        let grace_turns = self.config.behavior.chase_grace_turns;
        let Some(enemy) = self.state.enemies.get_mut(id) else {
            return;
        };
        enemy.awareness = Awareness::Dormant;
        enemy.lost_turns = 0;
        enemy.grace_turns = grace_turns;
        enemy.last_seen = None;
        enemy.path.clear();
        enemy.path_target = None;
        enemy.returning_home = return_home;
        self.log.push(LogEvent::EnemyDisengaged { enemy: id });
    }

    fn energy_gain(&self, enemy: &Enemy) -> u32 {
        let behavior = &self.config.behavior;
        let mut gain = f64::from(enemy.speed);
        if enemy.pos.manhattan(self.state.player.pos) <= behavior.close_distance {
            gain *= behavior.close_speed_factor;
        }
        if let Some(noise) = self.state.noise
            && enemy.pos.manhattan(noise.origin) <= self.config.traps.noise_radius
        {
            gain *= 1.0 + self.config.traps.noise_pull_strength;
        }
        gain.round() as u32
    }

    /// Where an aware enemy heads; each kind reads the player's facing differently.
    fn chase_target(&self, enemy: &Enemy) -> Pos {
        let player = &self.state.player;
        let grid = &self.state.grid;
        let behavior = &self.config.behavior;
        match enemy.kind {
            EnemyKind::Sprinter => {
                if self.sees_player(enemy) {
                    player.pos
                } else {
                    enemy.last_seen.unwrap_or(player.pos)
                }
            }
            EnemyKind::Strategist => player
                .facing
                .map(|facing| {
                    let (dx, dy) = facing.delta();
                    player.pos.offset(dx * behavior.strategist_lead, dy * behavior.strategist_lead)
                })
                .filter(|lead| grid.is_walkable(*lead))
                .unwrap_or(player.pos),
            EnemyKind::Ambusher => {
                let mut target = player.pos;
                if let Some(facing) = player.facing {
                    for _ in 0..behavior.ambusher_lead {
                        let next = target.step(facing);
                        if !grid.is_walkable(next) {
                            break;
                        }
                        target = next;
                    }
                }
                target
            }
            EnemyKind::Wanderer | EnemyKind::Patroller => player.pos,
        }
    }

    /// `None` means the enemy has nowhere to be and drifts randomly.
    fn movement_goal(&mut self, id: EntityId) -> Option<Pos> {
        let noise_radius = self.config.traps.noise_radius;
        let enemy = self.state.enemies.get(id)?;
        if enemy.is_aware() {
            if let Some(noise) = self.state.noise
                && enemy.pos != noise.origin
                && enemy.pos.manhattan(noise.origin) <= noise_radius
            {
                return Some(noise.origin);
            }
            return Some(self.chase_target(enemy));
        }

        let enemy = self.state.enemies.get_mut(id)?;
        if enemy.returning_home {
            if enemy.pos != enemy.home {
                return Some(enemy.home);
            }
            enemy.returning_home = false;
        }
        if enemy.patrol.is_empty() {
            return None;
        }
        if enemy.patrol.get(enemy.patrol_index) == Some(&enemy.pos) {
            enemy.patrol_index = (enemy.patrol_index + 1) % enemy.patrol.len();
        }
        enemy.patrol.get(enemy.patrol_index).copied()
    }

    fn enemy_act(&mut self, id: EntityId, budget: &mut PathBudget) {
        let player_pos = self.state.player.pos;
        let Some(enemy) = self.state.enemies.get(id) else {
            return;
        };
        if enemy.is_aware() && enemy.pos.manhattan(player_pos) == 1 {
            self.enemy_attacks(id);
            return;
        }
        let Some(goal) = self.movement_goal(id) else {
            self.random_step(id);
            return;
        };
        self.ensure_path(id, goal, budget);

        let leash = self.config.behavior.leash_distance;
        let leashed = self.state.enemies.get(id).is_some_and(|enemy| {
            enemy.is_aware() && !enemy.traits().relentless && enemy.path.len() > leash
        });
        if leashed {
            self.disengage(id, true);
            return;
        }
        self.follow_path(id);
    }

    /// Keeps the current path unless it is empty, aimed elsewhere, or due for a refresh.
    fn ensure_path(&mut self, id: EntityId, goal: Pos, budget: &mut PathBudget) {
        let Some(enemy) = self.state.enemies.get(id) else {
            return;
        };
        let stale =
            enemy.path.is_empty() || enemy.path_target != Some(goal) || enemy.repath_cooldown == 0;
        if !stale {
            if let Some(enemy) = self.state.enemies.get_mut(id) {
                enemy.repath_cooldown -= 1;
            }
            return;
        }
        if !budget.take() {
            return;
        }

        let blocked: BTreeSet<Pos> = self
            .state
            .enemies
            .iter()
            .filter(|(other, _)| *other != id)
            .map(|(_, other)| other.pos)
            .collect();
        let rules = PathRules::avoiding(&blocked);
        let path = match enemy.kind {
            EnemyKind::Strategist | EnemyKind::Ambusher => {
                astar_path(&self.state.grid, enemy.pos, goal, rules)
            }
            _ => bfs_path(&self.state.grid, enemy.pos, goal, rules),
        };
        let behavior = &self.config.behavior;
        let cooldown = self
            .rng
            .range_inclusive(behavior.repath_min_turns as usize, behavior.repath_max_turns as usize)
            as u32;
        if let Some(enemy) = self.state.enemies.get_mut(id) {
            enemy.path = path.into();
            enemy.path_target = Some(goal);
            enemy.repath_cooldown = cooldown;
        }
    }

    fn follow_path(&mut self, id: EntityId) {
        let player_pos = self.state.player.pos;
        let Some(enemy) = self.state.enemies.get(id) else {
            return;
        };
        let Some(next) = enemy.path.front().copied() else {
            self.random_step(id);
            return;
        };
        if Direction::between(enemy.pos, next).is_none() {
            if let Some(enemy) = self.state.enemies.get_mut(id) {
                enemy.path.clear();
            }
            return;
        }
        if next == player_pos {
            self.enemy_attacks(id);
            return;
        }
        if self.state.is_occupied_by_enemy(next) {
            return;
        }
        if let Some(enemy) = self.state.enemies.get_mut(id) {
            enemy.path.pop_front();
            enemy.pos = next;
        }
    }

    /// One step to a free neighbor; wraiths may instead slip through a single interior wall.
    fn random_step(&mut self, id: EntityId) {
        let player_pos = self.state.player.pos;
        let Some(enemy) = self.state.enemies.get(id) else {
            return;
        };
        let pos = enemy.pos;
        let phase_chance = enemy.traits().phase_chance;
        let grid = &self.state.grid;
        let open = |target: Pos| {
            grid.is_walkable(target)
                && target != player_pos
                && !self.state.is_occupied_by_enemy(target)
        };

        let steps: Vec<Pos> =
            Direction::ALL.into_iter().map(|direction| pos.step(direction)).filter(|t| open(*t)).collect();
        let phases: Vec<Pos> = if phase_chance > 0.0 {
            Direction::ALL
                .into_iter()
                .filter_map(|direction| {
                    let wall = pos.step(direction);
                    (grid.is_interior(wall) && grid.terrain(wall) == Terrain::Wall)
                        .then(|| wall.step(direction))
                })
                .filter(|t| open(*t))
                .collect()
        } else {
            Vec::new()
        };

        let choice = if !phases.is_empty() && self.rng.chance(phase_chance) {
            self.rng.pick(&phases)
        } else {
            self.rng.pick(&steps)
        };
        if let Some(next) = choice
            && let Some(enemy) = self.state.enemies.get_mut(id)
        {
            enemy.pos = next;
            enemy.path.clear();
        }
    }

    /// Enemies past the per-zone limit sit out a few turns; those touching the player never do.
    fn throttle_crowds(&mut self) {
        let behavior = &self.config.behavior;
        let zone = behavior.density_zone.max(1);
        let limit = behavior.density_limit;
        let cooldown = behavior.density_cooldown_turns;
        let player_pos = self.state.player.pos;

        let mut counts: BTreeMap<(i32, i32), usize> = BTreeMap::new();
        let mut crowded = Vec::new();
        for id in action_order(&self.state.enemies) {
            let Some(enemy) = self.state.enemies.get(id) else {
                continue;
            };
            let count = counts
                .entry((enemy.pos.x.div_euclid(zone), enemy.pos.y.div_euclid(zone)))
                .or_insert(0);
            *count += 1;
            if *count > limit && enemy.wait_turns == 0 && enemy.pos.manhattan(player_pos) > 1 {
                crowded.push(id);
            }
        }
        for id in crowded {
            if let Some(enemy) = self.state.enemies.get_mut(id) {
                enemy.wait_turns = cooldown;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{add_enemy, corridor_game, game_on, open_room_game};
    use super::*;

    fn make_aware(game: &mut Game, id: EntityId) {
        let enemy = &mut game.state.enemies[id];
        enemy.awareness = Awareness::Aware;
        enemy.grace_turns = 0;
    }

    #[test]
    fn alerting_logs_only_on_the_first_transition() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Wanderer, Faction::Unaligned, Pos::new(9, 1));
        game.alert_enemy(id);
        game.alert_enemy(id);
        let alerts =
            game.log.iter().filter(|event| matches!(event, LogEvent::EnemyAlerted { .. })).count();
        assert_eq!(alerts, 1);
        assert!(game.state.enemies[id].is_aware());
    }

    #[test]
    fn grace_turns_delay_engagement_at_range() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(6, 1));
        game.update_awareness(id);
        game.update_awareness(id);
        assert!(!game.state.enemies[id].is_aware());
        game.update_awareness(id);
        assert!(game.state.enemies[id].is_aware());
        assert!(game.log.contains(&LogEvent::EnemyAlerted { enemy: id }));
    }

    #[test]
    fn adjacent_player_cuts_grace_short() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(3, 1));
        game.update_awareness(id);
        assert!(game.state.enemies[id].is_aware());
    }

    #[test]
    fn smoke_halves_sight() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(6, 1));
        assert!(game.sees_player(&game.state.enemies[id]));
        game.state.player.status.smoke = 3;
        assert!(!game.sees_player(&game.state.enemies[id]));
    }

    #[test]
    fn enemy_disengages_after_losing_the_player() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(11, 1));
        make_aware(&mut game, id);
        let turns = game.config.behavior.disengage_turns;
        for _ in 1..turns {
            game.update_awareness(id);
        }
        assert!(game.state.enemies[id].is_aware());
        game.update_awareness(id);
        let enemy = &game.state.enemies[id];
        assert_eq!(enemy.awareness, Awareness::Dormant);
        assert_eq!(enemy.grace_turns, game.config.behavior.chase_grace_turns);
        assert!(!enemy.returning_home);
        assert!(game.log.contains(&LogEvent::EnemyDisengaged { enemy: id }));
    }

    #[test]
    fn hunters_never_give_up() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Hunters, Pos::new(11, 1));
        make_aware(&mut game, id);
        for _ in 0..20 {
            game.update_awareness(id);
        }
        assert!(game.state.enemies[id].is_aware());
    }

    #[test]
    fn wanderers_hold_the_trail_within_twice_their_sight() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Wanderer, Faction::Unaligned, Pos::new(11, 1));
        make_aware(&mut game, id);
        for _ in 0..20 {
            game.update_awareness(id);
        }
        assert!(game.state.enemies[id].is_aware());
        assert_eq!(game.state.enemies[id].lost_turns, 0);
    }

    #[test]
    fn strategists_aim_ahead_of_the_player() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Strategist, Faction::Unaligned, Pos::new(9, 1));
        game.state.player.facing = Some(Direction::Right);
        assert_eq!(game.chase_target(&game.state.enemies[id]), Pos::new(4, 1));
        game.state.player.facing = Some(Direction::Left);
        assert_eq!(game.chase_target(&game.state.enemies[id]), Pos::new(2, 1));
    }

    #[test]
    fn ambushers_walk_the_facing_line_until_a_wall() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Ambusher, Faction::Unaligned, Pos::new(10, 1));
        game.state.player.facing = Some(Direction::Right);
        assert_eq!(game.chase_target(&game.state.enemies[id]), Pos::new(6, 1));
        game.state.player.facing = Some(Direction::Up);
        assert_eq!(game.chase_target(&game.state.enemies[id]), Pos::new(2, 1));
    }

    #[test]
    fn aware_enemy_closes_distance() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(6, 1));
        make_aware(&mut game, id);
        game.run_enemy_phase();
        let enemy = &game.state.enemies[id];
        assert_eq!(enemy.pos, Pos::new(5, 1));
        assert_eq!(enemy.path_target, Some(Pos::new(2, 1)));
        assert_eq!(enemy.energy, 30);
    }

    #[test]
    fn adjacent_aware_enemy_attacks() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(3, 1));
        make_aware(&mut game, id);
        game.run_enemy_phase();
        assert!(game.state.player.hp < game.state.player.max_hp);
        assert!(
            game.log
                .iter()
                .any(|event| matches!(event, LogEvent::PlayerDamaged { by: Some(by), .. } if *by == id))
        );
        assert_eq!(game.state.enemies[id].pos, Pos::new(3, 1));
    }

    #[test]
    fn dormant_patroller_walks_its_route() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Patroller, Faction::Unaligned, Pos::new(8, 1));
        assert_eq!(game.state.enemies[id].patrol, vec![Pos::new(11, 1), Pos::new(1, 1)]);
        game.run_enemy_phase();
        let enemy = &game.state.enemies[id];
        assert_eq!(enemy.pos, Pos::new(9, 1));
        assert_eq!(enemy.awareness, Awareness::Dormant);
    }

    #[test]
    fn long_chases_are_leashed_home() {
        let mut game = corridor_game();
        game.config.behavior.leash_distance = 3;
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(9, 1));
        make_aware(&mut game, id);
        game.state.enemies[id].last_seen = Some(Pos::new(2, 1));
        game.run_enemy_phase();
        let enemy = &game.state.enemies[id];
        assert_eq!(enemy.awareness, Awareness::Dormant);
        assert!(enemy.returning_home);
        assert_eq!(enemy.pos, Pos::new(9, 1));
        assert!(game.log.contains(&LogEvent::EnemyDisengaged { enemy: id }));
    }

    #[test]
    fn exhausted_path_budget_falls_back_to_a_random_step() {
        let mut game = corridor_game();
        game.config.behavior.max_paths_per_turn = 0;
        let id = add_enemy(&mut game, EnemyKind::Sprinter, Faction::Unaligned, Pos::new(6, 1));
        make_aware(&mut game, id);
        game.run_enemy_phase();
        let enemy = &game.state.enemies[id];
        assert!(enemy.path.is_empty());
        assert_eq!(enemy.pos.manhattan(Pos::new(6, 1)), 1);
    }

    #[test]
    fn noise_pulls_nearby_enemies_toward_its_origin() {
        let mut game = corridor_game();
        let id = add_enemy(&mut game, EnemyKind::Wanderer, Faction::Unaligned, Pos::new(9, 1));
        game.alert_enemy(id);
        let calm = game.energy_gain(&game.state.enemies[id]);
        game.state.noise = Some(NoiseAlert { origin: Pos::new(6, 1), turns_left: 2 });
        assert!(game.energy_gain(&game.state.enemies[id]) > calm);
        assert_eq!(game.movement_goal(id), Some(Pos::new(6, 1)));

        game.run_enemy_phase();
        game.run_enemy_phase();
        assert!(game.state.noise.is_none());
    }

    #[test]
    fn wraiths_slip_through_thin_walls() {
        let rows = ["#######", "#.#...#", "#######"];
        let mut game = game_on(&rows, Pos::new(5, 1), Pos::new(4, 1));
        let wraith = add_enemy(&mut game, EnemyKind::Wanderer, Faction::Wraiths, Pos::new(1, 1));
        for _ in 0..64 {
            game.random_step(wraith);
            if game.state.enemies[wraith].pos != Pos::new(1, 1) {
                break;
            }
        }
        assert_eq!(game.state.enemies[wraith].pos, Pos::new(3, 1));

        let mut game = game_on(&rows, Pos::new(5, 1), Pos::new(4, 1));
        let plain = add_enemy(&mut game, EnemyKind::Wanderer, Faction::Unaligned, Pos::new(1, 1));
        for _ in 0..64 {
            game.random_step(plain);
        }
        assert_eq!(game.state.enemies[plain].pos, Pos::new(1, 1));
    }

    #[test]
    fn crowded_zones_bench_the_overflow() {
        let mut game = open_room_game();
        let ids: Vec<EntityId> = [1, 2, 3]
            .into_iter()
            .map(|x| add_enemy(&mut game, EnemyKind::Wanderer, Faction::Unaligned, Pos::new(x, 1)))
            .collect();
        game.throttle_crowds();
        let waits: Vec<u32> = ids.iter().map(|id| game.state.enemies[*id].wait_turns).collect();
        assert_eq!(waits, vec![0, 0, game.config.behavior.density_cooldown_turns]);
    }
}
