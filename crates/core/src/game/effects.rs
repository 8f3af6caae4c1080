//! Tile-entry side effects and player upkeep: items, traps, hunger, and supplies.

use super::*;
use crate::state::NoiseAlert;

impl Game {
    /// Trap and status durations grow with depth.
    fn scaled_duration(&self, base: u32) -> u32 {
        let intensity = self.config.level.trap_intensity(self.state.depth);
        (f64::from(base) * intensity).round() as u32
    }

    pub(super) fn pick_up_item_at(&mut self, pos: Pos) {
        let Some(item_id) = self.state.grid.item(pos) else {
            return;
        };
        let Some(kind) = self.state.items.get(item_id).map(|item| item.kind) else {
            return;
        };
        if !self.take_item(kind) {
            return;
        }
        self.state.items.remove(item_id);
        if let Some(tile) = self.state.grid.tile_mut(pos) {
            tile.item = None;
        }
        self.log.push(LogEvent::ItemPickedUp { kind, pos });
    }

    /// Returns false when the player has no use or room for the item.
    fn take_item(&mut self, kind: ItemKind) -> bool {
        let items = &self.config.items;
        let player = &mut self.state.player;
        let has_room = player.inventory.len() < player.inventory_capacity;
        match kind {
            ItemKind::PowerUp => player.status.power = player.status.power.max(items.power_turns),
            ItemKind::Invincibility => {
                player.status.invincible = player.status.invincible.max(items.invincible_turns);
            }
            ItemKind::Smoke => player.status.smoke = player.status.smoke.max(items.smoke_turns),
            ItemKind::Blade if player.weapon.is_none() => player.weapon = Some(kind),
            ItemKind::Buckler if player.shield.is_none() => player.shield = Some(kind),
            ItemKind::Potion if !has_room && player.hp < player.max_hp => {
                player.hp = (player.hp + items.potion_heal).min(player.max_hp);
            }
            ItemKind::Ration if !has_room && player.hunger < player.max_hunger => {
                player.hunger = (player.hunger + items.ration_food).min(player.max_hunger);
            }
            ItemKind::Potion | ItemKind::Ration | ItemKind::Blade | ItemKind::Buckler => {
                if !has_room {
                    return false;
                }
                player.inventory.push(kind);
            }
        }
        true
    }

    pub(super) fn trigger_trap_at(&mut self, pos: Pos) {
        let Some(trap) = self.state.grid.trap(pos) else {
            return;
        };
        if !trap.armed || self.state.player.status.invincible > 0 {
            return;
        }
        if let Some(tile) = self.state.grid.tile_mut(pos) {
            tile.trap = Some(Trap { kind: trap.kind, armed: false });
        }
        self.log.push(LogEvent::TrapTriggered { kind: trap.kind, pos });

        let traps = self.config.traps.clone();
        match trap.kind {
            TrapKind::Slow => self.state.player.status.slow = self.scaled_duration(traps.slow_turns),
            TrapKind::Snare => {
                self.state.player.status.snare = self.scaled_duration(traps.snare_turns);
            }
            TrapKind::Reverse => {
                self.state.player.status.reverse = self.scaled_duration(traps.reverse_turns);
            }
            TrapKind::Fog => self.state.player.status.fog = self.scaled_duration(traps.fog_turns),
            TrapKind::Noise => {
                self.state.noise = Some(NoiseAlert { origin: pos, turns_left: traps.noise_turns });
                let ids: Vec<EntityId> = self.state.enemies.keys().collect();
                for id in ids {
                    self.alert_enemy(id);
                }
            }
        }
    }

    /// Drinks or eats from the pack when health or food runs low.
    pub(super) fn use_supplies(&mut self) {
        let items = &self.config.items;
        let player = &mut self.state.player;
        if player.hp * 3 <= player.max_hp
            && let Some(index) = player.inventory.iter().position(|kind| *kind == ItemKind::Potion)
        {
            player.inventory.remove(index);
            player.hp = (player.hp + items.potion_heal).min(player.max_hp);
        }
        if player.hunger * 4 <= player.max_hunger
            && let Some(index) = player.inventory.iter().position(|kind| *kind == ItemKind::Ration)
        {
            player.inventory.remove(index);
            player.hunger = (player.hunger + items.ration_food).min(player.max_hunger);
        }
    }

    pub(super) fn tick_hunger(&mut self) {
        let interval = self.config.player.starvation_interval.max(1);
        let player = &mut self.state.player;
        player.hunger = player.hunger.saturating_sub(1);
        if player.hunger > 0 {
            player.starving_turns = 0;
            return;
        }
        player.starving_turns += 1;
        if player.starving_turns.is_multiple_of(interval) {
            player.hp -= 1;
            self.log.push(LogEvent::Starving);
            self.log.push(LogEvent::PlayerDamaged { amount: 1, by: None });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{add_enemy, corridor_game, place_item, place_trap};
    use super::*;

    #[test]
    fn power_up_is_collected_and_logged() {
        let mut game = corridor_game();
        let pos = Pos::new(2, 1);
        place_item(&mut game, ItemKind::PowerUp, pos);
        game.pick_up_item_at(pos);
        assert_eq!(game.state.player.status.power, game.config.items.power_turns);
        assert!(game.state.grid.item(pos).is_none());
        assert!(game.state.items.is_empty());
        assert_eq!(game.log.last(), Some(&LogEvent::ItemPickedUp { kind: ItemKind::PowerUp, pos }));
    }

    #[test]
    fn gear_equips_first_then_fills_the_pack() {
        let mut game = corridor_game();
        let pos = Pos::new(2, 1);
        place_item(&mut game, ItemKind::Blade, pos);
        game.pick_up_item_at(pos);
        assert_eq!(game.state.player.weapon, Some(ItemKind::Blade));
        place_item(&mut game, ItemKind::Blade, pos);
        game.pick_up_item_at(pos);
        assert_eq!(game.state.player.inventory, vec![ItemKind::Blade]);
        assert_eq!(game.player_attack_power(), game.config.player.attack + game.config.items.blade_bonus);
    }

    #[test]
    fn full_pack_leaves_items_on_the_floor() {
        let mut game = corridor_game();
        game.state.player.inventory = vec![ItemKind::Ration; game.state.player.inventory_capacity];
        let pos = Pos::new(2, 1);
        let item = place_item(&mut game, ItemKind::Potion, pos);
        game.pick_up_item_at(pos);
        assert_eq!(game.state.grid.item(pos), Some(item));
    }

    #[test]
    fn traps_fire_once_and_scale_with_depth() {
        let mut game = corridor_game();
        let pos = Pos::new(2, 1);
        place_trap(&mut game, TrapKind::Snare, pos);
        game.trigger_trap_at(pos);
        assert_eq!(game.state.player.status.snare, game.config.traps.snare_turns);
        assert_eq!(game.state.grid.trap(pos).map(|trap| trap.armed), Some(false));

        game.state.player.status.snare = 0;
        game.trigger_trap_at(pos);
        assert_eq!(game.state.player.status.snare, 0);

        game.state.depth = 11;
        place_trap(&mut game, TrapKind::Reverse, Pos::new(3, 1));
        game.trigger_trap_at(Pos::new(3, 1));
        assert_eq!(game.state.player.status.reverse, 15);
    }

    #[test]
    fn invincible_player_walks_over_traps() {
        let mut game = corridor_game();
        let pos = Pos::new(2, 1);
        place_trap(&mut game, TrapKind::Slow, pos);
        game.state.player.status.invincible = 4;
        game.trigger_trap_at(pos);
        assert_eq!(game.state.player.status.slow, 0);
        assert_eq!(game.state.grid.trap(pos).map(|trap| trap.armed), Some(true));
    }

    #[test]
    fn noise_trap_alerts_every_enemy() {
        let mut game = corridor_game();
        let first = add_enemy(&mut game, EnemyKind::Wanderer, Faction::Unaligned, Pos::new(8, 1));
        let second = add_enemy(&mut game, EnemyKind::Patroller, Faction::Unaligned, Pos::new(9, 1));
        let pos = Pos::new(2, 1);
        place_trap(&mut game, TrapKind::Noise, pos);
        game.trigger_trap_at(pos);
        assert!(game.state.enemies[first].is_aware());
        assert!(game.state.enemies[second].is_aware());
        assert_eq!(game.state.noise.map(|noise| noise.origin), Some(pos));
    }

    #[test]
    fn starvation_costs_health_on_an_interval() {
        let mut game = corridor_game();
        game.state.player.hunger = 1;
        let interval = game.config.player.starvation_interval;
        for _ in 0..=interval {
            game.tick_hunger();
        }
        assert_eq!(game.state.player.hp, game.state.player.max_hp - 1);
        assert!(game.log.contains(&LogEvent::Starving));
    }

    #[test]
    fn low_health_drinks_a_stored_potion() {
        let mut game = corridor_game();
        game.state.player.inventory.push(ItemKind::Potion);
        game.state.player.hp = 3;
        game.use_supplies();
        assert_eq!(game.state.player.hp, 3 + game.config.items.potion_heal);
        assert!(game.state.player.inventory.is_empty());
    }
}
