//! Contact combat between the player and enemies.

use super::*;

/// Attack plus a small roll, minus defense; every landed hit deals at least one.
pub(super) fn roll_damage(rng: &mut GameRng, attack: i32, defense: i32) -> i32 {
    (attack + rng.below(3) as i32 - defense).max(1)
}

impl Game {
    pub(super) fn player_attack_power(&self) -> i32 {
        let bonus = if self.state.player.weapon.is_some() { self.config.items.blade_bonus } else { 0 };
        self.state.player.attack + bonus
    }

    pub(super) fn player_defense_power(&self) -> i32 {
        let bonus = if self.state.player.shield.is_some() { self.config.items.buckler_bonus } else { 0 };
        self.state.player.defense + bonus
    }

    pub(super) fn player_attacks(&mut self, enemy_id: EntityId) {
        let Some(defense) = self.state.enemies.get(enemy_id).map(|enemy| enemy.defense) else {
            return;
        };
        if self.state.player.status.power > 0 {
            self.kill_enemy(enemy_id);
            return;
        }
        let attack = self.player_attack_power();
        let damage = roll_damage(&mut self.rng, attack, defense);
        let Some(enemy) = self.state.enemies.get_mut(enemy_id) else {
            return;
        };
        enemy.hp -= damage;
        if enemy.hp <= 0 {
            self.kill_enemy(enemy_id);
        } else {
            self.alert_enemy(enemy_id);
        }
    }

    pub(super) fn enemy_attacks(&mut self, enemy_id: EntityId) {
        let Some((attack, steals)) =
            self.state.enemies.get(enemy_id).map(|enemy| (enemy.attack, enemy.traits().steals))
        else {
            return;
        };
        let status = self.state.player.status;
        if status.power > 0 {
            self.kill_enemy(enemy_id);
            return;
        }
        if status.invincible > 0 {
            return;
        }
        let defense = self.player_defense_power();
        let damage = roll_damage(&mut self.rng, attack, defense);
        self.state.player.hp -= damage;
        self.log.push(LogEvent::PlayerDamaged { amount: damage, by: Some(enemy_id) });

        if steals && !self.state.player.inventory.is_empty() {
            let index = self.rng.below(self.state.player.inventory.len());
            let kind = self.state.player.inventory.remove(index);
            self.log.push(LogEvent::ItemStolen { kind, by: enemy_id });
        }
    }

    pub(super) fn kill_enemy(&mut self, enemy_id: EntityId) {
        if let Some(enemy) = self.state.enemies.remove(enemy_id) {
            self.log.push(LogEvent::EnemyKilled { enemy: enemy_id, kind: enemy.kind });
        }
    }
}
