//! Stable snapshot hashing for deterministic verification.
//! Only simulation state is hashed; the event log is left out.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.turn);
        hasher.write_u32(self.state.depth);
        hasher.write_u8(match self.outcome {
            None => 0,
            Some(RunOutcome::Victory) => 1,
            Some(RunOutcome::Defeat) => 2,
        });

        for tile in self.state.grid.tiles() {
            hasher.write_u8(tile.terrain as u8);
            match tile.trap {
                None => hasher.write_u8(0),
                Some(trap) => {
                    hasher.write_u8(1 + trap.kind as u8);
                    hasher.write_u8(u8::from(trap.armed));
                }
            }
            hasher.write_u8(u8::from(tile.item.is_some()));
        }

        let player = &self.state.player;
        hasher.write_i32(player.pos.x);
        hasher.write_i32(player.pos.y);
        hasher.write_i32(player.hp);
        hasher.write_u32(player.hunger);
        hasher.write_u8(player.facing.map_or(0, |facing| 1 + facing as u8));
        for kind in &player.inventory {
            hasher.write_u8(*kind as u8);
        }
        let status = player.status;
        for remaining in [
            status.slow,
            status.snare,
            status.reverse,
            status.fog,
            status.power,
            status.invincible,
            status.smoke,
        ] {
            hasher.write_u32(remaining);
        }

        let mut enemies: Vec<&Enemy> = self.state.enemies.values().collect();
        enemies.sort_by_key(|enemy| enemy.spawn_order);
        for enemy in enemies {
            hasher.write_u32(enemy.spawn_order);
            hasher.write_u8(enemy.kind as u8);
            hasher.write_i32(enemy.pos.x);
            hasher.write_i32(enemy.pos.y);
            hasher.write_i32(enemy.hp);
            hasher.write_u32(enemy.energy);
            hasher.write_u8(u8::from(enemy.is_aware()));
        }
        if let Some(noise) = self.state.noise {
            hasher.write_i32(noise.origin.x);
            hasher.write_i32(noise.origin.y);
            hasher.write_u32(noise.turns_left);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::corridor_game;
    use super::*;

    #[test]
    fn hash_tracks_simulation_changes() {
        let mut game = corridor_game();
        let before = game.snapshot_hash();
        assert_eq!(before, corridor_game().snapshot_hash());
        game.step(TurnInput::Move(Direction::Right)).expect("step");
        assert_ne!(game.snapshot_hash(), before);
    }
}
