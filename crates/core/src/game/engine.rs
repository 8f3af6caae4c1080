//! One player turn: input resolution, tile effects, upkeep, the enemy phase, and run end.

use super::*;

impl Game {
    /// Advances the run by exactly one player turn.
    pub fn step(&mut self, input: TurnInput) -> Result<TurnReport, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::RunFinished);
        }
        let next_floor = self.prepare_next_floor(input)?;
        self.turn += 1;

        let player_acted = self.player_turn(input);
        let floor_changed = if player_acted && self.state.player.pos == self.state.goal {
            self.descend(next_floor)
        } else {
            false
        };

        if self.outcome.is_none() && !floor_changed {
            self.state.player.status.tick();
            self.tick_hunger();
            self.use_supplies();
            self.refresh_visibility();
            if self.state.player.is_alive() {
                self.run_enemy_phase();
            }
        }
        if self.outcome.is_none() && !self.state.player.is_alive() {
            self.finish(RunOutcome::Defeat);
        }

        Ok(TurnReport { turn: self.turn, player_acted, floor_changed, outcome: self.outcome })
    }

    /// Returns whether the player moved or attacked.
    fn player_turn(&mut self, input: TurnInput) -> bool {
        let TurnInput::Move(direction) = input else {
            return false;
        };
        let status = self.state.player.status;
        if status.snare > 0 || (status.slow > 0 && self.turn.is_multiple_of(2)) {
            return false;
        }
        let direction = if status.reverse > 0 { direction.opposite() } else { direction };
        let target = self.state.player.pos.step(direction);
        self.state.player.facing = Some(direction);

        if let Some(enemy) = self.state.enemy_at(target) {
            self.player_attacks(enemy);
            return true;
        }
        if !self.state.grid.is_walkable(target) {
            return false;
        }
        self.state.player.pos = target;
        self.pick_up_item_at(target);
        self.trigger_trap_at(target);
        true
    }

    /// Builds the next floor before anything moves whenever the stairs are one step away,
    /// so a generation failure leaves the turn unapplied.
    fn prepare_next_floor(&self, input: TurnInput) -> Result<Option<GeneratedFloor>, GameError> {
        let depth = self.state.depth;
        let near_stairs = Direction::between(self.state.player.pos, self.state.goal).is_some();
        if !matches!(input, TurnInput::Move(_)) || !near_stairs || depth >= self.config.level.max_depth {
            return Ok(None);
        }
        Ok(Some(self.generator.generate_for_depth(self.seed, depth + 1)?))
    }

    /// Stairs either end the run or swap in the prepared floor.
    fn descend(&mut self, next_floor: Option<GeneratedFloor>) -> bool {
        if self.state.depth >= self.config.level.max_depth {
            self.finish(RunOutcome::Victory);
            return false;
        }
        let Some(floor) = next_floor else {
            return false;
        };
        let depth = floor.depth;
        self.install_floor(floor);
        self.log.push(LogEvent::FloorChanged { depth });
        true
    }

    fn finish(&mut self, outcome: RunOutcome) {
        self.outcome = Some(outcome);
        self.log.push(LogEvent::GameOver { outcome });
    }
}
