use slotmap::SlotMap;

use crate::config::GameConfig;
use crate::error::{GameError, GenerationError};
use crate::grid::{Grid, Trap};
use crate::mapgen::{GeneratedFloor, MapGenerator};
use crate::pathfinding::{PathRules, astar_path, bfs_path};
use crate::rng::{GameRng, derive_play_seed};
use crate::state::{Enemy, GameState, Item, Player};
use crate::types::*;
use crate::visibility::VisibilityGrid;

mod behavior;
mod combat;
mod effects;
mod engine;
mod hash;
mod scheduler;
mod travel;

#[cfg(test)]
mod test_support;

pub use scheduler::ACTION_COST;

pub struct Game {
    seed: u64,
    turn: u64,
    rng: GameRng,
    config: GameConfig,
    generator: MapGenerator,
    state: GameState,
    log: Vec<LogEvent>,
    outcome: Option<RunOutcome>,
}

impl Game {
    pub fn new(seed: u64, config: GameConfig) -> Result<Self, GenerationError> {
        let generator = MapGenerator::new(&config);
        let floor = generator.generate_for_depth(seed, 1)?;
        Ok(Self::from_floor(seed, config, generator, floor))
    }

    fn from_floor(
        seed: u64,
        config: GameConfig,
        generator: MapGenerator,
        floor: GeneratedFloor,
    ) -> Self {
        let player = Player::new(&config.player, floor.start);
        let state = GameState {
            depth: floor.depth,
            grid: Grid::new(floor.width(), floor.height()),
            rooms: Vec::new(),
            start: floor.start,
            goal: floor.goal,
            player,
            enemies: SlotMap::with_key(),
            items: SlotMap::with_key(),
            visibility: VisibilityGrid::new(floor.width(), floor.height()),
            noise: None,
            generation: floor.report.clone(),
        };
        let mut game = Self {
            seed,
            turn: 0,
            rng: GameRng::from_seed(derive_play_seed(seed)),
            config,
            generator,
            state,
            log: Vec::new(),
            outcome: None,
        };
        game.install_floor(floor);
        game
    }

    /// Replaces the current floor; the player keeps everything but position.
    fn install_floor(&mut self, floor: GeneratedFloor) {
        let GeneratedFloor {
            depth, grid, rooms, start, goal, report, enemy_spawns, item_spawns, ..
        } = floor;

        self.state.depth = depth;
        self.state.visibility = VisibilityGrid::new(grid.width(), grid.height());
        self.state.grid = grid;
        self.state.rooms = rooms;
        self.state.start = start;
        self.state.goal = goal;
        self.state.generation = report;
        self.state.noise = None;
        self.state.player.pos = start;
        self.state.player.facing = None;

        self.state.enemies.clear();
        for (order, spawn) in enemy_spawns.iter().enumerate() {
            let enemy =
                Enemy::spawn(spawn, order as u32, depth, &self.config.behavior, &self.state.grid);
            let id = self.state.enemies.insert(enemy);
            self.state.enemies[id].id = id;
        }

        self.state.items.clear();
        for spawn in item_spawns {
            let id = self.state.items.insert(Item { id: ItemId::default(), kind: spawn.kind, pos: spawn.pos });
            self.state.items[id].id = id;
            if let Some(tile) = self.state.grid.tile_mut(spawn.pos) {
                tile.item = Some(id);
            }
        }

        self.refresh_visibility();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn depth(&self) -> u32 {
        self.state.depth
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Events in the order they happened since the run began.
    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn view_radius(&self) -> u32 {
        if self.state.player.status.fog > 0 {
            self.config.traps.fog_radius(self.state.depth).min(self.config.player.view_radius)
        } else {
            self.config.player.view_radius
        }
    }

    fn refresh_visibility(&mut self) {
        let radius = self.view_radius();
        self.state.visibility.recompute(&self.state.grid, self.state.player.pos, radius);
    }
}
