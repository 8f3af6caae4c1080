//! High-level map generation orchestration: size normalization, restarts, and seeding.

mod pipeline;

use crate::config::{GameConfig, GeneratorConfig, LevelConfig};
use crate::error::GenerationError;
use crate::rng::{GameRng, derive_floor_seed};

use super::model::GeneratedFloor;
use pipeline::{AttemptInputs, attempt_floor};

pub const MIN_GRID_SIDE: usize = 7;

#[derive(Clone, Debug)]
pub struct MapGenerator {
    generator: GeneratorConfig,
    level: LevelConfig,
    smoke_chance: f64,
}

impl MapGenerator {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            generator: config.generator.clone(),
            level: config.level.clone(),
            smoke_chance: config.items.smoke_chance,
        }
    }

    /// Even sides grow by one so corridors land on odd coordinates.
    pub fn normalized_size(width: usize, height: usize) -> (usize, usize) {
        (width | 1, height | 1)
    }

    pub fn generate(
        &self,
        rng: &mut GameRng,
        width: usize,
        height: usize,
        depth: u32,
    ) -> Result<GeneratedFloor, GenerationError> {
        let (width, height) = Self::normalized_size(width, height);
        if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
            return Err(GenerationError::GridTooSmall { width, height });
        }

        let inputs = AttemptInputs {
            generator: &self.generator,
            level: &self.level,
            smoke_chance: self.smoke_chance,
            width,
            height,
            depth,
        };
        for restarts in 0..=self.generator.max_restarts {
            if let Some(mut floor) = attempt_floor(rng, &inputs) {
                floor.report.restarts = restarts;
                return Ok(floor);
            }
        }
        Err(GenerationError::RestartsExhausted { restarts: self.generator.max_restarts })
    }

    /// Floor for `depth` of a run: size from the level table, randomness from the floor seed.
    pub fn generate_for_depth(&self, run_seed: u64, depth: u32) -> Result<GeneratedFloor, GenerationError> {
        let (width, height) = self.level.grid_size(depth);
        let mut rng = GameRng::from_seed(derive_floor_seed(run_seed, depth));
        self.generate(&mut rng, width, height, depth)
    }
}
