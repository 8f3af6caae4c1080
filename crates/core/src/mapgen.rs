//! Procedural dungeon generation split into coherent passes.
//! Each pass only carves walls into open ground; validation decides whether an attempt is kept.

pub mod metrics;
pub mod model;

mod alternate;
mod braid;
mod branching;
mod corridors;
mod decorate;
mod generator;
mod layout;
mod spawns;
mod widen;

pub use generator::{MIN_GRID_SIDE, MapGenerator};
pub use model::{EnemySpawn, FloorMetadata, GeneratedFloor, GenerationReport, ItemSpawn, Room};

use crate::config::GameConfig;
use crate::error::GenerationError;

pub fn generate_floor(
    run_seed: u64,
    depth: u32,
    config: &GameConfig,
) -> Result<GeneratedFloor, GenerationError> {
    MapGenerator::new(config).generate_for_depth(run_seed, depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_floor_matches_map_generator_output() {
        let config = GameConfig::default();
        let from_helper = generate_floor(123, 2, &config).expect("floor");
        let from_generator = MapGenerator::new(&config).generate_for_depth(123, 2).expect("floor");
        assert_eq!(from_helper, from_generator);
    }
}
