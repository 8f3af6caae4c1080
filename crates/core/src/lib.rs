pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod mapgen;
pub mod pathfinding;
pub mod rng;
pub mod state;
pub mod types;
pub mod visibility;

pub use config::{
    BehaviorConfig, GameConfig, GeneratorConfig, ItemConfig, LayoutKind, LevelConfig,
    PlayerConfig, SizeRange, TrapConfig,
};
pub use error::{ConfigError, GameError, GenerationError};
pub use game::{ACTION_COST, Game};
pub use grid::{Grid, Tile, Trap};
pub use mapgen::{GeneratedFloor, GenerationReport, MapGenerator, Room, generate_floor};
pub use rng::GameRng;
pub use state::{Enemy, GameState, Item, Player};
pub use types::*;
pub use visibility::VisibilityGrid;
