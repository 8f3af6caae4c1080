//! Error types for the few operations that can fail outright.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("grid {width}x{height} is too small to hold a dungeon")]
    GridTooSmall { width: usize, height: usize },

    #[error("dungeon generation gave up after {restarts} restarts")]
    RestartsExhausted { restarts: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field}: minimum is greater than maximum")]
    InvertedRange { field: &'static str },

    #[error("{field} must be a probability between 0 and 1")]
    NotAProbability { field: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("the run has already finished")]
    RunFinished,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
