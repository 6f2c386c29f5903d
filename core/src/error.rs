use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board must have at least one row and one column")]
    EmptyBoard,
    #[error("Board needs at least one mine")]
    NoMines,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures at the agent boundary, mostly model persistence.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Model serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported model version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Model was trained on a {trained:?} board, current board is {current:?}")]
    BoardMismatch { trained: Coord2, current: Coord2 },
    #[error("Agent setting {name} must be within {min}..={max}, got {value}")]
    InvalidSetting {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

pub type AgentResult<T> = core::result::Result<T, AgentError>;

/// Anything that can stop a training run.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Agent(#[from] AgentError),
}
