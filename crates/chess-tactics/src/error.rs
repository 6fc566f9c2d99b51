//! Tactics engine error types

use chess_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Fixture pool is empty: {0}")]
    EmptyFixturePool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
