//! # Runtime Error Types

use ledge_core::EcsError;
use thiserror::Error;

/// Errors raised by the platformer runtime.
#[derive(Error, Debug)]
pub enum GameError {
    /// Registry contract violation.
    #[error("ecs error: {0}")]
    Ecs(#[from] EcsError),

    /// Config file could not be read.
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::config::GameConfig`].
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A config value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The tile grid is malformed.
    #[error("invalid level: {0}")]
    InvalidLevel(String),
}

/// Result type for runtime operations.
pub type GameResult<T> = Result<T, GameError>;
