//! Scenario loading errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Scenario(#[from] rigger_core::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
