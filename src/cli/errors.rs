//! CLI error types

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Config file already exists (pass --force to overwrite): {0}")]
    ConfigExists(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Server error: {0}")]
    Server(String),
}
