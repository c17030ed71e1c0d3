//! Error types for the msfs-udp-client CLI

use msfs_simvar_requester::{ConfigError, RequestError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request failed: {0}")]
    Request(#[from] RequestError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidConfiguration(_) | CliError::Config(_) => 2,
            CliError::Request(_) => 3,
            CliError::IoError(_) | CliError::JsonError(_) => 1,
        }
    }
}
