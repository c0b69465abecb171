use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] sitesync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Collection name cannot be empty")]
    EmptyCollection,
    #[error("Profile name cannot be empty")]
    EmptyProfile,
    #[error("Configuration error: {0}")]
    Config(String),
}
