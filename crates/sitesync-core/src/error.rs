//! Error types for sitesync-core

use thiserror::Error;

/// Result type alias using sitesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sitesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The `manual` strategy was requested; a person has to pick a side
    #[error("Conflict on {collection}/{id} requires user intervention")]
    ManualResolutionRequired {
        /// Collection the conflicting record belongs to
        collection: String,
        /// Identity of the conflicting record
        id: String,
    },

    /// Strategy tag outside the known set
    #[error("Unknown resolution strategy: {0}")]
    UnknownStrategy(String),

    /// Snapshot payload is not a list or keyed map of records
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
