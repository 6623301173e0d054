//! Error types for shopmigrate.

use thiserror::Error;

/// Errors produced while migrating.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unusable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The source store could not be reached.
    #[error("Source connection error: {0}")]
    SourceConnection(String),

    /// The destination store could not be reached.
    #[error("Destination connection error: {0}")]
    DestinationConnection(String),

    /// Records could not be read out of the source store.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A source document could not be converted into a destination record.
    #[error("Transform error: {0}")]
    Transform(String),

    /// The destination store rejected a record.
    #[error("Load error: {0}")]
    Load(String),

    /// A store rejected our credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The source API asked us to back off.
    #[error("Rate limited, retry after {0}s")]
    RateLimit(u64),

    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
