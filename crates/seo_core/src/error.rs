use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// Failures of the local key-value medium.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("quota exceeded writing `{key}` ({needed} bytes needed, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("value under `{key}` is corrupted: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by the analysis service, classified for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("API quota exceeded, try again later")]
    QuotaExceeded,

    #[error("invalid API credentials")]
    InvalidCredentials,

    #[error("analysis failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
