// ABOUTME: Error types for the persistence adapter
// ABOUTME: Covers filesystem failures and blob serialization errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage IO error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key '{0}': keys may only contain alphanumerics, '-', '_' and '.'")]
    InvalidKey(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
