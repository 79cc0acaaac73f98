// ABOUTME: Error types for template directive engine operations
// ABOUTME: Defines load, fetch and serialization failures for template rendering

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to load template: {name} from {directory}: {reason}")]
    LoadError {
        name: String,
        directory: String,
        reason: String,
    },

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Request for {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid template base '{0}'")]
    InvalidBase(String),

    #[error("Template serialization error: {0}")]
    SerializeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
