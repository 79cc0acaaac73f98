// ABOUTME: Error types for step model loading and validation
// ABOUTME: Defines parse failures and structural validation errors for step definitions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StepError {
    #[error("Failed to read step definitions: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid user path '{0}'. Expected 'new' or 'existing'")]
    InvalidPath(String),

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Empty step model: no steps defined")]
    EmptyModel,

    #[error("Duplicate step id: {step}")]
    DuplicateStep { step: String },

    #[error("Step '{step}' has an empty '{field}'")]
    EmptyField { step: String, field: String },

    #[error("First step '{step}' must always be visible")]
    FirstStepHidden { step: String },

    #[error("Last step '{step}' must always be visible")]
    LastStepHidden { step: String },

    #[error("Last step '{step}' must always allow proceeding")]
    LastStepGated { step: String },
}

pub type Result<T> = std::result::Result<T, StepError>;
