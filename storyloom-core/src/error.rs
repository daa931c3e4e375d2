//! Error types for STORYLOOM operations

use thiserror::Error;

/// Validation errors. Always surfaced to the caller, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Malformed epic document: {reason}")]
    MalformedEpic { reason: String },

    #[error("Unknown story referenced by {field}: {story_id}")]
    UnknownStory { field: String, story_id: String },
}

impl ValidationError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Arithmetic errors from the RICE scorer.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DivisionError {
    #[error("Effort must be greater than zero, got {effort}")]
    NonPositiveEffort { effort: f64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Duplicate persona id in registry: {id}")]
    DuplicatePersona { id: String },
}

/// Master error type for all STORYLOOM errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoryloomError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Division error: {0}")]
    Division(#[from] DivisionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },
}

/// Result type alias for STORYLOOM operations.
pub type StoryloomResult<T> = Result<T, StoryloomError>;

// =============================================================================
// TESTS
// =============================================================================
