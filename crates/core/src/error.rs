//! Error types for the core library

use thiserror::Error;

use crate::validation::FieldError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl Error {
    /// Shorthand for a validation failure on a single field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}
