//! Cross-cutting error types for Keel.
//!
//! Domain errors that any layer can raise live here. Storage-specific errors
//! (`DatabaseError`) are defined in `keel-db`, and the CLI converges all of
//! them into `anyhow`.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors that can be raised by any Keel crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A decision ID failed lexical validation.
    #[error("Invalid decision ID: '{input}'. Expected format: DEC-xxxx (4 hex chars)")]
    InvalidIdentifier { input: String },

    /// A well-formed ID has no matching decision.
    #[error("Decision {id} not found")]
    NotFound { id: String },

    /// The decision was already superseded and cannot be superseded again.
    #[error("Decision {id} is already superseded by {}", superseded_by.as_deref().unwrap_or("an unknown decision"))]
    AlreadySuperseded {
        id: String,
        superseded_by: Option<String>,
    },

    /// Input failed required-field or enum constraints.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
