/// Domain error taxonomy
///
/// This module provides the unified error type returned by every fallible
/// operation in the crate. The facade passes these through unchanged; an
/// outer transport layer owns the mapping to status codes.
///
/// # Taxonomy
///
/// - `Validation`: malformed, missing, or conflicting input, with field-level detail
/// - `Authentication`: bad credential, expired or invalid token
/// - `NotFound`: entity absent *or* not owned by the principal (deliberately merged)
/// - `Conflict`: optimistic-version clash on a concurrent update
/// - `Timeout`: bounded operation exceeded its deadline, nothing was mutated
/// - `Internal`: infrastructure failure (e.g. password hashing backend)
///
/// # Example
///
/// ```
/// use taskdeck::error::Error;
///
/// let err = Error::validation("title", "is required");
/// assert!(matches!(err, Error::Validation(_)));
/// ```

use serde::{Deserialize, Serialize};

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Field-level validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    /// Creates a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Unified domain error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input failed validation; carries one entry per failing field
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Credential or token could not be verified
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Entity does not exist or does not belong to the principal
    ///
    /// The two cases are indistinguishable on purpose: a caller must not be
    /// able to probe for the existence of another user's entities.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Concurrent update lost an optimistic-version race
    #[error("version conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Version the caller supplied
        expected: i64,

        /// Version currently stored
        actual: i64,
    },

    /// Operation exceeded its caller-supplied deadline
    #[error("operation timed out")]
    Timeout,

    /// Infrastructure failure outside the caller's control
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Builds a single-field validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation(vec![FieldError::new(field, message)])
    }

    /// True if this is a validation error touching the given field
    pub fn touches_field(&self, field: &str) -> bool {
        match self {
            Error::Validation(errors) => errors.iter().any(|e| e.field == field),
            _ => false,
        }
    }
}
