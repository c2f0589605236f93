//! # AppError
//!
//! Centralized error handling for the Paperboard ecosystem.
//! Every denial a user can see is a variant here; none of them are panics.

use thiserror::Error;

/// A single form field failure, rendered next to the field it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Raised by storage plugins when a write hits a uniqueness constraint.
#[derive(Error, Debug)]
#[error("unique constraint on {field} violated")]
pub struct UniqueViolation {
    pub field: &'static str,
}

/// The primary error type for all pb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller must log in first; the HTTP layer redirects with `next`.
    #[error("authentication required")]
    LoginRequired,

    /// Resource not found, or hidden from the caller (e.g., someone else's comment)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Caller is known and the resource exists, but the action is refused
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Form input rejected; nothing was persisted
    #[error("validation error: {}", describe(.0))]
    Validation(Vec<FieldError>),

    /// Bad login credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down, template error)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        Self::NotFound(kind.to_string(), id.to_string())
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Maps a failed repository write. A uniqueness violation becomes a
    /// field error with `message`; anything else is internal.
    pub fn from_write(err: anyhow::Error, message: &str) -> Self {
        match err.downcast_ref::<UniqueViolation>() {
            Some(violation) => Self::invalid(violation.field, message),
            None => err.into(),
        }
    }

    /// Field errors carried by a validation failure, empty for other variants.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A specialized Result type for Paperboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
