//! Error types for the record store.

use crate::sql_guard::SqlGuardError;
use thiserror::Error;

/// Database operation result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connection loss, bad SQL, read-only violation, ...)
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// IO error (file system operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed validation before reaching the database
    #[error("Validation error: {0}")]
    Validation(String),

    /// Constraint violation (referential integrity, restrict on delete)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Query refused by the read-only guard
    #[error("Query rejected: {0}")]
    Rejected(#[from] SqlGuardError),
}

impl DbError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a constraint error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Short error kind, stable across messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Storage(_) | Self::Io(_) => "StorageError",
            Self::NotFound(_) => "NotFound",
            Self::Validation(_) => "ValidationError",
            Self::Constraint(_) => "ConstraintViolation",
            Self::Rejected(guard) => guard.reason(),
        }
    }
}
