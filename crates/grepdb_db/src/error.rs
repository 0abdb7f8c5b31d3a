//! Error types for the database layer.

use thiserror::Error;

/// Database operation result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error (connection, query, etc.)
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database file or other resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Model not declared in the schema
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Field not declared on a model
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Schema metadata is inconsistent
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

impl DbError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }
}
