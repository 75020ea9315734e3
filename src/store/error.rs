//! Error types for the store contract

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// Table does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Table already exists
    #[error("Table already exists: {0}")]
    TableExists(String),

    /// No server-side iterator is registered for the class
    #[error("Unknown iterator class '{class_name}' for iterator '{name}'")]
    UnknownIterator { name: String, class_name: String },

    /// An iterator option could not be applied
    #[error("Invalid option '{key}' for iterator '{name}': {reason}")]
    InvalidIteratorOption {
        name: String,
        key: String,
        reason: String,
    },

    /// A lock guarding store state is poisoned
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StoreError {
    /// Create an invalid iterator option error
    pub fn invalid_option(
        name: impl Into<String>,
        key: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidIteratorOption {
            name: name.into(),
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a lock error
    pub fn lock<E: std::fmt::Display>(err: E) -> Self {
        Self::Lock(err.to_string())
    }
}
