use std::fmt::Display;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

use crate::store::StoreError;

/// The unified error type for configuring and reading a tablet input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("[E{code:04}] Invalid argument: {message}")]
    InvalidArgument {
        code: u16,
        message: String,
        field: Option<String>,
    },

    #[error("[E{code:04}] Malformed configuration value for '{key}': {message}")]
    MalformedConfigValue {
        code: u16,
        key: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Missing configuration: '{key}' is not set")]
    MissingConfig { code: u16, key: String },

    #[error("[E{code:04}] Store error: {message}")]
    Store {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl InputError {
    /// Create an invalid argument error with default code
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            code: ErrorCode::VALIDATION_GENERIC,
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid argument error with specific code and field
    pub fn invalid_argument_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::InvalidArgument {
            code,
            message: message.into(),
            field,
        }
    }

    /// Create a malformed value error for a configuration key
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::malformed_with_code(ErrorCode::CONFIG_INVALID_VALUE, key, message)
    }

    /// Create a malformed value error with specific code
    pub fn malformed_with_code(
        code: u16,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedConfigValue {
            code,
            key: key.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a missing configuration error
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingConfig {
            code: ErrorCode::CONFIG_MISSING_REQUIRED,
            key: key.into(),
        }
    }

    /// Create a store error with specific code
    pub fn store_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Store {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::MalformedConfigValue { source: src, .. } | Self::Store { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::InvalidArgument { .. } | Self::MissingConfig { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::InvalidArgument { message, .. }
            | Self::MalformedConfigValue { message, .. }
            | Self::Store { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
            Self::MissingConfig { .. } => {}
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedConfigValue { .. } | Self::MissingConfig { .. } => 2,
            Self::Store { .. } => 4,
            Self::InvalidArgument { .. } => 8,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidArgument { code, .. }
            | Self::MalformedConfigValue { code, .. }
            | Self::MissingConfig { code, .. }
            | Self::Store { code, .. } => *code,
        }
    }

    /// The configuration key this error refers to, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MalformedConfigValue { key, .. } | Self::MissingConfig { key, .. } => Some(key),
            Self::InvalidArgument { field, .. } => field.as_deref(),
            Self::Store { .. } => None,
        }
    }
}

/// Type alias for Results using InputError
pub type Result<T> = std::result::Result<T, InputError>;

impl From<StoreError> for InputError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::TableNotFound(_) => ErrorCode::STORE_TABLE_NOT_FOUND,
            StoreError::TableExists(_) => ErrorCode::STORE_TABLE_EXISTS,
            StoreError::UnknownIterator { .. } => ErrorCode::STORE_UNKNOWN_ITERATOR,
            StoreError::InvalidIteratorOption { .. } => ErrorCode::STORE_INVALID_ITERATOR_OPTION,
            StoreError::Lock(_) => ErrorCode::STORE_LOCK_FAILED,
        };
        let message = err.to_string();
        InputError::store_with_code(code, message).with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_creation_and_codes() {
        let err = InputError::invalid_argument("maxVersions must be at least 1");
        assert_eq!(err.code(), ErrorCode::VALIDATION_GENERIC);
        assert_eq!(err.exit_code(), 8);
        assert!(err.to_string().contains("[E7000]"));

        let err = InputError::missing("TabletInputFormat.table");
        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        assert_eq!(err.key(), Some("TabletInputFormat.table"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_malformed_carries_key_and_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        let err = InputError::malformed("p.iterators", "cannot decode")
            .with_source(io_err)
            .with_context("while reading iterators");

        assert_eq!(err.key(), Some("p.iterators"));
        assert!(err.source().is_some());
        let text = err.to_string();
        assert!(text.contains("'p.iterators'"));
        assert!(text.contains("while reading iterators"));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: InputError = StoreError::TableNotFound("missing".to_string()).into();
        assert!(matches!(err, InputError::Store { .. }));
        assert_eq!(err.code(), ErrorCode::STORE_TABLE_NOT_FOUND);
        assert!(err.to_string().contains("missing"));
        assert!(err.source().is_some());
    }
}
