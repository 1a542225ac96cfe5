//! Core error types for paretojournal-core.
//!
//! Navigation blocks (future dates, unresolved skipped days) are not errors;
//! they are returned as [`crate::access::AccessDecision`] values. The types
//! here cover storage, configuration and malformed input.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for paretojournal-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by a key/value store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Read failed
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Write failed
    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// The store refused the write because it is full
    #[error("Storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },

    /// Store is locked by another writer
    #[error("Store is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Date string is not `YYYY-MM-DD`
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Wrong number of entries
    #[error("Expected {expected} entries for {field}, got {actual}")]
    WrongArity {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// Export document version cannot be imported
    #[error("Unsupported export version '{found}' (supported: {supported})")]
    UnsupportedVersion { found: String, supported: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl StorageError {
    /// Classify a SQLite failure that happened while touching `key`.
    pub fn from_sqlite(key: &str, err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            match e.code {
                rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy => {
                    return StorageError::Locked;
                }
                rusqlite::ErrorCode::DiskFull => {
                    return StorageError::QuotaExceeded {
                        key: key.to_string(),
                    };
                }
                _ => {}
            }
        }
        StorageError::WriteFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_converts_into_core_error() {
        let err: CoreError = ValidationError::InvalidDate("2024-13-01".into()).into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("2024-13-01"));
    }

    #[test]
    fn quota_message_names_key() {
        let err = StorageError::QuotaExceeded {
            key: "daily_pages".into(),
        };
        assert_eq!(
            err.to_string(),
            "Storage quota exceeded while writing 'daily_pages'"
        );
    }
}
