//! Error types for policy storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`super::PolicyStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("policy file '{path}': {source}")]
    Io {
        /// Path of the policy file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not valid policy JSON.
    #[error("malformed policy data: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A key holds a value of a different shape than requested.
    #[error("key '{key}' does not hold a {expected} value")]
    TypeMismatch {
        /// The key that was read.
        key: String,
        /// The shape the caller asked for.
        expected: &'static str,
    },

    /// A writer panicked while holding the store lock.
    #[error("policy store lock poisoned")]
    Poisoned,
}

/// Result type for policy storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::TypeMismatch {
            key: "hidden_endpoints".to_string(),
            expected: "string",
        };
        assert_eq!(
            err.to_string(),
            "key 'hidden_endpoints' does not hold a string value"
        );
        assert_eq!(StoreError::Poisoned.to_string(), "policy store lock poisoned");
    }
}
