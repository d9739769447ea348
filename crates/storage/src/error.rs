//! Error types for the book storage system.

use thiserror::Error;

/// Errors that can occur during book storage operations.
#[derive(Debug, Error)]
pub enum BookStorageError {
    #[error("Invalid book data: {message}")]
    InvalidBookData {
        message: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Data conversion failed: {message}")]
    DataConversionError {
        message: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Storage operation failed: {operation}")]
    StorageOperationFailed {
        operation: String,
        #[source]
        source: Option<eyre::Report>,
    },

    #[error("Storage backend error")]
    BackendError {
        #[source]
        source: Option<eyre::Report>,
    },
}

impl BookStorageError {
    pub(crate) fn backend(message: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::BackendError {
            source: Some(eyre::eyre!("{}: {}", message, err)),
        }
    }

    pub(crate) fn conversion(message: &str, err: serde_json::Error) -> Self {
        Self::DataConversionError {
            message: message.to_string(),
            source: Some(eyre::eyre!("JSON error: {}", err)),
        }
    }
}

/// Result type alias for book storage operations.
pub type Result<T> = std::result::Result<T, BookStorageError>;
