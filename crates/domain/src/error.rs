//! Error types for library operations.

use thiserror::Error;
use tsundoku_storage::BookStorageError;

/// Errors surfaced by [`Library`](crate::Library) operations.
///
/// A missing book is never an error here: moves and flag changes on a book
/// that has already been deleted quietly do nothing.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Invalid book: {message}")]
    InvalidBook { message: String },

    #[error(transparent)]
    Storage(#[from] BookStorageError),

    #[error(transparent)]
    Backup(#[from] BackupError),
}

/// Reasons a backup file is rejected as a whole.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid JSON file")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid backup format: {reason}")]
    InvalidFormat { reason: String },

    #[error("No valid book found in the backup ({dropped} records dropped)")]
    NoValidBooks { dropped: usize },

    #[error("Failed to serialize backup")]
    Serialize(#[source] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
