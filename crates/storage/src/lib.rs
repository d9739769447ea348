//! Book storage interface and implementations for Tsundoku.
//!
//! This crate provides the keyed record store the board is built on: the
//! `Book` entity, the `BookStore` trait, and the in-memory and filesystem
//! backends.

pub mod backends;
pub mod error;
pub mod models;
pub mod traits;
pub mod types;

// Re-export the main interface and types for easy access
pub use backends::{FilesystemStorage, MemoryStore};
pub use error::{BookStorageError, Result};
pub use models::{Book, BookChanges};
pub use traits::BookStore;
pub use types::{BookId, Stage, UnknownStage};
