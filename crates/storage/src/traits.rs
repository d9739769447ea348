//! Trait definitions for the book storage system.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Book, BookChanges};
use crate::types::{BookId, Stage};

/// Keyed record storage for books.
///
/// Each call is applied to one record (or, for `bulk_put` and `clear`, to the
/// whole collection) on its own. There are no cross-record transactions, so a
/// caller that issues several writes must tolerate observing them one by one.
#[async_trait]
pub trait BookStore: Send + Sync {
    // === Record Operations ===

    /// Get a book by its ID.
    ///
    /// # Returns
    /// `Some(book)` if found, `None` if not found
    async fn get(&self, id: &BookId) -> Result<Option<Book>>;

    /// Insert a book, replacing any stored record with the same ID.
    async fn put(&self, book: &Book) -> Result<()>;

    /// Merge `changes` into the stored record.
    ///
    /// # Returns
    /// `true` if the record existed, `false` if there was nothing to update
    async fn update(&self, id: &BookId, changes: &BookChanges) -> Result<bool>;

    /// Delete a book.
    ///
    /// # Returns
    /// `true` if the book was deleted, `false` if it didn't exist
    async fn delete(&self, id: &BookId) -> Result<bool>;

    // === Query Operations ===

    /// All books whose stage is `stage`, in no particular order.
    async fn get_all_by_stage(&self, stage: Stage) -> Result<Vec<Book>>;

    /// Every stored book, in no particular order.
    async fn get_all(&self) -> Result<Vec<Book>>;

    // === Bulk Operations ===

    /// Remove every record.
    async fn clear(&self) -> Result<()>;

    /// Upsert every book by ID.
    async fn bulk_put(&self, books: &[Book]) -> Result<()>;
}
