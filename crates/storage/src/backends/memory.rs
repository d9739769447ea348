//! In-memory storage backend.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::Result;
use crate::models::{Book, BookChanges};
use crate::traits::BookStore;
use crate::types::{BookId, Stage};

/// Volatile store backed by a [`DashMap`].
///
/// Every record operation locks a single shard, which matches the
/// per-record atomicity the rest of the system assumes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: DashMap<BookId, Book>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `books`.
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let store = Self::new();
        for book in books {
            store.books.insert(book.id.clone(), book);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn get(&self, id: &BookId) -> Result<Option<Book>> {
        Ok(self.books.get(id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, book: &Book) -> Result<()> {
        self.books.insert(book.id.clone(), book.clone());
        Ok(())
    }

    async fn update(&self, id: &BookId, changes: &BookChanges) -> Result<bool> {
        if changes.is_empty() {
            return Ok(self.books.contains_key(id));
        }

        match self.books.get_mut(id) {
            Some(mut entry) => {
                changes.apply_to(entry.value_mut());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &BookId) -> Result<bool> {
        Ok(self.books.remove(id).is_some())
    }

    async fn get_all_by_stage(&self, stage: Stage) -> Result<Vec<Book>> {
        Ok(self
            .books
            .iter()
            .filter(|entry| entry.stage == stage)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<Book>> {
        Ok(self.books.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn clear(&self) -> Result<()> {
        self.books.clear();
        Ok(())
    }

    async fn bulk_put(&self, books: &[Book]) -> Result<()> {
        for book in books {
            self.books.insert(book.id.clone(), book.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, stage: Stage, position: u32) -> Book {
        Book {
            id: BookId::from(id),
            title: format!("Title {id}"),
            author: String::new(),
            cover_url: String::new(),
            stage,
            position,
            created_at: 1,
            updated_at: 1,
            is_reading: None,
            notes: None,
            store_url: None,
            isbn: None,
        }
    }

    #[tokio::test]
    async fn test_put_get_and_stage_query() {
        let store = MemoryStore::new();
        store.put(&book("a", Stage::ToRead, 0)).await.unwrap();
        store.put(&book("b", Stage::Library, 0)).await.unwrap();

        assert!(store.get(&BookId::from("a")).await.unwrap().is_some());
        assert!(store.get(&BookId::from("zzz")).await.unwrap().is_none());

        let to_read = store.get_all_by_stage(Stage::ToRead).await.unwrap();
        assert_eq!(to_read.len(), 1);
        assert_eq!(to_read[0].id.as_str(), "a");
    }

    #[tokio::test]
    async fn test_update_missing_record_reports_false() {
        let store = MemoryStore::new();
        let updated = store
            .update(&BookId::from("ghost"), &BookChanges::position(1))
            .await
            .unwrap();
        assert!(!updated);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_put_upserts() {
        let store = MemoryStore::with_books([book("a", Stage::ToBuy, 0)]);
        let mut replacement = book("a", Stage::ToBuy, 0);
        replacement.title = "Replaced".to_string();

        store
            .bulk_put(&[replacement, book("b", Stage::ToBuy, 1)])
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        let a = store.get(&BookId::from("a")).await.unwrap().unwrap();
        assert_eq!(a.title, "Replaced");

        store.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }
}
