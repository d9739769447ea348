//! Book lifecycle: creation, edits, deletion and the reading flag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};

use tsundoku_storage::{Book, BookChanges, BookId, BookStore, Stage};

use crate::error::{LibraryError, Result};
use crate::events::LibraryEvent;
use crate::moves::sort_by_position;
use crate::search::matches_search;

const EVENT_CAPACITY: usize = 64;

/// Current time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Tunables for a [`Library`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryOptions {
    /// Stage used by [`Library::create`] when the caller does not pick one.
    #[serde(default)]
    pub default_stage: Stage,
    /// Renumber the remaining books of a stage after a delete.
    ///
    /// Off by default: a delete may leave a gap that the next move into or
    /// out of that stage closes.
    #[serde(default)]
    pub compact_on_delete: bool,
}

/// Fields for a new book.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub stage: Option<Stage>,
    pub notes: Option<String>,
    pub store_url: Option<String>,
    pub isbn: Option<String>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn in_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }
}

/// Incidental edits to a book.
///
/// There is deliberately no `stage` here; changing columns goes through
/// [`Library::move_to_position`] so positions stay consistent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_url: Option<String>,
    pub notes: Option<String>,
    pub store_url: Option<String>,
    pub isbn: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn into_changes(self, now: i64) -> BookChanges {
        BookChanges {
            title: self.title,
            author: self.author,
            cover_url: self.cover_url,
            notes: self.notes,
            store_url: self.store_url,
            isbn: self.isbn,
            updated_at: Some(now),
            ..Default::default()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The board: a [`BookStore`] plus the rules that keep every stage ordered.
///
/// Operations that touch more than one record take an internal write gate, so
/// two moves issued through the same `Library` never interleave their reads
/// and writes. The store itself offers no transactions; another writer on the
/// same store is not coordinated with.
pub struct Library<S: ?Sized> {
    pub(crate) store: Arc<S>,
    pub(crate) options: LibraryOptions,
    pub(crate) write_gate: Mutex<()>,
    events: broadcast::Sender<LibraryEvent>,
}

impl<S: BookStore + ?Sized> Library<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, LibraryOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: LibraryOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            options,
            write_gate: Mutex::new(()),
            events,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    /// Receive an event after each completed mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: LibraryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // === Queries ===

    pub async fn get(&self, id: &BookId) -> Result<Option<Book>> {
        Ok(self.store.get(id).await?)
    }

    /// Books of one stage, front of the column first.
    pub async fn books_in_stage(&self, stage: Stage) -> Result<Vec<Book>> {
        let mut books = self.store.get_all_by_stage(stage).await?;
        sort_by_position(&mut books);
        Ok(books)
    }

    /// Every book, most recently touched first.
    pub async fn all_books(&self) -> Result<Vec<Book>> {
        let mut books = self.store.get_all().await?;
        books.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(books)
    }

    /// Every stage with its books in column order. Empty stages are present.
    pub async fn board(&self) -> Result<BTreeMap<Stage, Vec<Book>>> {
        let mut board: BTreeMap<Stage, Vec<Book>> =
            Stage::ALL.iter().map(|stage| (*stage, Vec::new())).collect();

        for book in self.store.get_all().await? {
            board.entry(book.stage).or_default().push(book);
        }
        for books in board.values_mut() {
            sort_by_position(books);
        }

        Ok(board)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        let mut books = self.all_books().await?;
        books.retain(|book| matches_search(book, query));
        Ok(books)
    }

    // === Lifecycle ===

    /// Add a book at the front of its stage.
    ///
    /// Every book already in the stage is pushed back by one.
    pub async fn create(&self, new_book: NewBook) -> Result<Book> {
        if new_book.title.trim().is_empty() {
            return Err(LibraryError::InvalidBook {
                message: "Book title cannot be empty".to_string(),
            });
        }

        let stage = new_book.stage.unwrap_or(self.options.default_stage);
        let _gate = self.write_gate.lock().await;

        let existing = self.store.get_all_by_stage(stage).await?;
        for book in &existing {
            let position = book.position.saturating_add(1);
            debug!(id = %book.id, %stage, position, "shifting book for insert");
            self.store
                .update(&book.id, &BookChanges::position(position))
                .await?;
        }

        let now = now_millis();
        let book = Book {
            id: BookId::generate(),
            title: new_book.title,
            author: new_book.author,
            cover_url: new_book.cover_url,
            stage,
            position: 0,
            created_at: now,
            updated_at: now,
            is_reading: None,
            notes: non_empty(new_book.notes),
            store_url: non_empty(new_book.store_url),
            isbn: non_empty(new_book.isbn),
        };
        self.store.put(&book).await?;

        info!(id = %book.id, %stage, shifted = existing.len(), "created book");
        self.emit(LibraryEvent::Created {
            id: book.id.clone(),
            stage,
        });
        Ok(book)
    }

    /// Apply incidental edits. Position and stage are untouched.
    ///
    /// # Returns
    /// `false` if the book does not exist
    pub async fn update(&self, id: &BookId, patch: BookPatch) -> Result<bool> {
        if patch.title.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Err(LibraryError::InvalidBook {
                message: "Book title cannot be empty".to_string(),
            });
        }

        let updated = self
            .store
            .update(id, &patch.into_changes(now_millis()))
            .await?;

        if updated {
            debug!(%id, "updated book");
            self.emit(LibraryEvent::Updated { id: id.clone() });
        }
        Ok(updated)
    }

    /// Remove a book.
    ///
    /// Unless [`LibraryOptions::compact_on_delete`] is set, the survivors keep
    /// their stored positions.
    ///
    /// # Returns
    /// `false` if the book did not exist
    pub async fn delete(&self, id: &BookId) -> Result<bool> {
        let _gate = self.write_gate.lock().await;

        let Some(book) = self.store.get(id).await? else {
            return Ok(false);
        };
        if !self.store.delete(id).await? {
            return Ok(false);
        }

        info!(%id, stage = %book.stage, "deleted book");
        self.emit(LibraryEvent::Deleted {
            id: id.clone(),
            stage: book.stage,
        });

        if self.options.compact_on_delete {
            self.compact_locked(book.stage).await?;
        }
        Ok(true)
    }

    /// Flag a book as being read and bring it to the front of its stage.
    ///
    /// # Returns
    /// `false` if the book does not exist
    pub async fn mark_as_reading(&self, id: &BookId) -> Result<bool> {
        let _gate = self.write_gate.lock().await;

        let Some(book) = self.store.get(id).await? else {
            return Ok(false);
        };

        self.move_locked(id, book.stage, 0).await?;

        let changes = BookChanges {
            is_reading: Some(true),
            updated_at: Some(now_millis()),
            ..Default::default()
        };
        let updated = self.store.update(id, &changes).await?;
        if updated {
            info!(%id, "marked as reading");
            self.emit(LibraryEvent::Updated { id: id.clone() });
        }
        Ok(updated)
    }

    /// Clear the reading flag. The book stays where it is.
    ///
    /// # Returns
    /// `false` if the book does not exist
    pub async fn unmark_reading(&self, id: &BookId) -> Result<bool> {
        let changes = BookChanges {
            is_reading: Some(false),
            updated_at: Some(now_millis()),
            ..Default::default()
        };
        let updated = self.store.update(id, &changes).await?;
        if updated {
            info!(%id, "unmarked reading");
            self.emit(LibraryEvent::Updated { id: id.clone() });
        }
        Ok(updated)
    }
}
