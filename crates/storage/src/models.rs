//! Storage model types and conversion utilities.

use serde::{Deserialize, Serialize};

use crate::error::{BookStorageError, Result};
use crate::types::{BookId, Stage};

/// A tracked book.
///
/// `position` is the zero-based rank of the book inside its `stage` column.
/// Positions are only meaningful relative to other books in the same stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Remote image URL or an embedded `data:` URI.
    #[serde(default)]
    pub cover_url: String,
    pub stage: Stage,
    pub position: u32,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Milliseconds since the Unix epoch, refreshed on every mutation.
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reading: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

impl Book {
    pub fn is_reading(&self) -> bool {
        self.is_reading.unwrap_or(false)
    }
}

/// Partial record used by [`BookStore::update`](crate::traits::BookStore::update).
///
/// Only the fields that are `Some` are written; everything else on the stored
/// record is left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_reading: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

impl BookChanges {
    /// Changes that only move a book to a new position.
    pub fn position(position: u32) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// True when applying these changes would leave a book untouched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the provided fields into `book`.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(cover_url) = &self.cover_url {
            book.cover_url = cover_url.clone();
        }
        if let Some(stage) = self.stage {
            book.stage = stage;
        }
        if let Some(position) = self.position {
            book.position = position;
        }
        if let Some(updated_at) = self.updated_at {
            book.updated_at = updated_at;
        }
        if let Some(is_reading) = self.is_reading {
            book.is_reading = Some(is_reading);
        }
        if let Some(notes) = &self.notes {
            book.notes = Some(notes.clone());
        }
        if let Some(store_url) = &self.store_url {
            book.store_url = Some(store_url.clone());
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = Some(isbn.clone());
        }
    }
}

pub fn book_to_json(book: &Book) -> Result<String> {
    serde_json::to_string_pretty(book)
        .map_err(|e| BookStorageError::conversion("Failed to serialize book to JSON", e))
}

pub fn book_from_json(json: &str) -> Result<Book> {
    serde_json::from_str(json)
        .map_err(|e| BookStorageError::conversion("Failed to deserialize book from JSON", e))
}
