//! Bulk import of books, typically from a backup file.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};
use tsundoku_storage::{Book, BookChanges, BookId, BookStore, Stage};

use crate::error::Result;
use crate::events::LibraryEvent;
use crate::library::Library;

/// What happens to books already in the store during an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Upsert by id; books not in the import are kept.
    #[default]
    Merge,
    /// Empty the store first.
    Replace,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Merge => f.write_str("merge"),
            ImportMode::Replace => f.write_str("replace"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(ImportMode::Merge),
            "replace" => Ok(ImportMode::Replace),
            other => Err(format!("Unknown import mode: {other}")),
        }
    }
}

/// A book as found in an import, where `position` may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedBook {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub cover_url: String,
    pub stage: Stage,
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
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

impl ImportedBook {
    fn into_book(self, position: u32) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            cover_url: self.cover_url,
            stage: self.stage,
            position,
            created_at: self.created_at,
            updated_at: self.updated_at,
            is_reading: self.is_reading,
            notes: self.notes,
            store_url: self.store_url,
            isbn: self.isbn,
        }
    }
}

impl From<Book> for ImportedBook {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            cover_url: book.cover_url,
            stage: book.stage,
            position: Some(book.position),
            created_at: book.created_at,
            updated_at: book.updated_at,
            is_reading: book.is_reading,
            notes: book.notes,
            store_url: book.store_url,
            isbn: book.isbn,
        }
    }
}

/// Give every imported book a position.
///
/// Books that carry a position keep it. Books without one are ranked per
/// stage by `updated_at`, most recent first, and take the lowest positions not
/// already claimed in that stage. When several books of a stage claim the same
/// position, the most recently updated one keeps it and the others are treated
/// as unpositioned. The output keeps the input order.
pub fn ensure_positions(books: Vec<ImportedBook>) -> Vec<Book> {
    let mut claimed: BTreeMap<Stage, BTreeSet<u32>> = BTreeMap::new();
    let mut assigned: Vec<Option<u32>> = vec![None; books.len()];

    let mut positioned: Vec<usize> = (0..books.len())
        .filter(|&i| books[i].position.is_some())
        .collect();
    positioned.sort_by(|&a, &b| {
        books[a]
            .position
            .cmp(&books[b].position)
            .then_with(|| books[b].updated_at.cmp(&books[a].updated_at))
    });
    for i in positioned {
        let book = &books[i];
        let Some(position) = book.position else {
            continue;
        };
        if claimed.entry(book.stage).or_default().insert(position) {
            assigned[i] = Some(position);
        } else {
            warn!(id = %book.id, stage = %book.stage, position, "duplicate imported position");
        }
    }

    let mut pending: Vec<usize> = (0..books.len()).filter(|&i| assigned[i].is_none()).collect();
    pending.sort_by(|&a, &b| books[b].updated_at.cmp(&books[a].updated_at));
    for i in pending {
        let taken = claimed.entry(books[i].stage).or_default();
        let position = (0..).find(|p| !taken.contains(p)).unwrap_or(u32::MAX);
        taken.insert(position);
        assigned[i] = Some(position);
    }

    books
        .into_iter()
        .zip(assigned)
        .map(|(book, position)| {
            let position = position.unwrap_or_default();
            book.into_book(position)
        })
        .collect()
}

/// Renumber every stage to `0..n-1`, keeping the order the positions imply.
/// The output keeps the input order.
fn settle(mut books: Vec<Book>) -> Vec<Book> {
    let mut by_stage: BTreeMap<Stage, Vec<usize>> = BTreeMap::new();
    for (i, book) in books.iter().enumerate() {
        by_stage.entry(book.stage).or_default().push(i);
    }
    for indices in by_stage.values_mut() {
        indices.sort_by(|&a, &b| {
            books[a]
                .position
                .cmp(&books[b].position)
                .then_with(|| books[a].id.cmp(&books[b].id))
        });
        for (rank, &i) in indices.iter().enumerate() {
            books[i].position = u32::try_from(rank).unwrap_or(u32::MAX);
        }
    }
    books
}

/// Fold `imported` into the current store contents.
///
/// Every stage an imported book lands in, or an overwritten book leaves, is
/// rebuilt from the surviving stored books plus the imported ones. Colliding
/// positions are resolved as in [`ensure_positions`] and each rebuilt stage is
/// renumbered to `0..n-1`.
///
/// Returns the books to write in full and the position-only updates for
/// stored books that had to shift.
pub fn plan_merge(
    existing: &[Book],
    imported: Vec<Book>,
) -> (Vec<Book>, Vec<(BookId, BookChanges)>) {
    let imported_ids: HashSet<&BookId> = imported.iter().map(|b| &b.id).collect();

    let mut touched: BTreeSet<Stage> = imported.iter().map(|b| b.stage).collect();
    touched.extend(
        existing
            .iter()
            .filter(|b| imported_ids.contains(&b.id))
            .map(|b| b.stage),
    );

    let kept: Vec<&Book> = existing
        .iter()
        .filter(|b| touched.contains(&b.stage) && !imported_ids.contains(&b.id))
        .collect();
    let kept_count = kept.len();

    let combined: Vec<ImportedBook> = kept
        .iter()
        .map(|b| ImportedBook::from((*b).clone()))
        .chain(imported.into_iter().map(ImportedBook::from))
        .collect();
    let mut settled = settle(ensure_positions(combined));

    let to_write = settled.split_off(kept_count);
    let shifts = kept
        .iter()
        .zip(&settled)
        .filter(|(before, after)| before.position != after.position)
        .map(|(_, after)| (after.id.clone(), BookChanges::position(after.position)))
        .collect();

    (to_write, shifts)
}

impl<S: BookStore + ?Sized> Library<S> {
    /// Write imported books to the store.
    ///
    /// Positions are filled in with [`ensure_positions`]; in
    /// [`ImportMode::Replace`] the store is cleared first. In
    /// [`ImportMode::Merge`] the books already stored in the affected stages
    /// are renumbered alongside the import (see [`plan_merge`]). Records with
    /// an id already in the store overwrite it. When the import itself lists
    /// an id more than once, the last occurrence wins.
    ///
    /// # Returns
    /// How many books were written
    pub async fn import_books(&self, books: Vec<ImportedBook>, mode: ImportMode) -> Result<usize> {
        let mut seen = HashSet::new();
        let mut unique: Vec<ImportedBook> = books
            .into_iter()
            .rev()
            .filter(|book| seen.insert(book.id.clone()))
            .collect();
        unique.reverse();

        let books = ensure_positions(unique);

        let _gate = self.write_gate.lock().await;
        let (books, shifts) = match mode {
            ImportMode::Replace => {
                self.store.clear().await?;
                (settle(books), Vec::new())
            }
            ImportMode::Merge => {
                let snapshot = self.store.get_all().await?;
                plan_merge(&snapshot, books)
            }
        };
        self.apply_writes(&shifts).await?;
        self.store.bulk_put(&books).await?;

        info!(count = books.len(), shifted = shifts.len(), %mode, "imported books");
        self.emit(LibraryEvent::Imported {
            count: books.len(),
            mode,
        });
        Ok(books.len())
    }

    /// Every stored book, for backups.
    pub async fn export_books(&self) -> Result<Vec<Book>> {
        let mut books = self.store.get_all().await?;
        books.sort_by(|a, b| a.stage.cmp(&b.stage).then(a.position.cmp(&b.position)));
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imported(id: &str, stage: Stage, position: Option<u32>, updated_at: i64) -> ImportedBook {
        ImportedBook {
            id: BookId::from(id),
            title: id.to_uppercase(),
            author: "X".to_string(),
            cover_url: String::new(),
            stage,
            position,
            created_at: 1_000,
            updated_at,
            is_reading: None,
            notes: None,
            store_url: None,
            isbn: None,
        }
    }

    fn position_of(books: &[Book], id: &str) -> u32 {
        books.iter().find(|b| b.id.as_str() == id).unwrap().position
    }

    #[test]
    fn test_assigns_positions_by_most_recent_update() {
        let books = ensure_positions(vec![
            imported("a", Stage::ToRead, None, 3_000),
            imported("b", Stage::ToRead, None, 1_000),
            imported("c", Stage::ToRead, None, 2_000),
        ]);

        assert_eq!(position_of(&books, "a"), 0);
        assert_eq!(position_of(&books, "c"), 1);
        assert_eq!(position_of(&books, "b"), 2);
    }

    #[test]
    fn test_preserves_existing_positions() {
        let books = ensure_positions(vec![
            imported("a", Stage::ToRead, Some(5), 1_000),
            imported("b", Stage::ToRead, Some(3), 1_000),
        ]);

        assert_eq!(position_of(&books, "a"), 5);
        assert_eq!(position_of(&books, "b"), 3);
        assert_eq!(books[0].id.as_str(), "a");
    }

    #[test]
    fn test_stages_are_numbered_independently() {
        let books = ensure_positions(vec![
            imported("a", Stage::ToRead, None, 1_000),
            imported("b", Stage::Library, None, 1_000),
        ]);

        assert_eq!(position_of(&books, "a"), 0);
        assert_eq!(position_of(&books, "b"), 0);
    }

    #[test]
    fn test_missing_positions_fill_free_slots() {
        let books = ensure_positions(vec![
            imported("a", Stage::ToBuy, Some(0), 1_000),
            imported("b", Stage::ToBuy, None, 5_000),
            imported("c", Stage::ToBuy, Some(2), 1_000),
            imported("d", Stage::ToBuy, None, 4_000),
        ]);

        assert_eq!(position_of(&books, "a"), 0);
        assert_eq!(position_of(&books, "b"), 1);
        assert_eq!(position_of(&books, "c"), 2);
        assert_eq!(position_of(&books, "d"), 3);
    }

    #[test]
    fn test_duplicate_positions_are_repaired() {
        let books = ensure_positions(vec![
            imported("old", Stage::ToBuy, Some(0), 1_000),
            imported("new", Stage::ToBuy, Some(0), 2_000),
        ]);

        assert_eq!(position_of(&books, "new"), 0);
        assert_eq!(position_of(&books, "old"), 1);
    }

    fn stored(id: &str, stage: Stage, position: u32, updated_at: i64) -> Book {
        imported(id, stage, Some(position), updated_at).into_book(position)
    }

    #[test]
    fn test_merge_shifts_stored_books_on_collision() {
        let existing = vec![
            stored("kept", Stage::ToRead, 0, 1_000),
            stored("other", Stage::Library, 0, 1_000),
        ];
        let incoming = ensure_positions(vec![imported("new", Stage::ToRead, Some(0), 2_000)]);

        let (to_write, shifts) = plan_merge(&existing, incoming);

        assert_eq!(position_of(&to_write, "new"), 0);
        assert_eq!(
            shifts,
            vec![(BookId::from("kept"), BookChanges::position(1))]
        );
    }

    #[test]
    fn test_merge_renumbers_stage_an_overwritten_book_leaves() {
        let existing = vec![
            stored("a", Stage::ToBuy, 0, 1_000),
            stored("b", Stage::ToBuy, 1, 1_000),
            stored("c", Stage::ToBuy, 2, 1_000),
        ];
        let incoming = ensure_positions(vec![imported("a", Stage::Library, Some(4), 2_000)]);

        let (to_write, shifts) = plan_merge(&existing, incoming);

        assert_eq!(to_write.len(), 1);
        assert_eq!(to_write[0].stage, Stage::Library);
        assert_eq!(to_write[0].position, 0);
        assert_eq!(
            shifts,
            vec![
                (BookId::from("b"), BookChanges::position(0)),
                (BookId::from("c"), BookChanges::position(1)),
            ]
        );
    }

    #[test]
    fn test_settle_closes_gaps() {
        let books = settle(vec![
            stored("a", Stage::ToRead, 5, 1_000),
            stored("b", Stage::ToRead, 3, 1_000),
            stored("c", Stage::Library, 9, 1_000),
        ]);

        assert_eq!(position_of(&books, "b"), 0);
        assert_eq!(position_of(&books, "a"), 1);
        assert_eq!(position_of(&books, "c"), 0);
        assert_eq!(books[0].id.as_str(), "a");
    }

    #[test]
    fn test_import_mode_parsing() {
        assert_eq!("Replace".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert_eq!("merge".parse::<ImportMode>().unwrap(), ImportMode::Merge);
        assert!("append".parse::<ImportMode>().is_err());
    }
}
