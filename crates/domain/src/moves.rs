//! Moving books within and across stages.
//!
//! A move is planned against a snapshot of every book and turned into the
//! smallest set of record updates that leaves each touched stage numbered
//! `0..n-1`. The target stage is always rebuilt from scratch, so stale gaps
//! (left by a delete, say) disappear the next time the stage is touched.

use std::collections::HashMap;

use tracing::{debug, info};
use tsundoku_storage::{Book, BookChanges, BookId, BookStore, Stage};

use crate::error::Result;
use crate::events::LibraryEvent;
use crate::library::{Library, now_millis};
use crate::ordering::reorder;

/// Record updates that realize a single move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub book_id: BookId,
    pub from: Stage,
    pub to: Stage,
    /// Final position of the moved book in `to`.
    pub position: u32,
    pub writes: Vec<(BookId, BookChanges)>,
}

/// Column order: position ascending, ties broken by id so the order is stable.
pub(crate) fn sort_by_position(books: &mut [Book]) {
    books.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
}

fn partition<'a>(snapshot: &'a [Book], stage: Stage) -> Vec<&'a Book> {
    let mut books: Vec<&Book> = snapshot.iter().filter(|b| b.stage == stage).collect();
    books.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    books
}

fn rank(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

/// Position-only writes that renumber `ordered` to `0..n-1`.
fn renumber(ordered: &[&Book]) -> Vec<(BookId, BookChanges)> {
    ordered
        .iter()
        .enumerate()
        .filter(|(index, book)| book.position != rank(*index))
        .map(|(index, book)| (book.id.clone(), BookChanges::position(rank(index))))
        .collect()
}

/// Plan moving `book_id` to `target_index` of `target_stage`.
///
/// `target_index` counts the moved book itself; values past the end of the
/// column place it last. Returns `None` when the book is not in `snapshot`.
///
/// The moved book is always written (its `updated_at` becomes `now`, and its
/// stage changes only when it crosses columns). Any other book is written only
/// when its position actually changes. When the book leaves its stage, the
/// stage it left is renumbered to close the gap.
pub fn plan_move(
    snapshot: &[Book],
    book_id: &BookId,
    target_stage: Stage,
    target_index: usize,
    now: i64,
) -> Option<MovePlan> {
    let book = snapshot.iter().find(|b| &b.id == book_id)?;
    let source_stage = book.stage;

    let target = partition(snapshot, target_stage);
    let previous: HashMap<&BookId, u32> = target.iter().map(|b| (&b.id, b.position)).collect();
    let target_ids: Vec<BookId> = target.iter().map(|b| b.id.clone()).collect();
    let new_order = reorder(&target_ids, book_id, target_index);

    let mut writes = Vec::new();
    let mut position = 0;
    for (index, id) in new_order.iter().enumerate() {
        let index = rank(index);
        if id == book_id {
            position = index;
            writes.push((
                id.clone(),
                BookChanges {
                    stage: (source_stage != target_stage).then_some(target_stage),
                    position: Some(index),
                    updated_at: Some(now),
                    ..Default::default()
                },
            ));
        } else if previous.get(id).is_some_and(|p| *p != index) {
            writes.push((id.clone(), BookChanges::position(index)));
        }
    }

    if source_stage != target_stage {
        let remaining: Vec<&Book> = partition(snapshot, source_stage)
            .into_iter()
            .filter(|b| &b.id != book_id)
            .collect();
        writes.extend(renumber(&remaining));
    }

    Some(MovePlan {
        book_id: book_id.clone(),
        from: source_stage,
        to: target_stage,
        position,
        writes,
    })
}

/// Plan renumbering `stage` to `0..n-1`, keeping the current relative order.
pub fn plan_compaction(snapshot: &[Book], stage: Stage) -> Vec<(BookId, BookChanges)> {
    renumber(&partition(snapshot, stage))
}

impl<S: BookStore + ?Sized> Library<S> {
    /// Move a book to `target_index` within `target_stage`.
    ///
    /// `target_index` is the position the book should end up at, counting
    /// itself. Moving within the current stage reorders it; moving to another
    /// stage inserts it there and closes the gap it leaves behind.
    ///
    /// # Returns
    /// `false` if the book does not exist, in which case nothing is written
    pub async fn move_to_position(
        &self,
        book_id: &BookId,
        target_stage: Stage,
        target_index: usize,
    ) -> Result<bool> {
        let _gate = self.write_gate.lock().await;
        Ok(self.move_locked(book_id, target_stage, target_index).await?.is_some())
    }

    /// Renumber a stage to `0..n-1` without changing its order.
    ///
    /// # Returns
    /// How many books were rewritten
    pub async fn compact_stage(&self, stage: Stage) -> Result<usize> {
        let _gate = self.write_gate.lock().await;
        self.compact_locked(stage).await
    }

    /// Caller must hold the write gate.
    pub(crate) async fn move_locked(
        &self,
        book_id: &BookId,
        target_stage: Stage,
        target_index: usize,
    ) -> Result<Option<MovePlan>> {
        let snapshot = self.store.get_all().await?;
        let Some(plan) = plan_move(&snapshot, book_id, target_stage, target_index, now_millis())
        else {
            debug!(id = %book_id, "move ignored, book not found");
            return Ok(None);
        };

        self.apply_writes(&plan.writes).await?;

        info!(
            id = %plan.book_id,
            from = %plan.from,
            to = %plan.to,
            position = plan.position,
            writes = plan.writes.len(),
            "moved book"
        );
        self.emit(LibraryEvent::Moved {
            id: plan.book_id.clone(),
            from: plan.from,
            to: plan.to,
            position: plan.position,
        });
        Ok(Some(plan))
    }

    /// Caller must hold the write gate.
    pub(crate) async fn compact_locked(&self, stage: Stage) -> Result<usize> {
        let snapshot = self.store.get_all_by_stage(stage).await?;
        let writes = plan_compaction(&snapshot, stage);
        self.apply_writes(&writes).await?;

        if !writes.is_empty() {
            info!(%stage, rewritten = writes.len(), "compacted stage");
            self.emit(LibraryEvent::Compacted {
                stage,
                rewritten: writes.len(),
            });
        }
        Ok(writes.len())
    }

    pub(crate) async fn apply_writes(&self, writes: &[(BookId, BookChanges)]) -> Result<()> {
        for (id, changes) in writes {
            debug!(%id, position = ?changes.position, stage = ?changes.stage, "writing book");
            self.store.update(id, changes).await?;
        }
        Ok(())
    }
}
