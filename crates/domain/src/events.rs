//! Change notifications emitted after library mutations.

use tsundoku_storage::{BookId, Stage};

use crate::import::ImportMode;

/// Something changed in the store.
///
/// Events are sent once the operation's writes have completed. Views are
/// expected to re-query rather than patch themselves from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryEvent {
    Created {
        id: BookId,
        stage: Stage,
    },
    Updated {
        id: BookId,
    },
    Moved {
        id: BookId,
        from: Stage,
        to: Stage,
        position: u32,
    },
    Deleted {
        id: BookId,
        stage: Stage,
    },
    Imported {
        count: usize,
        mode: ImportMode,
    },
    Compacted {
        stage: Stage,
        rewritten: usize,
    },
}
