//! Board rules for Tsundoku.
//!
//! Books move through four stages, and inside each stage they are kept in a
//! gap-free `0..n-1` order. This crate holds the pure ordering logic, the move
//! coordinator that turns a drag or swipe into store writes, and the lifecycle
//! operations (create, edit, delete, reading flag, import) that keep the order
//! intact.

pub mod backup;
pub mod error;
pub mod events;
pub mod import;
pub mod library;
pub mod moves;
pub mod ordering;
pub mod search;

pub use backup::{create_backup, parse_backup};
pub use error::{BackupError, LibraryError, Result};
pub use events::LibraryEvent;
pub use import::{ImportMode, ImportedBook, ensure_positions, plan_merge};
pub use library::{BookPatch, Library, LibraryOptions, NewBook};
pub use moves::{MovePlan, plan_compaction, plan_move};
pub use ordering::reorder;
pub use search::matches_search;
