//! Backend implementations for the book storage system.
//!
//! `MemoryStore` keeps everything in a concurrent map and is what tests and
//! embedders reach for; `FilesystemStorage` persists one JSON file per book.

pub mod filesystem;
pub mod memory;

pub use filesystem::FilesystemStorage;
pub use memory::MemoryStore;
