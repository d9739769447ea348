//! Filesystem-based storage backend implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::error::{BookStorageError, Result};
use crate::models::{Book, BookChanges, book_from_json, book_to_json};
use crate::traits::BookStore;
use crate::types::{BookId, Stage};

/// Filesystem-based storage backend.
///
/// Every book is stored as its own JSON file so that a write touches exactly
/// one record. Files are written to a temporary name and renamed into place.
///
/// Directory structure:
/// ```text
/// storage_root/
/// +-- books/
///     +-- {book_id}.json
/// ```
///
/// IDs that are not safe to use as file names (anything outside
/// `[A-Za-z0-9_-]`) are hex encoded behind a `~` prefix.
#[derive(Debug)]
pub struct FilesystemStorage {
    root_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilesystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// # Arguments
    /// * `root_path` - Path to the root storage directory
    pub fn new<P: AsRef<Path>>(root_path: P) -> Self {
        Self {
            root_path: root_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Initialize the storage directory structure.
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(self.books_dir())
            .await
            .map_err(|e| BookStorageError::backend("Failed to create books directory", e))?;
        Ok(())
    }

    fn books_dir(&self) -> PathBuf {
        self.root_path.join("books")
    }

    fn get_book_file(&self, id: &BookId) -> PathBuf {
        self.books_dir().join(file_name_for(id))
    }

    async fn read_book_file(&self, path: &Path) -> Result<Book> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| BookStorageError::backend("Failed to read book file", e))?;
        book_from_json(&content)
    }

    async fn write_book_file(&self, book: &Book) -> Result<()> {
        let path = self.get_book_file(&book.id);
        let tmp_path = path.with_extension("json.tmp");
        let content = book_to_json(book)?;

        fs::write(&tmp_path, content)
            .await
            .map_err(|e| BookStorageError::backend("Failed to write book file", e))?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| BookStorageError::backend("Failed to move book file into place", e))?;

        tracing::trace!(id = %book.id, path = %path.display(), "wrote book file");
        Ok(())
    }

    /// Read every book file. A file that cannot be read or parsed is logged
    /// and skipped so one bad record does not hide the rest of the board.
    async fn load_all(&self) -> Result<Vec<Book>> {
        let books_dir = self.books_dir();
        if !books_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&books_dir)
            .await
            .map_err(|e| BookStorageError::backend("Failed to read books directory", e))?;

        let mut books = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BookStorageError::backend("Failed to read books directory entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match self.read_book_file(&path).await {
                    Ok(book) => books.push(book),
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping unreadable book file"
                        );
                    }
                }
            }
        }

        Ok(books)
    }
}

fn file_name_for(id: &BookId) -> String {
    let raw = id.as_str();
    let safe = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if safe {
        format!("{raw}.json")
    } else {
        let encoded: String = raw.bytes().map(|b| format!("{b:02x}")).collect();
        format!("~{encoded}.json")
    }
}

#[async_trait]
impl BookStore for FilesystemStorage {
    async fn get(&self, id: &BookId) -> Result<Option<Book>> {
        let book_file = self.get_book_file(id);

        if !book_file.exists() {
            return Ok(None);
        }

        self.read_book_file(&book_file).await.map(Some)
    }

    async fn put(&self, book: &Book) -> Result<()> {
        if book.title.trim().is_empty() {
            return Err(BookStorageError::InvalidBookData {
                message: "Book title cannot be empty".to_string(),
                source: None,
            });
        }

        let _guard = self.write_lock.lock().await;
        self.write_book_file(book).await
    }

    async fn update(&self, id: &BookId, changes: &BookChanges) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let book_file = self.get_book_file(id);
        if !book_file.exists() {
            return Ok(false);
        }

        if changes.is_empty() {
            return Ok(true);
        }

        let mut book = self.read_book_file(&book_file).await?;
        changes.apply_to(&mut book);
        self.write_book_file(&book).await?;
        Ok(true)
    }

    async fn delete(&self, id: &BookId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let book_file = self.get_book_file(id);
        if !book_file.exists() {
            return Ok(false);
        }

        fs::remove_file(&book_file)
            .await
            .map_err(|e| BookStorageError::backend("Failed to delete book file", e))?;

        Ok(true)
    }

    async fn get_all_by_stage(&self, stage: Stage) -> Result<Vec<Book>> {
        let mut books = self.load_all().await?;
        books.retain(|book| book.stage == stage);
        Ok(books)
    }

    async fn get_all(&self) -> Result<Vec<Book>> {
        self.load_all().await
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let books_dir = self.books_dir();
        if books_dir.exists() {
            fs::remove_dir_all(&books_dir).await.map_err(|e| {
                BookStorageError::StorageOperationFailed {
                    operation: "clear".to_string(),
                    source: Some(eyre::eyre!("Failed to remove books directory: {}", e)),
                }
            })?;
        }

        fs::create_dir_all(&books_dir)
            .await
            .map_err(|e| BookStorageError::backend("Failed to recreate books directory", e))?;

        tracing::debug!(root = %self.root_path.display(), "cleared book storage");
        Ok(())
    }

    async fn bulk_put(&self, books: &[Book]) -> Result<()> {
        if let Some(book) = books.iter().find(|b| b.title.trim().is_empty()) {
            return Err(BookStorageError::InvalidBookData {
                message: format!("Book {} has an empty title", book.id),
                source: None,
            });
        }

        let _guard = self.write_lock.lock().await;
        for book in books {
            self.write_book_file(book).await?;
        }

        tracing::debug!(count = books.len(), "bulk wrote books");
        Ok(())
    }
}
