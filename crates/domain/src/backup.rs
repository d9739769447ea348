//! JSON backup files: `{ "version": 1, "exportedAt": "...", "books": [...] }`.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use tsundoku_storage::{Book, BookId, Stage};

use crate::error::BackupError;
use crate::import::ImportedBook;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupFile<'a> {
    version: u32,
    exported_at: String,
    books: &'a [Book],
}

/// Serialize `books` as a pretty-printed backup document.
pub fn create_backup(books: &[Book]) -> Result<String, BackupError> {
    let backup = BackupFile {
        version: BACKUP_VERSION,
        exported_at: chrono::Utc::now().to_rfc3339(),
        books,
    };
    serde_json::to_string_pretty(&backup).map_err(BackupError::Serialize)
}

/// Suggested file name for a backup written today.
pub fn backup_file_name() -> String {
    format!("tsundoku-backup-{}.json", chrono::Utc::now().format("%Y-%m-%d"))
}

/// Parse a backup document.
///
/// The document is rejected as a whole when it is not JSON, has no truthy
/// `version`, or its `books` is not an array. Otherwise each record is kept
/// only if it has a non-empty string `id` and `title` and a known `stage`;
/// the rest are dropped. If records were present but none survived, the
/// import fails with [`BackupError::NoValidBooks`].
pub fn parse_backup(json: &str) -> Result<Vec<ImportedBook>, BackupError> {
    let data: Value = serde_json::from_str(json).map_err(BackupError::InvalidJson)?;

    if !has_version(&data) {
        return Err(BackupError::InvalidFormat {
            reason: "missing version".to_string(),
        });
    }
    let Some(records) = data.get("books").and_then(Value::as_array) else {
        return Err(BackupError::InvalidFormat {
            reason: "books is not an array".to_string(),
        });
    };

    let mut books = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match parse_record(record) {
            Some(book) => books.push(book),
            None => debug!(index, "dropping invalid backup record"),
        }
    }

    let dropped = records.len() - books.len();
    if books.is_empty() && !records.is_empty() {
        return Err(BackupError::NoValidBooks { dropped });
    }
    if dropped > 0 {
        warn!(dropped, kept = books.len(), "dropped invalid backup records");
    }

    Ok(books)
}

fn has_version(data: &Value) -> bool {
    match data.get("version") {
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Read one record. Only `id`, `title` and `stage` are required; every other
/// field falls back to its default when absent, `null` or mistyped.
fn parse_record(record: &Value) -> Option<ImportedBook> {
    let required = |key: &str| {
        record
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    };
    let id = required("id")?;
    let title = required("title")?;
    let stage = required("stage")
        .and_then(|raw| Stage::ALL.into_iter().find(|s| s.as_str() == raw))?;

    let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);

    Some(ImportedBook {
        id: BookId::from(id),
        title: title.to_string(),
        author: text("author").unwrap_or_default(),
        cover_url: text("coverUrl").unwrap_or_default(),
        stage,
        position: record
            .get("position")
            .and_then(as_integer)
            .and_then(|p| u32::try_from(p).ok()),
        created_at: record.get("createdAt").and_then(as_integer).unwrap_or_default(),
        updated_at: record.get("updatedAt").and_then(as_integer).unwrap_or_default(),
        is_reading: record.get("isReading").and_then(Value::as_bool),
        notes: text("notes"),
        store_url: text("storeUrl"),
        isbn: text("isbn"),
    })
}

/// Integers, including floats with no fractional part such as `2.0`.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}
