//! Export and import of JSON backups.

use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;
use tsundoku_domain::backup::backup_file_name;
use tsundoku_domain::{ImportMode, create_backup, parse_backup};
use tsundoku_storage::BookStore;

use crate::commands::Books;
use crate::utils::confirm;

pub async fn handle_export_command(
    output: Option<PathBuf>,
    library: &Books,
    dry_run: bool,
) -> Result<()> {
    let books = library.export_books().await?;
    let path = output.unwrap_or_else(|| PathBuf::from(backup_file_name()));

    if dry_run {
        println!("Would export {} books to {}", books.len(), path.display());
        return Ok(());
    }

    let json = create_backup(&books)?;
    fs::write(&path, json)
        .await
        .wrap_err_with(|| format!("Failed to write backup to {}", path.display()))?;

    info!(count = books.len(), path = %path.display(), "exported backup");
    println!("✅ Exported {} books to {}", books.len(), path.display());
    Ok(())
}

pub async fn handle_import_command(
    file: PathBuf,
    replace: bool,
    force: bool,
    library: &Books,
    dry_run: bool,
) -> Result<()> {
    let content = fs::read_to_string(&file)
        .await
        .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
    let books = parse_backup(&content)?;
    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    if dry_run {
        println!("Would import {} books ({})", books.len(), mode);
        return Ok(());
    }

    if mode == ImportMode::Replace && !force {
        let existing = library.store().get_all().await?.len();
        let prompt = format!(
            "This will delete all {} books before importing. Continue? (y/N): ",
            existing
        );
        if !confirm(&prompt)? {
            println!("❌ Cancelled");
            return Ok(());
        }
    }

    let imported = library.import_books(books, mode).await?;
    println!("✅ Imported {} books ({})", imported, mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tsundoku_domain::{Library, NewBook};
    use tsundoku_storage::{FilesystemStorage, Stage};

    async fn library(path: &std::path::Path) -> Books {
        let storage = FilesystemStorage::new(path);
        storage.initialize().await.unwrap();
        Library::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_library() {
        let dir = TempDir::new().unwrap();
        let source = library(&dir.path().join("source")).await;
        source
            .create(NewBook::new("Kindred", "Octavia E. Butler").in_stage(Stage::Library))
            .await
            .unwrap();
        source
            .create(NewBook::new("Parable of the Sower", "Octavia E. Butler"))
            .await
            .unwrap();

        let backup = dir.path().join("backup.json");
        handle_export_command(Some(backup.clone()), &source, false)
            .await
            .unwrap();
        assert!(backup.exists());

        let target = library(&dir.path().join("target")).await;
        handle_import_command(backup.clone(), false, false, &target, false)
            .await
            .unwrap();

        let mut titles: Vec<String> = target
            .all_books()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Kindred", "Parable of the Sower"]);
    }

    #[tokio::test]
    async fn test_import_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let target = library(&dir.path().join("target")).await;
        let file = dir.path().join("bad.json");
        tokio::fs::write(&file, "{\"books\": []}").await.unwrap();

        assert!(
            handle_import_command(file, false, false, &target, false)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_dry_run_export_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let source = library(&dir.path().join("source")).await;
        let backup = dir.path().join("backup.json");

        handle_export_command(Some(backup.clone()), &source, true)
            .await
            .unwrap();
        assert!(!backup.exists());
    }
}
