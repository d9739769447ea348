//! Both backends must behave the same through the `BookStore` trait.

use serde_json::Value;
use std::fs;
use tempfile::TempDir;
use tsundoku_storage::{Book, BookChanges, BookId, BookStore, FilesystemStorage, MemoryStore, Stage};

fn create_test_book(id: &str, stage: Stage, position: u32) -> Book {
    Book {
        id: BookId::from(id),
        title: format!("Title {id}"),
        author: "Author".to_string(),
        cover_url: String::new(),
        stage,
        position,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
        is_reading: None,
        notes: None,
        store_url: None,
        isbn: None,
    }
}

/// Runs the same script of operations and returns the final contents sorted by id.
async fn exercise(store: &dyn BookStore) -> Vec<Book> {
    store
        .bulk_put(&[
            create_test_book("a", Stage::ToBuy, 0),
            create_test_book("b", Stage::ToBuy, 1),
            create_test_book("c", Stage::ToRead, 0),
        ])
        .await
        .unwrap();

    let changes = BookChanges {
        stage: Some(Stage::ToRead),
        position: Some(1),
        updated_at: Some(1_700_000_000_500),
        ..Default::default()
    };
    assert!(store.update(&BookId::from("b"), &changes).await.unwrap());
    assert!(!store.update(&BookId::from("zz"), &changes).await.unwrap());

    assert!(store.delete(&BookId::from("a")).await.unwrap());
    assert!(!store.delete(&BookId::from("a")).await.unwrap());

    let to_read = store.get_all_by_stage(Stage::ToRead).await.unwrap();
    assert_eq!(to_read.len(), 2);
    assert!(store.get_all_by_stage(Stage::ToBuy).await.unwrap().is_empty());

    let mut all = store.get_all().await.unwrap();
    all.sort_by(|x, y| x.id.cmp(&y.id));
    all
}

#[tokio::test]
async fn test_memory_and_filesystem_agree() {
    let temp_dir = TempDir::new().unwrap();
    let filesystem = FilesystemStorage::new(temp_dir.path());
    filesystem.initialize().await.unwrap();
    let memory = MemoryStore::new();

    let from_disk = exercise(&filesystem).await;
    let from_memory = exercise(&memory).await;

    assert_eq!(from_disk, from_memory);
    assert_eq!(from_disk[0].id.as_str(), "b");
    assert_eq!(from_disk[0].stage, Stage::ToRead);
    assert_eq!(from_disk[0].updated_at, 1_700_000_000_500);
}

#[tokio::test]
async fn test_records_on_disk_use_camel_case() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FilesystemStorage::new(temp_dir.path());
    storage.initialize().await.unwrap();

    let mut book = create_test_book("on-disk", Stage::ToRelease, 3);
    book.is_reading = Some(true);
    storage.put(&book).await.unwrap();

    let path = temp_dir.path().join("books").join("on-disk.json");
    let json: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    assert_eq!(json["stage"], "to_release");
    assert_eq!(json["position"], 3);
    assert_eq!(json["coverUrl"], "");
    assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
    assert_eq!(json["isReading"], true);
    assert!(json.get("notes").is_none(), "absent optionals are omitted");
}

#[tokio::test]
async fn test_reopened_store_sees_previous_writes() {
    let temp_dir = TempDir::new().unwrap();
    {
        let storage = FilesystemStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();
        storage
            .put(&create_test_book("kept", Stage::Library, 0))
            .await
            .unwrap();
    }

    let reopened = FilesystemStorage::new(temp_dir.path());
    let book = reopened.get(&BookId::from("kept")).await.unwrap();
    assert_eq!(book.map(|b| b.stage), Some(Stage::Library));
}
