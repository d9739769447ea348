//! Command handlers for browsing the board and moving books between columns.

use eyre::Result;
use tsundoku_domain::plan_move;
use tsundoku_storage::{BookStore, Stage};

use crate::commands::Books;
use crate::utils::{format_book_line, resolve_book_id};

pub async fn handle_list_command(stage: Option<Stage>, library: &Books) -> Result<()> {
    let books = match stage {
        Some(stage) => library.books_in_stage(stage).await?,
        None => library.all_books().await?,
    };

    let heading = stage.map(|s| s.label()).unwrap_or("Library");
    if books.is_empty() {
        println!("No books in {}", heading);
        return Ok(());
    }

    println!("{} ({} books):", heading, books.len());
    for book in &books {
        match stage {
            Some(_) => println!("  {:>3}. {}", book.position, format_book_line(book)),
            None => println!("  [{}] {}", book.stage, format_book_line(book)),
        }
    }
    Ok(())
}

pub async fn handle_board_command(library: &Books) -> Result<()> {
    let board = library.board().await?;

    for (stage, books) in &board {
        println!("{} ({})", stage.label(), books.len());
        if books.is_empty() {
            println!("  (empty)");
        }
        for book in books {
            println!("  {:>3}. {}", book.position, format_book_line(book));
        }
        println!();
    }
    Ok(())
}

pub async fn handle_search_command(query: String, library: &Books) -> Result<()> {
    let books = library.search(&query).await?;

    if books.is_empty() {
        println!("No books match '{}'", query);
        return Ok(());
    }

    println!("Found {} books:", books.len());
    for book in &books {
        println!("  [{}] {}", book.stage, format_book_line(book));
    }
    Ok(())
}

pub async fn handle_move_command(
    input: String,
    stage: Stage,
    index: usize,
    library: &Books,
    dry_run: bool,
) -> Result<()> {
    let Some(id) = resolve_book_id(&input, library.store().as_ref()).await? else {
        return Ok(());
    };

    if dry_run {
        let snapshot = library.store().get_all().await?;
        match plan_move(&snapshot, &id, stage, index, 0) {
            Some(plan) => {
                println!(
                    "Would move {} from {} to {} at position {} ({} writes)",
                    id,
                    plan.from,
                    plan.to,
                    plan.position,
                    plan.writes.len()
                );
            }
            None => println!("❌ Book not found: {}", id),
        }
        return Ok(());
    }

    let from = library.get(&id).await?.map(|b| b.stage);
    if !library.move_to_position(&id, stage, index).await? {
        println!("❌ Book not found: {}", id);
        return Ok(());
    }

    let book = library.get(&id).await?;
    let position = book.as_ref().map(|b| b.position).unwrap_or_default();
    println!("✅ Moved to {} at position {}", stage.label(), position);

    if let Some(from) = from
        && from != stage
        && !from.transitions().contains(&stage)
    {
        println!("💡 {} books usually go to: {}", from.label(), suggest(from));
    }
    Ok(())
}

pub async fn handle_compact_command(stage: Stage, library: &Books, dry_run: bool) -> Result<()> {
    if dry_run {
        let books = library.books_in_stage(stage).await?;
        let out_of_place = books
            .iter()
            .enumerate()
            .filter(|(i, b)| b.position as usize != *i)
            .count();
        println!("Would renumber {} books in {}", out_of_place, stage.label());
        return Ok(());
    }

    let rewritten = library.compact_stage(stage).await?;
    if rewritten == 0 {
        println!("✅ {} is already in order", stage.label());
    } else {
        println!("✅ Renumbered {} books in {}", rewritten, stage.label());
    }
    Ok(())
}

fn suggest(stage: Stage) -> String {
    let next: Vec<&str> = stage.transitions().iter().map(|s| s.label()).collect();
    next.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tsundoku_domain::{Library, NewBook};
    use tsundoku_storage::FilesystemStorage;

    #[tokio::test]
    async fn test_move_and_compact_through_handlers() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        storage.initialize().await.unwrap();
        let library: Books = Library::new(Arc::new(storage));

        for title in ["Piranesi", "Jonathan Strange", "The Ladies of Grace Adieu"] {
            library
                .create(NewBook::new(title, "Susanna Clarke").in_stage(Stage::ToBuy))
                .await
                .unwrap();
        }

        handle_move_command("piranesi".to_string(), Stage::ToRead, 0, &library, true)
            .await
            .unwrap();
        assert!(library.books_in_stage(Stage::ToRead).await.unwrap().is_empty());

        handle_move_command("piranesi".to_string(), Stage::ToRead, 0, &library, false)
            .await
            .unwrap();
        let to_read = library.books_in_stage(Stage::ToRead).await.unwrap();
        assert_eq!(to_read.len(), 1);
        assert_eq!(to_read[0].title, "Piranesi");

        let to_buy = library.books_in_stage(Stage::ToBuy).await.unwrap();
        let positions: Vec<u32> = to_buy.iter().map(|b| b.position).collect();
        assert_eq!(positions, vec![0, 1]);

        handle_compact_command(Stage::ToBuy, &library, false)
            .await
            .unwrap();
        handle_board_command(&library).await.unwrap();
    }

    #[test]
    fn test_suggest_lists_next_stages() {
        assert!(suggest(Stage::ToBuy).contains(Stage::ToRead.label()));
        assert_eq!(suggest(Stage::ToRead), "Library, To release");
    }
}
