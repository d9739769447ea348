//! Command handlers for adding, editing and removing individual books.

use eyre::Result;
use tracing::{info, warn};
use tsundoku_domain::{BookPatch, NewBook};
use tsundoku_storage::Stage;

use crate::commands::Books;
use crate::utils::{format_timestamp, resolve_book_id};

pub struct AddArgs {
    pub title: String,
    pub author: String,
    pub cover: String,
    pub stage: Option<Stage>,
    pub notes: Option<String>,
    pub store_url: Option<String>,
    pub isbn: Option<String>,
}

pub async fn handle_add_command(args: AddArgs, library: &Books, dry_run: bool) -> Result<()> {
    let stage = args.stage.unwrap_or(library.options().default_stage);

    if dry_run {
        println!("Would add '{}' to the front of {}", args.title, stage.label());
        return Ok(());
    }

    let new_book = NewBook {
        title: args.title,
        author: args.author,
        cover_url: args.cover,
        stage: Some(stage),
        notes: args.notes,
        store_url: args.store_url,
        isbn: args.isbn,
    };

    let book = library.create(new_book).await?;
    info!(id = %book.id, "book added from cli");
    println!("✅ Added '{}' to {}", book.title, stage.label());
    println!("   ID: {}", book.id);
    Ok(())
}

pub async fn handle_show_command(input: String, library: &Books) -> Result<()> {
    let Some(id) = resolve_book_id(&input, library.store().as_ref()).await? else {
        return Ok(());
    };
    let Some(book) = library.get(&id).await? else {
        println!("❌ Book not found: {}", id);
        return Ok(());
    };

    println!("{}", book.title);
    if !book.author.is_empty() {
        println!("Author: {}", book.author);
    }
    println!("ID: {}", book.id);
    println!("Stage: {} (position {})", book.stage.label(), book.position);
    if book.is_reading() {
        println!("Reading: yes");
    }
    if !book.cover_url.is_empty() {
        println!("Cover: {}", book.cover_url);
    }
    if let Some(isbn) = &book.isbn {
        println!("ISBN: {}", isbn);
    }
    if let Some(url) = &book.store_url {
        println!("Store: {}", url);
    }
    if let Some(notes) = &book.notes {
        println!("Notes: {}", notes);
    }
    println!("Added: {}", format_timestamp(book.created_at));
    println!("Updated: {}", format_timestamp(book.updated_at));

    let next: Vec<&str> = book.stage.transitions().iter().map(|s| s.as_str()).collect();
    if !next.is_empty() {
        println!("💡 Next: tsundoku move {} <{}>", book.id, next.join("|"));
    }
    Ok(())
}

pub async fn handle_edit_command(
    input: String,
    patch: BookPatch,
    library: &Books,
    dry_run: bool,
) -> Result<()> {
    if patch.is_empty() {
        println!("Nothing to change. Pass at least one of --title, --author, --cover, --notes, --store-url, --isbn");
        return Ok(());
    }

    let Some(id) = resolve_book_id(&input, library.store().as_ref()).await? else {
        return Ok(());
    };

    if dry_run {
        println!("Would update book {}", id);
        return Ok(());
    }

    if library.update(&id, patch).await? {
        println!("✅ Updated {}", id);
    } else {
        warn!(%id, "book disappeared before update");
        println!("❌ Book not found: {}", id);
    }
    Ok(())
}

pub async fn handle_reading_command(input: String, library: &Books, dry_run: bool) -> Result<()> {
    let Some(id) = resolve_book_id(&input, library.store().as_ref()).await? else {
        return Ok(());
    };

    if dry_run {
        println!("Would mark {} as reading and move it to the front", id);
        return Ok(());
    }

    if library.mark_as_reading(&id).await? {
        println!("📖 Now reading {}", id);
    } else {
        println!("❌ Book not found: {}", id);
    }
    Ok(())
}

pub async fn handle_unread_command(input: String, library: &Books, dry_run: bool) -> Result<()> {
    let Some(id) = resolve_book_id(&input, library.store().as_ref()).await? else {
        return Ok(());
    };

    if dry_run {
        println!("Would clear the reading mark on {}", id);
        return Ok(());
    }

    if library.unmark_reading(&id).await? {
        println!("✅ No longer reading {}", id);
    } else {
        println!("❌ Book not found: {}", id);
    }
    Ok(())
}

pub async fn handle_remove_command(input: String, library: &Books, dry_run: bool) -> Result<()> {
    let Some(id) = resolve_book_id(&input, library.store().as_ref()).await? else {
        return Ok(());
    };

    if dry_run {
        println!("Would remove book {}", id);
        return Ok(());
    }

    if library.delete(&id).await? {
        println!("🗑️  Removed {}", id);
        if !library.options().compact_on_delete {
            println!("💡 Run 'tsundoku compact <stage>' to renumber the stage");
        }
    } else {
        println!("❌ Book not found: {}", id);
    }
    Ok(())
}
