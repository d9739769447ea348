//! Book lookup and formatting helpers shared by the command handlers.

use eyre::Result;
use std::io::{self, Write};
use tsundoku_storage::{Book, BookId, BookStore};

/// Outcome of matching user input against the library.
#[derive(Debug, PartialEq)]
pub enum Resolution {
    Found(BookId),
    Ambiguous(Vec<Book>),
    Missing,
}

/// Match `input` against `books`: exact ID, then unique ID prefix, then exact
/// title (case insensitive), then unique partial title.
pub fn match_book(input: &str, books: &[Book]) -> Resolution {
    let input = input.trim();
    if input.is_empty() {
        return Resolution::Missing;
    }

    if let Some(book) = books.iter().find(|b| b.id.as_str() == input) {
        return Resolution::Found(book.id.clone());
    }

    let by_prefix: Vec<&Book> = books
        .iter()
        .filter(|b| b.id.as_str().starts_with(input))
        .collect();
    match by_prefix.len() {
        1 => return Resolution::Found(by_prefix[0].id.clone()),
        n if n > 1 => return Resolution::Ambiguous(by_prefix.into_iter().cloned().collect()),
        _ => {}
    }

    let input_lower = input.to_lowercase();
    if let Some(book) = books.iter().find(|b| b.title.to_lowercase() == input_lower) {
        return Resolution::Found(book.id.clone());
    }

    let by_title: Vec<&Book> = books
        .iter()
        .filter(|b| b.title.to_lowercase().contains(&input_lower))
        .collect();
    match by_title.len() {
        0 => Resolution::Missing,
        1 => Resolution::Found(by_title[0].id.clone()),
        _ => Resolution::Ambiguous(by_title.into_iter().cloned().collect()),
    }
}

/// Resolve a book from an ID, ID prefix or title, printing guidance when the
/// input does not identify exactly one book.
pub async fn resolve_book_id(input: &str, store: &dyn BookStore) -> Result<Option<BookId>> {
    let books = store.get_all().await?;

    match match_book(input, &books) {
        Resolution::Found(id) => Ok(Some(id)),
        Resolution::Ambiguous(matches) => {
            println!("🔍 Multiple books found matching '{}':", input);
            for book in matches.iter().take(10) {
                println!("  {}", format_book_line(book));
            }
            if matches.len() > 10 {
                println!("  ... and {} more", matches.len() - 10);
            }
            println!("💡 Please be more specific or use a longer ID prefix");
            Ok(None)
        }
        Resolution::Missing => {
            show_book_not_found_help(input, &books);
            Ok(None)
        }
    }
}

fn show_book_not_found_help(input: &str, books: &[Book]) {
    println!("❌ Book not found: '{}'", input);
    println!("💡 You can identify books using:");
    println!("   • Book ID or the first few characters of it");
    println!("   • Book title (partial match allowed)");

    if books.is_empty() {
        println!("📚 No books yet. Use 'tsundoku add <title>' to add one!");
    } else {
        println!("   Use 'tsundoku list' to see all books");
    }
}

/// Short form of an ID for listings.
pub fn short_id(id: &BookId) -> &str {
    let s = id.as_str();
    match s.char_indices().nth(8) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// One-line summary: `<short id>  <title> by <author>`.
pub fn format_book_line(book: &Book) -> String {
    let mut line = format!("{}  {}", short_id(&book.id), book.title);
    if !book.author.is_empty() {
        line.push_str(&format!(" by {}", book.author));
    }
    if book.is_reading() {
        line.push_str(" 📖");
    }
    line
}

/// Ask a yes/no question on stdin. Anything but `y...` is a no.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase().starts_with('y'))
}

/// Render a millisecond timestamp as local time.
pub fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| millis.to_string())
}
