//! Free-text filtering of books.

use tsundoku_storage::Book;

/// Whether `book` matches every whitespace separated token of `query`.
///
/// Matching is case-insensitive against the title and author. An empty query
/// matches everything.
pub fn matches_search(book: &Book, query: &str) -> bool {
    let query = query.to_lowercase();
    let mut tokens = query.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return true;
    }

    let haystack = format!("{} {}", book.title, book.author).to_lowercase();
    tokens.all(|token| haystack.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsundoku_storage::{BookId, Stage};

    fn book(title: &str, author: &str) -> Book {
        Book {
            id: BookId::from("1"),
            title: title.to_string(),
            author: author.to_string(),
            cover_url: String::new(),
            stage: Stage::ToRead,
            position: 0,
            created_at: 0,
            updated_at: 0,
            is_reading: None,
            notes: None,
            store_url: None,
            isbn: None,
        }
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert!(matches_search(&book("Dune", "Frank Herbert"), ""));
        assert!(matches_search(&book("Dune", "Frank Herbert"), "   "));
    }

    #[test]
    fn test_tokens_span_title_and_author() {
        let dune = book("Dune", "Frank Herbert");
        assert!(matches_search(&dune, "dune herbert"));
        assert!(matches_search(&dune, "HERB"));
        assert!(!matches_search(&dune, "dune asimov"));
    }
}
