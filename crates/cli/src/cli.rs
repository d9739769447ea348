use std::path::PathBuf;

use tsundoku_storage::Stage;

#[derive(clap::Parser, Debug)]
#[clap(name = "tsundoku", about = "Track books from the shop to the shelf")]
pub struct Cli {
    /// Override the storage directory from the configuration
    #[clap(long, global = true)]
    pub storage_path: Option<PathBuf>,

    /// Show what would change without writing anything
    #[clap(long, global = true)]
    pub dry_run: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
    #[clap(flatten)]
    Library(LibraryCommands),
}

/// Commands that operate on the book library.
#[derive(clap::Subcommand, Debug)]
pub enum LibraryCommands {
    /// Add a book at the front of a stage
    Add {
        /// Book title
        title: String,
        #[clap(long, default_value = "")]
        author: String,
        /// Cover image URL
        #[clap(long, default_value = "")]
        cover: String,
        /// Stage to add the book to (defaults to the configured stage)
        #[clap(long)]
        stage: Option<Stage>,
        #[clap(long)]
        notes: Option<String>,
        #[clap(long)]
        store_url: Option<String>,
        #[clap(long)]
        isbn: Option<String>,
    },
    /// List books, most recently touched first, or one stage in column order
    List {
        #[clap(long)]
        stage: Option<Stage>,
    },
    /// Show every stage side by side
    Board,
    /// Show details for a book
    Show {
        /// Book ID or unique ID prefix
        book: String,
    },
    /// Find books by title and author
    Search { query: String },
    /// Move a book within its stage or to another stage
    Move {
        /// Book ID or unique ID prefix
        book: String,
        /// Target stage
        stage: Stage,
        /// Position in the target stage, 0 is the front
        #[clap(long, default_value_t = 0)]
        index: usize,
    },
    /// Edit a book's details
    Edit {
        /// Book ID or unique ID prefix
        book: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        author: Option<String>,
        #[clap(long)]
        cover: Option<String>,
        #[clap(long)]
        notes: Option<String>,
        #[clap(long)]
        store_url: Option<String>,
        #[clap(long)]
        isbn: Option<String>,
    },
    /// Mark a book as being read and bring it to the front
    Reading {
        /// Book ID or unique ID prefix
        book: String,
    },
    /// Clear the reading mark
    Unread {
        /// Book ID or unique ID prefix
        book: String,
    },
    /// Remove a book
    Remove {
        /// Book ID or unique ID prefix
        book: String,
    },
    /// Renumber a stage to close gaps
    Compact { stage: Stage },
    /// Write a JSON backup
    Export {
        /// Output file (defaults to a dated file in the current directory)
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Load a JSON backup
    Import {
        file: PathBuf,
        /// Replace the whole library instead of merging
        #[clap(long)]
        replace: bool,
        /// Skip confirmation prompt when replacing
        #[clap(long)]
        force: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}
