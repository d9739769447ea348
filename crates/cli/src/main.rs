mod cli;
mod commands;
mod config;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tsundoku_domain::{BookPatch, Library};
use tsundoku_storage::FilesystemStorage;

use crate::cli::{Cli, Commands, LibraryCommands};
use crate::commands::*;
use crate::config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Config commands never touch the library.
    let command = match cli.command {
        Commands::Config { command } => {
            return handle_config_command(command, cli.dry_run).await;
        }
        Commands::Library(command) => command,
    };

    let config = Config::load().await?;
    let storage_path = cli
        .storage_path
        .unwrap_or_else(|| PathBuf::from(&config.storage.path));

    let storage = FilesystemStorage::new(&storage_path);
    storage.initialize().await?;
    tracing::debug!(path = %storage_path.display(), "opened library");

    let library: Books = Library::with_options(Arc::new(storage), config.library.options());

    match command {
        LibraryCommands::Add {
            title,
            author,
            cover,
            stage,
            notes,
            store_url,
            isbn,
        } => {
            let args = AddArgs {
                title,
                author,
                cover,
                stage,
                notes,
                store_url,
                isbn,
            };
            handle_add_command(args, &library, cli.dry_run).await
        }
        LibraryCommands::List { stage } => handle_list_command(stage, &library).await,
        LibraryCommands::Board => handle_board_command(&library).await,
        LibraryCommands::Show { book } => handle_show_command(book, &library).await,
        LibraryCommands::Search { query } => handle_search_command(query, &library).await,
        LibraryCommands::Move { book, stage, index } => {
            handle_move_command(book, stage, index, &library, cli.dry_run).await
        }
        LibraryCommands::Edit {
            book,
            title,
            author,
            cover,
            notes,
            store_url,
            isbn,
        } => {
            let patch = BookPatch {
                title,
                author,
                cover_url: cover,
                notes,
                store_url,
                isbn,
            };
            handle_edit_command(book, patch, &library, cli.dry_run).await
        }
        LibraryCommands::Reading { book } => {
            handle_reading_command(book, &library, cli.dry_run).await
        }
        LibraryCommands::Unread { book } => {
            handle_unread_command(book, &library, cli.dry_run).await
        }
        LibraryCommands::Remove { book } => {
            handle_remove_command(book, &library, cli.dry_run).await
        }
        LibraryCommands::Compact { stage } => {
            handle_compact_command(stage, &library, cli.dry_run).await
        }
        LibraryCommands::Export { output } => {
            handle_export_command(output, &library, cli.dry_run).await
        }
        LibraryCommands::Import {
            file,
            replace,
            force,
        } => handle_import_command(file, replace, force, &library, cli.dry_run).await,
    }
}
