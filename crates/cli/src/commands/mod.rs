pub mod backup;
pub mod board;
pub mod books;
pub mod config;

use tsundoku_domain::Library;
use tsundoku_storage::FilesystemStorage;

/// The library every command runs against.
pub type Books = Library<FilesystemStorage>;

pub use backup::{handle_export_command, handle_import_command};
pub use board::{
    handle_board_command, handle_compact_command, handle_list_command, handle_move_command,
    handle_search_command,
};
pub use books::{
    AddArgs, handle_add_command, handle_edit_command, handle_reading_command,
    handle_remove_command, handle_show_command, handle_unread_command,
};
pub use config::handle_config_command;
