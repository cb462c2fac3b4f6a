use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] shoplist_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Item name cannot be empty")]
    EmptyName,
    #[error("Item ID cannot be empty")]
    EmptyItemId,
    #[error("Item not found for id/prefix: {0}")]
    ItemNotFound(String),
    #[error("{0}")]
    AmbiguousItemId(String),
    #[error("Nothing to change. Pass --name, --quantity, --note or --clear-note.")]
    NothingToEdit,
    #[error("Could not resolve a data directory. Pass --db-path or set SHOPLIST_DB_PATH.")]
    NoDataDir,
}
