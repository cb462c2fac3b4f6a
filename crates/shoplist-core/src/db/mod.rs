//! Local item store

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{ItemRepository, LibSqlItemRepository, PendingSummary, SyncWrite};
