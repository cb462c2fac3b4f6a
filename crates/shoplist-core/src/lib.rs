//! shoplist-core - Core library for Shoplist
//!
//! This crate contains the shopping item models, the local libSQL store, the
//! query builder and the offline-first sync engine used by the `shoplist` CLI.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod services;
pub mod sync;
mod util;

pub use config::SyncConfig;
pub use error::{Error, Result};
pub use models::{ItemId, ShoppingItem, StoredItem, SyncStatus};
pub use query::{ItemFilter, ItemQuery, ItemSort};
pub use services::ShoppingService;
pub use sync::{SyncEngine, SyncReport};
