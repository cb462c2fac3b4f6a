//! Data models for Shoplist

mod item;
mod sync_status;

pub use item::{ItemId, ShoppingItem, StoredItem};
pub use sync_status::{Lifecycle, Reconcile, SyncStatus};
