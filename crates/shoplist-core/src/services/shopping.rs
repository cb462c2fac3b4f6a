//! Shopping list service shared by clients.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::db::{Database, ItemRepository, LibSqlItemRepository, PendingSummary};
use crate::models::{ItemId, ShoppingItem, StoredItem};
use crate::query::{ItemFilter, ItemQuery, ItemSort};
use crate::sync::{RemoteClient, SimulatedRemote, SyncEngine, SyncReport};
use crate::{Error, Result};

/// Thread-safe entry point for item operations and sync.
///
/// All store access goes through one mutex, so mutations against a store are
/// serialized. Clones share the same store and engine.
pub struct ShoppingService<R = SimulatedRemote> {
    db: Arc<Mutex<Database>>,
    engine: Arc<SyncEngine<R>>,
}

impl<R> Clone for ShoppingService<R> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            engine: Arc::clone(&self.engine),
        }
    }
}

impl ShoppingService<SimulatedRemote> {
    /// Open a service backed by the database file at `db_path`.
    pub async fn open_path(db_path: impl Into<PathBuf>, config: &SyncConfig) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&db_path).await?;
        Ok(Self::with_engine(db, SyncEngine::from_config(config)))
    }

    /// Open an in-memory service (primarily for tests).
    pub async fn open_in_memory(config: &SyncConfig) -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::with_engine(db, SyncEngine::from_config(config)))
    }
}

impl<R: RemoteClient> ShoppingService<R> {
    pub fn with_engine(db: Database, engine: SyncEngine<R>) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            engine: Arc::new(engine),
        }
    }

    /// Live items matching `filter` and `search_text`, ordered by `sort`.
    pub async fn fetch_items(
        &self,
        filter: ItemFilter,
        search_text: &str,
        sort: ItemSort,
    ) -> Result<Vec<ShoppingItem>> {
        let query = ItemQuery::new(filter, search_text, sort);
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection())
            .fetch(&query)
            .await
    }

    /// Store a new item as pending creation.
    pub async fn add_item(&self, item: &ShoppingItem) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection())
            .insert(item)
            .await?;
        tracing::debug!(id = %item.id, name = %item.name, "Added item");
        Ok(())
    }

    /// Overwrite the editable fields of a stored item.
    pub async fn update_item(&self, item: &ShoppingItem) -> Result<ShoppingItem> {
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection())
            .update(item)
            .await
    }

    /// Mark a stored item for deletion on the next sync.
    pub async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection())
            .delete(id)
            .await?;
        tracing::debug!(%id, "Deleted item");
        Ok(())
    }

    /// Flip the bought flag of a stored item.
    pub async fn toggle_bought(&self, id: &ItemId) -> Result<ShoppingItem> {
        let db = self.db.lock().await;
        let repo = LibSqlItemRepository::new(db.connection());
        let stored = repo
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut item = stored.to_domain();
        item.is_bought = !item.is_bought;
        repo.update(&item).await
    }

    /// Fetch a record in any sync state.
    pub async fn get_item(&self, id: &ItemId) -> Result<Option<StoredItem>> {
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection()).get(id).await
    }

    /// Counts of records waiting to be synced.
    pub async fn pending_changes(&self) -> Result<PendingSummary> {
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection())
            .pending_summary()
            .await
    }

    /// Ids of live items starting with `prefix`.
    pub async fn find_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let db = self.db.lock().await;
        LibSqlItemRepository::new(db.connection())
            .find_ids_by_prefix(prefix, limit)
            .await
    }

    /// Push pending changes through the sync engine.
    ///
    /// `Ok(None)` means `cancel` stopped a pending retry.
    pub async fn sync_with_remote(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<SyncReport>> {
        self.engine.sync(&self.db, cancel).await
    }

    pub fn engine(&self) -> &SyncEngine<R> {
        &self.engine
    }
}
