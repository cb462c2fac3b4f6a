//! Shopping item repository implementation

use crate::error::{Error, Result};
use crate::models::{ItemId, ShoppingItem, StoredItem, SyncStatus};
use crate::query::{ItemQuery, ITEM_COLUMNS};
use crate::util::{fold_case, now_millis};
use libsql::params::Params;
use libsql::{Connection, Value};

/// A store mutation produced by a sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncWrite {
    /// Clear the pending flag
    MarkSynced(ItemId),
    /// Remove the row
    Purge(ItemId),
}

/// Number of records waiting for each kind of remote push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingSummary {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl PendingSummary {
    pub const fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

/// Trait for item storage operations (async)
#[allow(async_fn_in_trait)]
pub trait ItemRepository {
    /// Live items matching a list query
    async fn fetch(&self, query: &ItemQuery) -> Result<Vec<ShoppingItem>>;

    /// Get a stored record by ID, whatever its sync status
    async fn get(&self, id: &ItemId) -> Result<Option<StoredItem>>;

    /// Insert a new item as pending create
    async fn insert(&self, item: &ShoppingItem) -> Result<()>;

    /// Overwrite a live item's mutable fields and mark it pending update
    async fn update(&self, item: &ShoppingItem) -> Result<ShoppingItem>;

    /// Soft delete a live item
    async fn delete(&self, id: &ItemId) -> Result<()>;

    /// Every stored record, oldest first
    async fn list_all(&self) -> Result<Vec<StoredItem>>;

    /// Apply a sync pass's writes in one transaction
    async fn apply_sync(&self, writes: &[SyncWrite]) -> Result<()>;

    /// Count records per pending status
    async fn pending_summary(&self) -> Result<PendingSummary>;

    /// Live item IDs starting with `prefix`
    async fn find_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>>;
}

/// libSQL implementation of `ItemRepository`
pub struct LibSqlItemRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlItemRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a stored item from a row selected with `ITEM_COLUMNS`
    fn parse_stored_item(row: &libsql::Row) -> Result<StoredItem> {
        let id: String = row.get(0)?;
        let id = id
            .parse()
            .map_err(|_| Error::Database(format!("invalid item id '{id}'")))?;
        Ok(StoredItem {
            item: ShoppingItem {
                id,
                name: row.get(1)?,
                quantity: row.get(2)?,
                note: row.get::<Option<String>>(3)?,
                is_bought: row.get::<i64>(4)? != 0,
                created_at: row.get(5)?,
                updated_at: row.get(6)?,
            },
            sync_status: SyncStatus::from_db(row.get(7)?)?,
        })
    }

    async fn query_items(&self, sql: &str, params: Vec<Value>) -> Result<Vec<StoredItem>> {
        let mut rows = self.conn.query(sql, Params::Positional(params)).await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(Self::parse_stored_item(&row)?);
        }
        Ok(items)
    }

    /// Stored record with the given id in any sync state
    async fn get_existing(&self, id: &ItemId) -> Result<StoredItem> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn set_status(&self, id: &ItemId, status: SyncStatus) -> Result<u64> {
        Ok(self
            .conn
            .execute(
                "UPDATE shopping_items SET sync_status = ? WHERE id = ?",
                libsql::params![status.to_db(), id.as_str()],
            )
            .await?)
    }

    async fn apply_writes(&self, writes: &[SyncWrite]) -> Result<()> {
        for write in writes {
            match write {
                SyncWrite::MarkSynced(id) => {
                    self.set_status(id, SyncStatus::Synced).await?;
                }
                SyncWrite::Purge(id) => {
                    self.conn
                        .execute(
                            "DELETE FROM shopping_items WHERE id = ?",
                            libsql::params![id.as_str()],
                        )
                        .await?;
                }
            }
        }
        Ok(())
    }
}

fn note_value(note: Option<&str>) -> Value {
    note.map_or(Value::Null, |note| Value::Text(note.to_string()))
}

fn folded_note(note: Option<&str>) -> String {
    note.map(fold_case).unwrap_or_default()
}

impl ItemRepository for LibSqlItemRepository<'_> {
    async fn fetch(&self, query: &ItemQuery) -> Result<Vec<ShoppingItem>> {
        let (sql, params) = query.to_sql();
        let stored = self.query_items(&sql, params).await?;
        Ok(stored.iter().map(StoredItem::to_domain).collect())
    }

    async fn get(&self, id: &ItemId) -> Result<Option<StoredItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM shopping_items WHERE id = ?");
        let mut items = self
            .query_items(&sql, vec![Value::Text(id.as_str())])
            .await?;
        Ok(items.pop())
    }

    async fn insert(&self, item: &ShoppingItem) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO shopping_items (id, name, quantity, note, is_bought, created_at, updated_at,
                     sync_status, name_folded, note_folded)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                libsql::params![
                    item.id.as_str(),
                    item.name.as_str(),
                    item.quantity,
                    note_value(item.note.as_deref()),
                    i64::from(item.is_bought),
                    item.created_at,
                    item.updated_at,
                    SyncStatus::PendingCreate.to_db(),
                    fold_case(&item.name),
                    folded_note(item.note.as_deref())
                ],
            )
            .await?;
        Ok(())
    }

    async fn update(&self, item: &ShoppingItem) -> Result<ShoppingItem> {
        let existing = self.get_existing(&item.id).await?;
        let status = existing.sync_status.after_local_edit();
        let now = now_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE shopping_items
                 SET name = ?, quantity = ?, note = ?, is_bought = ?, updated_at = ?, sync_status = ?,
                     name_folded = ?, note_folded = ?
                 WHERE id = ?",
                libsql::params![
                    item.name.as_str(),
                    item.quantity,
                    note_value(item.note.as_deref()),
                    i64::from(item.is_bought),
                    now,
                    status.to_db(),
                    fold_case(&item.name),
                    folded_note(item.note.as_deref()),
                    item.id.as_str()
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(item.id.to_string()));
        }

        Ok(ShoppingItem {
            updated_at: now,
            created_at: existing.item.created_at,
            ..item.clone()
        })
    }

    async fn delete(&self, id: &ItemId) -> Result<()> {
        let existing = self.get_existing(id).await?;
        let rows = self
            .set_status(id, existing.sync_status.after_local_delete())
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<StoredItem>> {
        let sql =
            format!("SELECT {ITEM_COLUMNS} FROM shopping_items ORDER BY created_at ASC, id ASC");
        self.query_items(&sql, Vec::new()).await
    }

    async fn apply_sync(&self, writes: &[SyncWrite]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        if let Err(e) = self.apply_writes(writes).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e);
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn pending_summary(&self) -> Result<PendingSummary> {
        let mut rows = self
            .conn
            .query(
                "SELECT sync_status, COUNT(*) FROM shopping_items
                 WHERE sync_status != ?
                 GROUP BY sync_status",
                libsql::params![SyncStatus::Synced.to_db()],
            )
            .await?;

        let mut summary = PendingSummary::default();
        while let Some(row) = rows.next().await? {
            let count = usize::try_from(row.get::<i64>(1)?).unwrap_or(0);
            match SyncStatus::from_db(row.get(0)?)? {
                SyncStatus::PendingCreate => summary.creates = count,
                SyncStatus::PendingUpdate => summary.updates = count,
                SyncStatus::PendingDelete => summary.deletes = count,
                SyncStatus::Synced => {}
            }
        }
        Ok(summary)
    }

    async fn find_ids_by_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<String>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut rows = self
            .conn
            .query(
                "SELECT id FROM shopping_items
                 WHERE id LIKE ? AND sync_status != ?
                 ORDER BY id ASC
                 LIMIT ?",
                libsql::params![
                    format!("{}%", prefix.replace(['%', '_'], "")),
                    SyncStatus::PendingDelete.to_db(),
                    limit
                ],
            )
            .await?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(row.get::<String>(0)?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::query::{ItemFilter, ItemSort};
    use pretty_assertions::assert_eq;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn item_at(name: &str, created_at: i64) -> ShoppingItem {
        let mut item = ShoppingItem::new(name, 1);
        item.created_at = created_at;
        item.updated_at = created_at;
        item
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let item = ShoppingItem::new("Milk", 2).with_note("semi-skimmed");
        repo.insert(&item).await.unwrap();

        let stored = repo.get(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.item, item);
        assert_eq!(stored.sync_status, SyncStatus::PendingCreate);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_missing_returns_none() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());
        assert!(repo.get(&ItemId::new()).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_insert_fails() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let item = ShoppingItem::new("Milk", 1);
        repo.insert(&item).await.unwrap();
        let error = repo.insert(&item).await.unwrap_err();
        assert!(error.is_storage());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_overwrites_and_marks_pending_update() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let item = item_at("Milk", 1_000);
        repo.insert(&item).await.unwrap();

        let mut edited = item.clone();
        edited.name = "Oat milk".to_string();
        edited.quantity = 3;
        edited.note = Some("barista".to_string());
        edited.is_bought = true;
        let updated = repo.update(&edited).await.unwrap();
        assert!(updated.updated_at > item.updated_at);
        assert_eq!(updated.created_at, 1_000);

        let stored = repo.get(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::PendingUpdate);
        assert_eq!(stored.item, updated);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_missing_is_not_found() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let error = repo.update(&ShoppingItem::new("Ghost", 1)).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_is_soft() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let item = ShoppingItem::new("Bread", 1);
        repo.insert(&item).await.unwrap();
        repo.delete(&item.id).await.unwrap();

        let stored = repo.get(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::PendingDelete);
        assert!(repo.fetch(&ItemQuery::default()).await.unwrap().is_empty());

        assert!(matches!(
            repo.delete(&ItemId::new()).await.unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_soft_deleted_record_can_still_be_edited_or_deleted() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let item = ShoppingItem::new("Bread", 1);
        repo.insert(&item).await.unwrap();
        repo.delete(&item.id).await.unwrap();

        // Deleting again keeps the pending delete
        repo.delete(&item.id).await.unwrap();
        let stored = repo.get(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::PendingDelete);

        // An edit overwrites the pending delete with a pending update
        let edited = ShoppingItem {
            quantity: 5,
            ..item.clone()
        };
        let updated = repo.update(&edited).await.unwrap();
        assert_eq!(updated.quantity, 5);
        let stored = repo.get(&item.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::PendingUpdate);
        assert_eq!(repo.fetch(&ItemQuery::default()).await.unwrap(), vec![updated]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_filter_and_search() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let mut milk = item_at("Milk", 1);
        milk.is_bought = true;
        let eggs = item_at("Eggs", 2).with_note("free range, from the MILKman");
        let bread = item_at("Bread", 3);
        for item in [&milk, &eggs, &bread] {
            repo.insert(item).await.unwrap();
        }

        let bought = repo
            .fetch(&ItemQuery::new(ItemFilter::Bought, "", ItemSort::CreatedAtAsc))
            .await
            .unwrap();
        assert_eq!(bought, vec![milk.clone()]);

        let not_bought = repo
            .fetch(&ItemQuery::new(ItemFilter::NotBought, "", ItemSort::CreatedAtAsc))
            .await
            .unwrap();
        assert_eq!(not_bought, vec![eggs.clone(), bread]);

        let search = repo
            .fetch(&ItemQuery::new(ItemFilter::All, "milk", ItemSort::CreatedAtAsc))
            .await
            .unwrap();
        assert_eq!(search, vec![milk, eggs]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_folds_non_ascii_case() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let apples = item_at("Äpfel", 1).with_note("Crème Brûlée");
        let bread = item_at("Brot", 2);
        repo.insert(&apples).await.unwrap();
        repo.insert(&bread).await.unwrap();

        for needle in ["äpfel", "ÄPFEL", "CRÈME", "brûlée"] {
            let found = repo
                .fetch(&ItemQuery::new(ItemFilter::All, needle, ItemSort::CreatedAtAsc))
                .await
                .unwrap();
            assert_eq!(found, vec![apples.clone()], "search for {needle:?}");
        }

        // Folded copies follow edits
        let renamed = ShoppingItem {
            name: "Öl".to_string(),
            note: None,
            ..bread.clone()
        };
        repo.update(&renamed).await.unwrap();
        let found = repo
            .fetch(&ItemQuery::new(ItemFilter::All, "öL", ItemSort::CreatedAtAsc))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, bread.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_search_treats_wildcards_literally() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        repo.insert(&ShoppingItem::new("Coffee", 1).with_note("50% off"))
            .await
            .unwrap();
        repo.insert(&ShoppingItem::new("Tea", 1).with_note("500 g"))
            .await
            .unwrap();

        let results = repo
            .fetch(&ItemQuery::new(ItemFilter::All, "50%", ItemSort::default()))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Coffee");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_apply_sync_marks_and_purges() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let keep = ShoppingItem::new("Apples", 6);
        let gone = ShoppingItem::new("Pears", 2);
        repo.insert(&keep).await.unwrap();
        repo.insert(&gone).await.unwrap();
        repo.delete(&gone.id).await.unwrap();

        repo.apply_sync(&[SyncWrite::MarkSynced(keep.id), SyncWrite::Purge(gone.id)])
            .await
            .unwrap();

        let stored = repo.get(&keep.id).await.unwrap().unwrap();
        assert_eq!(stored.sync_status, SyncStatus::Synced);
        assert!(repo.get(&gone.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_pending_summary_counts_statuses() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let a = ShoppingItem::new("A", 1);
        let b = ShoppingItem::new("B", 1);
        let c = ShoppingItem::new("C", 1);
        for item in [&a, &b, &c] {
            repo.insert(item).await.unwrap();
        }
        repo.update(&b).await.unwrap();
        repo.delete(&c.id).await.unwrap();

        let summary = repo.pending_summary().await.unwrap();
        assert_eq!(
            summary,
            PendingSummary {
                creates: 1,
                updates: 1,
                deletes: 1,
            }
        );
        assert_eq!(summary.total(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_find_ids_by_prefix() {
        let db = setup().await;
        let repo = LibSqlItemRepository::new(db.connection());

        let item = ShoppingItem::new("Rice", 1);
        repo.insert(&item).await.unwrap();
        let id = item.id.to_string();

        let found = repo.find_ids_by_prefix(&id[..8], 3).await.unwrap();
        assert_eq!(found, vec![id.clone()]);

        repo.delete(&item.id).await.unwrap();
        assert!(repo.find_ids_by_prefix(&id[..8], 3).await.unwrap().is_empty());
    }
}
