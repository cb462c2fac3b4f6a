//! Offline-first sync of pending local changes
//!
//! A sync attempt reaches the remote first, then walks every stored record and
//! pushes whatever its status says is pending. All resulting store writes are
//! committed in a single transaction at the end of the pass. Whole attempts
//! are retried with exponential backoff when the remote is unreachable.

mod remote;
mod retry;

pub use remote::{RemoteClient, SimulatedRemote};
pub use retry::{retry_with_backoff, RetryPolicy};

use libsql::Connection;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::SyncConfig;
use crate::db::{Database, ItemRepository, LibSqlItemRepository, SyncWrite};
use crate::error::Result;
use crate::models::{Reconcile, SyncStatus};

/// Outcome of a successful sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// Records pushed as creates
    pub created: usize,
    /// Records pushed as updates
    pub updated: usize,
    /// Records pushed as deletes and purged locally
    pub deleted: usize,
}

impl SyncReport {
    /// Total records pushed
    pub const fn pushed(&self) -> usize {
        self.created + self.updated + self.deleted
    }
}

/// Pushes pending records to a [`RemoteClient`]
pub struct SyncEngine<R = SimulatedRemote> {
    remote: R,
    policy: RetryPolicy,
}

impl SyncEngine<SimulatedRemote> {
    /// Engine over a simulated remote configured from `config`
    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(SimulatedRemote::from_config(config), config.retry_policy())
    }
}

impl<R: RemoteClient> SyncEngine<R> {
    pub const fn new(remote: R, policy: RetryPolicy) -> Self {
        Self { remote, policy }
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sync the store, retrying remote failures per the engine's policy.
    ///
    /// Returns `Ok(None)` when `cancel` fires during a backoff wait; the
    /// pending retry never runs and no outcome is reported. The store lock is
    /// only held for the record pass, never across the remote handshake or a
    /// backoff wait.
    pub async fn sync(
        &self,
        db: &Mutex<Database>,
        cancel: &CancellationToken,
    ) -> Result<Option<SyncReport>> {
        let outcome = retry_with_backoff(self.policy, cancel, |attempt| async move {
            self.remote.open_session().await?;
            let db = db.lock().await;
            let report = self.push_pending(db.connection()).await?;
            Ok(SyncReport { attempts: attempt, ..report })
        })
        .await?;

        let Some(report) = outcome else {
            return Ok(None);
        };

        tracing::info!(
            attempts = report.attempts,
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            "Sync completed"
        );
        Ok(Some(report))
    }

    /// One pass over every stored record, committed as one transaction.
    ///
    /// On commit failure nothing is persisted and every record keeps its
    /// pending status.
    pub async fn push_pending(&self, conn: &Connection) -> Result<SyncReport> {
        let repo = LibSqlItemRepository::new(conn);
        let records = repo.list_all().await?;

        let mut report = SyncReport::default();
        let mut writes = Vec::new();

        for record in &records {
            match record.sync_status.reconcile() {
                Reconcile::Keep => {}
                Reconcile::MarkSynced => {
                    if record.sync_status == SyncStatus::PendingCreate {
                        self.remote.push_create(&record.item).await?;
                        report.created += 1;
                    } else {
                        self.remote.push_update(&record.item).await?;
                        report.updated += 1;
                    }
                    writes.push(SyncWrite::MarkSynced(record.item.id));
                }
                Reconcile::Purge => {
                    self.remote.push_delete(&record.item.id).await?;
                    report.deleted += 1;
                    writes.push(SyncWrite::Purge(record.item.id));
                }
            }
        }

        repo.apply_sync(&writes).await?;
        Ok(report)
    }
}
