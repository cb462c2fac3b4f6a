//! Sync status state machine for stored items

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Pending remote mutation tracked on every stored item.
///
/// The integer encoding only exists at the store boundary
/// (see [`SyncStatus::to_db`] and [`SyncStatus::from_db`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Local state matches the remote
    Synced,
    /// Created locally, not yet pushed
    PendingCreate,
    /// Edited locally, not yet pushed
    PendingUpdate,
    /// Deleted locally; the row stays until a sync purges it
    PendingDelete,
}

/// Visibility phase of a stored item.
///
/// `Active -> PendingDelete -> Purged`; a purged item no longer exists in the
/// store, so only the first two phases are ever observed on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    PendingDelete,
}

/// What a sync pass does with a record in a given status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Nothing to push
    Keep,
    /// Push, then clear the pending flag
    MarkSynced,
    /// Push the delete, then remove the row
    Purge,
}

impl SyncStatus {
    /// Status after a local edit. Repeated edits overwrite, they never merge.
    pub const fn after_local_edit(self) -> Self {
        Self::PendingUpdate
    }

    /// Status after a local delete
    pub const fn after_local_delete(self) -> Self {
        Self::PendingDelete
    }

    /// Sync pass decision for this status
    pub const fn reconcile(self) -> Reconcile {
        match self {
            Self::Synced => Reconcile::Keep,
            Self::PendingCreate | Self::PendingUpdate => Reconcile::MarkSynced,
            Self::PendingDelete => Reconcile::Purge,
        }
    }

    pub const fn lifecycle(self) -> Lifecycle {
        match self {
            Self::PendingDelete => Lifecycle::PendingDelete,
            _ => Lifecycle::Active,
        }
    }

    pub const fn is_pending(self) -> bool {
        !matches!(self, Self::Synced)
    }

    /// Integer stored in the `sync_status` column
    pub const fn to_db(self) -> i64 {
        match self {
            Self::Synced => 0,
            Self::PendingCreate => 1,
            Self::PendingUpdate => 2,
            Self::PendingDelete => 3,
        }
    }

    /// Decode the `sync_status` column
    pub fn from_db(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Self::Synced),
            1 => Ok(Self::PendingCreate),
            2 => Ok(Self::PendingUpdate),
            3 => Ok(Self::PendingDelete),
            other => Err(Error::Database(format!("invalid sync status {other}"))),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::PendingCreate => "pending_create",
            Self::PendingUpdate => "pending_update",
            Self::PendingDelete => "pending_delete",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
