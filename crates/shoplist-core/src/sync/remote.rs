//! Remote endpoint used by the sync engine

use std::time::Duration;

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::models::{ItemId, ShoppingItem};

/// Remote side of a sync.
///
/// A sync attempt opens one session and then pushes each pending record.
/// Failures must be reported as [`Error::Network`] to be retried.
#[allow(async_fn_in_trait)]
pub trait RemoteClient {
    /// Reach the remote before any record is inspected
    async fn open_session(&self) -> Result<()>;

    /// Push a locally created item
    async fn push_create(&self, item: &ShoppingItem) -> Result<()>;

    /// Push a locally edited item
    async fn push_update(&self, item: &ShoppingItem) -> Result<()>;

    /// Push a local delete
    async fn push_delete(&self, id: &ItemId) -> Result<()>;
}

/// In-process stand-in for a sync server.
///
/// Each session waits `network_delay` on a tokio timer and then fails with
/// probability `failure_rate`. Record pushes always succeed and are only
/// logged.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRemote {
    network_delay: Duration,
    failure_rate: f64,
}

impl SimulatedRemote {
    pub fn new(network_delay: Duration, failure_rate: f64) -> Self {
        Self {
            network_delay,
            failure_rate,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.network_delay(), config.failure_rate)
    }

    /// A remote with no latency that never fails
    pub fn reliable() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }
}

impl Default for SimulatedRemote {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

impl RemoteClient for SimulatedRemote {
    async fn open_session(&self) -> Result<()> {
        if !self.network_delay.is_zero() {
            tokio::time::sleep(self.network_delay).await;
        }

        if rand::random::<f64>() < self.failure_rate {
            return Err(Error::Network("simulated remote unavailable".into()));
        }

        Ok(())
    }

    async fn push_create(&self, item: &ShoppingItem) -> Result<()> {
        tracing::debug!(id = %item.id, name = %item.name, "Pushed create to remote");
        Ok(())
    }

    async fn push_update(&self, item: &ShoppingItem) -> Result<()> {
        tracing::debug!(id = %item.id, name = %item.name, "Pushed update to remote");
        Ok(())
    }

    async fn push_delete(&self, id: &ItemId) -> Result<()> {
        tracing::debug!(%id, "Pushed delete to remote");
        Ok(())
    }
}
