//! Last-observed status per (subscriber, target) pair.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::StoreError;
use crate::monitoring::types::MonitorStatus;

/// How long a status record survives without being rewritten
pub const STATUS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Build the composite key for a subscriber and one of their targets
pub fn status_key(subscriber: &str, url: &str) -> String {
    format!("status:{}:{}", subscriber, url)
}

/// Expiring key-value store holding the last classified status.
///
/// A missing key means the status is unknown. Writes are last-write-wins.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<MonitorStatus>, StoreError>;

    async fn set_with_expiry(
        &self,
        key: &str,
        status: MonitorStatus,
        ttl: Duration,
    ) -> Result<(), StoreError>;
}

/// In-process store with per-key expiry.
///
/// Expiry follows tokio's clock, so paused-time tests can age records.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    entries: Mutex<HashMap<String, (MonitorStatus, Instant)>>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records that have not yet expired
    pub fn live_records(&self) -> usize {
        let now = Instant::now();
        match self.entries.lock() {
            Ok(entries) => entries.values().filter(|(_, deadline)| *deadline > now).count(),
            Err(poisoned) => {
                poisoned.into_inner().values().filter(|(_, deadline)| *deadline > now).count()
            }
        }
    }
}

#[async_trait]
impl StatusStore for MemoryStatusStore {
    async fn get(&self, key: &str) -> Result<Option<MonitorStatus>, StoreError> {
        let mut entries =
            self.entries.lock().map_err(|e| StoreError::Backend(e.to_string()))?;
        match entries.get(key) {
            Some((status, deadline)) if *deadline > Instant::now() => Ok(Some(*status)),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        status: MonitorStatus,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut entries =
            self.entries.lock().map_err(|e| StoreError::Backend(e.to_string()))?;
        entries.insert(key.to_string(), (status, Instant::now() + ttl));
        Ok(())
    }
}
