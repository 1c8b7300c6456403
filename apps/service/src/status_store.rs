use std::time::Duration;

use async_trait::async_trait;
use downtrack::{MonitorStatus, StatusStore, StoreError};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::debug;

/// Status records kept in Redis as plain `UP` / `DOWN` strings
#[derive(Clone)]
pub struct RedisStatusStore {
    connection: ConnectionManager,
}

impl RedisStatusStore {
    /// Connect to `url`; the manager reconnects on its own after drops
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let connection = ConnectionManager::new(client).await.map_err(backend)?;
        Ok(Self { connection })
    }
}

fn backend(e: redis::RedisError) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map a raw stored value back into a status
fn decode(key: &str, raw: Option<String>) -> Result<Option<MonitorStatus>, StoreError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<MonitorStatus>()
            .map(Some)
            .map_err(|_| StoreError::Corrupt { key: key.to_string(), value }),
    }
}

#[async_trait]
impl StatusStore for RedisStatusStore {
    async fn get(&self, key: &str) -> Result<Option<MonitorStatus>, StoreError> {
        let mut conn = self.connection.clone();
        let raw: Option<String> = conn.get(key).await.map_err(backend)?;
        debug!(key, value = ?raw, "status GET");
        decode(key, raw)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        status: MonitorStatus,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let seconds = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, status.as_str(), seconds).await.map_err(backend)?;
        debug!(key, status = %status, ttl_secs = seconds, "status SET");
        Ok(())
    }
}
