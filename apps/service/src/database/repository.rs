use anyhow::Result;
use async_trait::async_trait;
use downtrack::{Registry, RegistryError, Subscriber, validate_target};
use libsql::params;

use super::models::{AddTargetOutcome, SubscriberRecord, unix_now};
use crate::pool::{LibsqlManager, LibsqlPool};

/// libsql-backed subscriber registry
pub struct SubscriberRepository {
    pool: LibsqlPool,
}

impl SubscriberRepository {
    pub fn new_from_pool(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> Result<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }

    async fn verified_targets(&self) -> Result<Vec<Subscriber>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT s.email, t.url FROM subscribers s \
                 JOIN targets t ON t.email = s.email \
                 WHERE s.verified = 1 \
                 ORDER BY s.email, t.id",
                (),
            )
            .await?;

        let mut subscribers: Vec<Subscriber> = Vec::new();
        while let Some(row) = rows.next().await? {
            let email: String = row.get(0)?;
            let url: String = row.get(1)?;
            match subscribers.last_mut() {
                Some(last) if last.email == email => last.targets.push(url),
                _ => subscribers.push(Subscriber::new(email, vec![url])),
            }
        }

        Ok(subscribers)
    }

    /// Register `url` for `email`, creating an unverified subscriber if needed
    pub async fn add_target(&self, email: &str, url: &str) -> Result<AddTargetOutcome> {
        validate_target(url)?;
        let email = email.trim();
        let url = url.trim();
        let now = unix_now();
        let conn = self.get_conn().await?;

        conn.execute(
            "INSERT OR IGNORE INTO subscribers (email, verified, created_at) VALUES (?, 0, ?)",
            params![email, now],
        )
        .await?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO targets (email, url, created_at) VALUES (?, ?, ?)",
                params![email, url, now],
            )
            .await?;
        drop(conn);

        if inserted == 0 {
            return Ok(AddTargetOutcome::AlreadyExists);
        }

        if self.is_verified(email).await? {
            Ok(AddTargetOutcome::Added)
        } else {
            Ok(AddTargetOutcome::PendingVerification)
        }
    }

    /// Stop watching `url` for `email`; returns whether anything was removed
    pub async fn remove_target(&self, email: &str, url: &str) -> Result<bool> {
        let conn = self.get_conn().await?;
        let removed = conn
            .execute(
                "DELETE FROM targets WHERE email = ? AND url = ?",
                params![email.trim(), url.trim()],
            )
            .await?;
        Ok(removed > 0)
    }

    /// Mark a subscriber verified; returns false for unknown addresses
    pub async fn verify_subscriber(&self, email: &str) -> Result<bool> {
        let conn = self.get_conn().await?;
        let updated = conn
            .execute(
                "UPDATE subscribers SET verified = 1, verified_at = ? WHERE email = ?",
                params![unix_now(), email.trim()],
            )
            .await?;
        Ok(updated > 0)
    }

    pub async fn is_verified(&self, email: &str) -> Result<bool> {
        Ok(self.get_subscriber(email).await?.is_some_and(|s| s.verified))
    }

    pub async fn target_exists(&self, email: &str, url: &str) -> Result<bool> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM targets WHERE email = ? AND url = ?",
                params![email.trim(), url.trim()],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn get_subscriber(&self, email: &str) -> Result<Option<SubscriberRecord>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT email, verified, created_at, verified_at FROM subscribers WHERE email = ?",
                params![email.trim()],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(SubscriberRecord {
                email: row.get(0)?,
                verified: row.get::<i64>(1)? != 0,
                created_at: row.get(2)?,
                verified_at: row.get(3)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// URLs watched for one subscriber, oldest first
    pub async fn list_targets(&self, email: &str) -> Result<Vec<String>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query("SELECT url FROM targets WHERE email = ? ORDER BY id", params![email.trim()])
            .await?;

        let mut urls = Vec::new();
        while let Some(row) = rows.next().await? {
            urls.push(row.get::<String>(0)?);
        }
        Ok(urls)
    }
}

#[async_trait]
impl Registry for SubscriberRepository {
    async fn list_verified_subscribers_with_targets(&self) -> Result<Vec<Subscriber>, RegistryError> {
        self.verified_targets().await.map_err(|e| RegistryError::Backend(format!("{e:#}")))
    }
}
