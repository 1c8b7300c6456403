/// Subscriber registry storage
///
/// Holds subscribers and the URLs they asked to have watched, in a local
/// libsql database.

pub mod migrations;
pub mod models;
pub mod repository;

pub use models::AddTargetOutcome;
pub use repository::SubscriberRepository;

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
