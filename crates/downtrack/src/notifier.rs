use async_trait::async_trait;

use crate::error::NotifyError;

/// Delivers an HTML message to a subscriber.
///
/// Delivery is best-effort: callers log failures and move on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, html_body: &str) -> Result<(), NotifyError>;
}
