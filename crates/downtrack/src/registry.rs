//! Read path into the subscriber registry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A verified subscriber and the URLs they asked to have watched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub targets: Vec<String>,
}

impl Subscriber {
    pub fn new(email: impl Into<String>, targets: Vec<String>) -> Self {
        Self { email: email.into(), targets }
    }
}

#[async_trait]
pub trait Registry: Send + Sync {
    /// Every verified subscriber with their targets.
    ///
    /// A failure here abandons the current cycle only.
    async fn list_verified_subscribers_with_targets(&self) -> Result<Vec<Subscriber>, RegistryError>;
}
