use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Current time as a Unix timestamp
pub fn unix_now() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
}

/// Row in the `subscribers` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberRecord {
    pub email: String,
    pub verified: bool,
    pub created_at: i64,
    pub verified_at: Option<i64>,
}

/// Outcome of registering a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddTargetOutcome {
    /// Target stored; the subscriber still has to verify their address
    PendingVerification,
    /// Target stored for an already verified subscriber
    Added,
    /// The subscriber already watches this URL
    AlreadyExists,
}
