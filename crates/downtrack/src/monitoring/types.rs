use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::status_key;

/// Status of a monitored target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MonitorStatus {
    Up,
    Down,
    /// No record for the target, either never checked or expired
    Unknown,
}

impl MonitorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorStatus::Up => "UP",
            MonitorStatus::Down => "DOWN",
            MonitorStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the values written to the status store
impl FromStr for MonitorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(MonitorStatus::Up),
            "DOWN" => Ok(MonitorStatus::Down),
            other => Err(format!("unrecognised status {other:?}")),
        }
    }
}

/// A URL watched on behalf of one subscriber
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub subscriber: String,
    pub url: String,
}

impl Target {
    pub fn new(subscriber: impl Into<String>, url: impl Into<String>) -> Self {
        Self { subscriber: subscriber.into(), url: url.into() }
    }

    /// Composite key of this target in the status store
    pub fn status_key(&self) -> String {
        status_key(&self.subscriber, &self.url)
    }
}

/// Unit of work on the queue, consumed by exactly one worker
#[derive(Debug, Clone)]
pub struct Job {
    pub seq: usize,
    pub target: Target,
}

/// Classified result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub status: MonitorStatus,
    /// Why the target was classified DOWN
    pub detail: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub status_code: Option<u16>,
    pub latency_ms: u64,
}

impl CheckOutcome {
    pub fn up(status_code: u16, latency_ms: u64) -> Self {
        Self {
            status: MonitorStatus::Up,
            detail: None,
            observed_at: Utc::now(),
            status_code: Some(status_code),
            latency_ms,
        }
    }

    pub fn down(detail: impl Into<String>, status_code: Option<u16>, latency_ms: u64) -> Self {
        Self {
            status: MonitorStatus::Down,
            detail: Some(detail.into()),
            observed_at: Utc::now(),
            status_code,
            latency_ms,
        }
    }

    pub fn is_down(&self) -> bool {
        self.status == MonitorStatus::Down
    }
}
