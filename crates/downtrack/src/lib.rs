//! Downtrack - periodic HTTPS uptime checking for subscribed users
//!
//! This library holds the checking engine: a scheduler that runs one check
//! cycle per interval, a bounded worker pool that probes every registered
//! target once per cycle, and a status tracker that compares each outcome
//! with the last stored status and sends an alert only when it changes.
//!
//! The registry of subscribers, the status store and the mail transport are
//! collaborators reached through the traits in [`registry`], [`store`] and
//! [`notifier`].

pub mod config;
pub mod error;
pub mod monitoring;
pub mod notifier;
pub mod registry;
pub mod store;

// Re-export main types
pub use config::CheckerSettings;
pub use error::{CycleError, JobError, NotifyError, RegistryError, StoreError, TargetError, TransportError};
pub use monitoring::{
    CheckDispatcher, CheckOutcome, Checker, CycleSummary, HttpChecker, JobReport, MonitorStatus,
    MonitoringExecutor, MonitoringScheduler, Prober, StatusTracker, Target, Transition,
    TransitionReport, validate_target,
};
pub use notifier::Notifier;
pub use registry::{Registry, Subscriber};
pub use store::{MemoryStatusStore, STATUS_TTL, StatusStore, status_key};

/// Re-exported so binaries can share the same cancellation primitive
pub use tokio_util::sync::CancellationToken;
