//! Status comparison and alerting on transitions.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::alert::{down_alert, recovered_alert};
use super::types::{CheckOutcome, MonitorStatus, Target};
use crate::notifier::Notifier;
use crate::store::{STATUS_TTL, StatusStore};

/// Change between the stored status and a fresh outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// UNKNOWN -> UP, recorded silently
    Baseline,
    /// UNKNOWN or UP -> DOWN
    WentDown,
    /// DOWN -> UP
    Recovered,
    StillUp,
    StillDown,
}

impl Transition {
    pub fn between(prior: MonitorStatus, current: MonitorStatus) -> Self {
        match (prior, current) {
            (MonitorStatus::Up, MonitorStatus::Up) => Transition::StillUp,
            (MonitorStatus::Down, MonitorStatus::Down) => Transition::StillDown,
            (MonitorStatus::Down, MonitorStatus::Up) => Transition::Recovered,
            (MonitorStatus::Unknown, MonitorStatus::Up) => Transition::Baseline,
            // First-seen failures alert immediately, with no confirming second probe
            (_, MonitorStatus::Down) => Transition::WentDown,
            // A probe never produces UNKNOWN; keep whatever is stored
            (MonitorStatus::Up, MonitorStatus::Unknown) => Transition::StillUp,
            (_, MonitorStatus::Unknown) => Transition::StillDown,
        }
    }

    /// Whether the new status has to be written
    pub fn is_change(&self) -> bool {
        !matches!(self, Transition::StillUp | Transition::StillDown)
    }
}

/// What the tracker did for one outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub prior: MonitorStatus,
    pub transition: Transition,
    pub persisted: bool,
    pub notified: bool,
}

/// Compares outcomes with the stored status and alerts on changes
pub struct StatusTracker {
    store: Arc<dyn StatusStore>,
    notifier: Arc<dyn Notifier>,
    ttl: Duration,
}

impl StatusTracker {
    pub fn new(store: Arc<dyn StatusStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier, ttl: STATUS_TTL }
    }

    /// Override the record lifetime (defaults to [`STATUS_TTL`])
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn prior_status(&self, target: &Target, key: &str) -> MonitorStatus {
        match self.store.get(key).await {
            Ok(Some(status)) => status,
            Ok(None) => MonitorStatus::Unknown,
            Err(e) => {
                warn!(
                    subscriber = %target.subscriber,
                    url = %target.url,
                    error = %e,
                    kind = "store_read",
                    "Status lookup failed, treating prior status as unknown"
                );
                MonitorStatus::Unknown
            }
        }
    }

    /// Apply `outcome` for `target`: persist on change, alert on UP<->DOWN.
    pub async fn record(&self, target: &Target, outcome: &CheckOutcome) -> TransitionReport {
        let key = target.status_key();
        let prior = self.prior_status(target, &key).await;
        let transition = Transition::between(prior, outcome.status);

        let mut report = TransitionReport { prior, transition, persisted: false, notified: false };

        if !transition.is_change() {
            if transition == Transition::StillDown {
                info!(
                    "Service {} still DOWN for {} (no repeat email)",
                    target.url, target.subscriber
                );
            } else {
                debug!("Service {} still UP for {}", target.url, target.subscriber);
            }
            return report;
        }

        match self.store.set_with_expiry(&key, outcome.status, self.ttl).await {
            Ok(()) => report.persisted = true,
            Err(e) => error!(
                subscriber = %target.subscriber,
                url = %target.url,
                error = %e,
                kind = "store_write",
                "Failed to persist status {}", outcome.status
            ),
        }

        let body = match transition {
            Transition::WentDown => {
                let detail = outcome.detail.as_deref().unwrap_or("unknown error");
                info!(
                    "🔴 Service {} is DOWN for {} (was {}). Error: {}",
                    target.url, target.subscriber, prior, detail
                );
                Some(down_alert(&target.url, detail, outcome.observed_at))
            }
            Transition::Recovered => {
                info!("🟢 Service {} RECOVERED for {}", target.url, target.subscriber);
                Some(recovered_alert(&target.url, outcome.observed_at))
            }
            _ => {
                info!("Service {} is UP for {} (baseline recorded)", target.url, target.subscriber);
                None
            }
        };

        if let Some(body) = body {
            match self.notifier.send(&target.subscriber, &body).await {
                Ok(()) => report.notified = true,
                Err(e) => error!(
                    subscriber = %target.subscriber,
                    url = %target.url,
                    error = %e,
                    kind = "notify",
                    at = %outcome.observed_at,
                    "Failed to send {:?} alert", transition
                ),
            }
        }

        report
    }
}
