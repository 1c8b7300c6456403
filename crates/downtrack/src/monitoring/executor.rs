use tracing::debug;

use super::prober::Prober;
use super::transition::{StatusTracker, TransitionReport};
use super::types::{CheckOutcome, Target};
use crate::error::JobError;

/// What a worker learned from one job
#[derive(Debug, Clone)]
pub struct JobReport {
    pub outcome: CheckOutcome,
    pub report: TransitionReport,
}

/// Executes one job: probe, then compare with the stored status and alert
pub struct MonitoringExecutor {
    prober: Prober,
    tracker: StatusTracker,
}

impl MonitoringExecutor {
    pub fn new(prober: Prober, tracker: StatusTracker) -> Self {
        Self { prober, tracker }
    }

    /// Check one target.
    ///
    /// `Err(JobError::ServiceDown)` signals a DOWN classification after the
    /// status has been handled; callers log it and keep going.
    pub async fn execute_check(&self, target: &Target) -> Result<JobReport, JobError> {
        let outcome = self.prober.probe(&target.url).await?;
        debug!(
            "Checked {} for {}: {} ({:?}, {}ms)",
            target.url, target.subscriber, outcome.status, outcome.status_code, outcome.latency_ms
        );

        let report = self.tracker.record(target, &outcome).await;

        if outcome.is_down() {
            return Err(JobError::ServiceDown {
                url: target.url.clone(),
                detail: outcome.detail.unwrap_or_default(),
                report,
            });
        }

        Ok(JobReport { outcome, report })
    }
}
