use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::dispatcher::{CheckDispatcher, CycleSummary};
use crate::error::CycleError;

/// Monitoring scheduler - runs one cycle at startup, then one per interval.
///
/// The wait for the next cycle starts only after the previous one has
/// drained, so cycles never overlap.
pub struct MonitoringScheduler {
    dispatcher: Arc<CheckDispatcher>,
    interval: Duration,
}

impl MonitoringScheduler {
    pub fn new(dispatcher: Arc<CheckDispatcher>, interval: Duration) -> Self {
        Self { dispatcher, interval }
    }

    /// Run a single cycle, logging instead of propagating failures
    pub async fn run_once(&self, cancel: &CancellationToken) -> Option<CycleSummary> {
        match self.dispatcher.run_cycle(cancel).await {
            Ok(summary) => Some(summary),
            Err(CycleError::Cancelled) => {
                info!("Check cycle interrupted by shutdown");
                None
            }
            Err(e) => {
                error!("Check cycle abandoned, retrying at next tick: {}", e);
                None
            }
        }
    }

    /// Loop until `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Running initial website check");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.run_once(&cancel).await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {
                    info!("Starting scheduled website check");
                }
            }
        }
        info!("Monitoring scheduler stopped");
    }

    /// Run the loop on its own task
    pub fn spawn(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}
