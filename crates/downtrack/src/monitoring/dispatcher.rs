//! Per-cycle fan-out over a bounded queue and a fixed worker pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::executor::{JobReport, MonitoringExecutor};
use super::transition::{Transition, TransitionReport};
use super::types::{Job, Target};
use crate::config::CheckerSettings;
use crate::error::{CycleError, JobError};
use crate::registry::Registry;

/// Counters for one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Jobs placed on the queue
    pub enqueued: usize,
    /// Jobs a worker finished, whatever the outcome
    pub completed: usize,
    pub up: usize,
    pub down: usize,
    /// Targets rejected before probing
    pub invalid: usize,
    pub transitions: usize,
    pub alerts_sent: usize,
    /// Workers that died mid-cycle; the job each held is lost
    pub lost_workers: usize,
    pub elapsed: Duration,
}

impl CycleSummary {
    fn record(&mut self, result: &Result<JobReport, JobError>) {
        self.completed += 1;
        match result {
            Ok(job) => {
                self.up += 1;
                self.count_report(&job.report);
            }
            Err(JobError::ServiceDown { report, .. }) => {
                self.down += 1;
                self.count_report(report);
            }
            Err(JobError::InvalidTarget(_)) => self.invalid += 1,
        }
    }

    fn count_report(&mut self, report: &TransitionReport) {
        if report.transition.is_change() {
            self.transitions += 1;
        }
        if report.notified {
            self.alerts_sent += 1;
        }
    }

    fn merge(&mut self, other: CycleSummary) {
        self.completed += other.completed;
        self.up += other.up;
        self.down += other.down;
        self.invalid += other.invalid;
        self.transitions += other.transitions;
        self.alerts_sent += other.alerts_sent;
    }
}

/// Runs check cycles: enumerate targets, enqueue one job each, wait for the
/// pool to drain
pub struct CheckDispatcher {
    registry: Arc<dyn Registry>,
    executor: Arc<MonitoringExecutor>,
    concurrency: usize,
    queue_capacity: usize,
}

impl CheckDispatcher {
    pub fn new(
        registry: Arc<dyn Registry>,
        executor: Arc<MonitoringExecutor>,
        settings: &CheckerSettings,
    ) -> Self {
        Self {
            registry,
            executor,
            concurrency: settings.concurrency.max(1),
            queue_capacity: settings.queue_capacity.max(1),
        }
    }

    /// Run one full cycle.
    ///
    /// Returns only after the queue is closed and every worker has returned.
    /// A registry failure abandons the cycle before any job is queued.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleSummary, CycleError> {
        let started = Instant::now();
        info!("Starting check for all websites");

        let subscribers = self.registry.list_verified_subscribers_with_targets().await?;

        let (job_tx, job_rx) = mpsc::channel::<Job>(self.queue_capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut workers = JoinSet::new();
        for worker_id in 0..self.concurrency {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&job_rx),
                Arc::clone(&self.executor),
                cancel.clone(),
            ));
        }
        // Workers hold the only receivers; if they all exit, sends fail instead of blocking
        drop(job_rx);

        let mut summary = CycleSummary::default();
        let mut interrupted = false;
        'produce: for subscriber in subscribers {
            for url in subscriber.targets {
                let job = Job { seq: summary.enqueued, target: Target::new(subscriber.email.clone(), url) };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        interrupted = true;
                        break 'produce;
                    }
                    sent = job_tx.send(job) => {
                        if sent.is_err() {
                            error!("All workers exited before the queue was drained");
                            break 'produce;
                        }
                        summary.enqueued += 1;
                    }
                }
            }
        }
        drop(job_tx);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(tally) => summary.merge(tally),
                Err(e) => {
                    summary.lost_workers += 1;
                    error!("Check worker failed: {}", e);
                }
            }
        }
        summary.elapsed = started.elapsed();

        if cancel.is_cancelled() && (interrupted || summary.completed < summary.enqueued) {
            warn!(
                "Cycle cancelled after {}/{} jobs",
                summary.completed, summary.enqueued
            );
            return Err(CycleError::Cancelled);
        }

        if summary.completed < summary.enqueued {
            error!(
                lost_workers = summary.lost_workers,
                "Cycle finished short: {} of {} jobs never completed",
                summary.enqueued - summary.completed,
                summary.enqueued
            );
        }

        info!(
            "Completed check for all websites: {} checked, {} up, {} down, {} invalid, {} alerts in {:?}",
            summary.completed, summary.up, summary.down, summary.invalid, summary.alerts_sent, summary.elapsed
        );
        Ok(summary)
    }
}

async fn worker_loop(
    worker_id: usize,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    executor: Arc<MonitoringExecutor>,
    cancel: CancellationToken,
) -> CycleSummary {
    let mut tally = CycleSummary::default();

    loop {
        let next = {
            let mut rx = jobs.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                job = rx.recv() => job,
            }
        };
        let Some(job) = next else { break };

        debug!("Worker {} checking website {} for {}", worker_id, job.target.url, job.target.subscriber);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Worker {} dropped in-flight job #{}", worker_id, job.seq);
                break;
            }
            result = executor.execute_check(&job.target) => result,
        };

        match &result {
            Ok(_) => {}
            Err(JobError::ServiceDown { report, .. }) if report.transition == Transition::StillDown => {}
            Err(JobError::ServiceDown { url, detail, .. }) => {
                debug!(subscriber = %job.target.subscriber, url = %url, "Job reported DOWN: {}", detail)
            }
            Err(e @ JobError::InvalidTarget(_)) => warn!(
                subscriber = %job.target.subscriber,
                url = %job.target.url,
                error = %e,
                kind = "invalid_target",
                "Skipping misconfigured target"
            ),
        }
        tally.record(&result);
    }

    tally
}
