/// Monitoring engine module - handles check cycles end to end
///
/// This module is responsible for:
/// - Validating and probing HTTPS targets
/// - Comparing outcomes with the stored status and sending alerts
/// - Fanning jobs out to a bounded worker pool
/// - Scheduling cycles
pub mod alert;
pub mod checker;
pub mod dispatcher;
pub mod executor;
pub mod prober;
pub mod scheduler;
pub mod transition;
pub mod types;
pub mod validation;

pub use checker::{Checker, HttpChecker};
pub use dispatcher::{CheckDispatcher, CycleSummary};
pub use executor::{JobReport, MonitoringExecutor};
pub use prober::Prober;
pub use scheduler::MonitoringScheduler;
pub use transition::{StatusTracker, Transition, TransitionReport};
pub use types::{CheckOutcome, Job, MonitorStatus, Target};
pub use validation::validate_target;
