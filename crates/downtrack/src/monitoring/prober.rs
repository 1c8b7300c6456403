use std::sync::Arc;
use std::time::Instant;

use super::checker::Checker;
use super::types::CheckOutcome;
use super::validation::validate_target;
use crate::error::TargetError;

/// Probes one target and classifies it as UP or DOWN.
///
/// Transport failures and 5xx responses are DOWN; every other response,
/// 4xx included, is UP.
#[derive(Clone)]
pub struct Prober {
    checker: Arc<dyn Checker>,
}

impl Prober {
    pub fn new(checker: Arc<dyn Checker>) -> Self {
        Self { checker }
    }

    /// Probe `target`.
    ///
    /// A URL that is malformed or not HTTPS is returned as a [`TargetError`]
    /// without touching the network.
    pub async fn probe(&self, target: &str) -> Result<CheckOutcome, TargetError> {
        let url = validate_target(target)?;

        let start = Instant::now();
        let result = self.checker.get(&url).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Err(e) if e.timed_out => CheckOutcome::down(format!("timeout: {}", e.message), None, latency_ms),
            Err(e) => CheckOutcome::down(e.message, None, latency_ms),
            Ok(code) if (500..600).contains(&code) => {
                CheckOutcome::down(format!("received HTTP {}", code), Some(code), latency_ms)
            }
            Ok(code) => CheckOutcome::up(code, latency_ms),
        };

        Ok(outcome)
    }
}
