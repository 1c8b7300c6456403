//! Checker settings sourced from the environment.

use std::env;
use std::fmt;
use std::time::Duration;

use tracing::warn;

pub const TIMEOUT_ENV: &str = "CHECKER_TIMEOUT";
pub const CONCURRENCY_ENV: &str = "CHECKER_CONCURRENCY";
pub const INTERVAL_ENV: &str = "CHECKER_INTERVAL";
pub const QUEUE_CAPACITY_ENV: &str = "CHECKER_QUEUE_CAPACITY";

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CONCURRENCY: usize = 5;
const DEFAULT_INTERVAL_SECS: u64 = 600;
const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Tunables for one checker process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckerSettings {
    /// Per-request timeout for a single probe
    pub probe_timeout: Duration,
    /// Number of workers draining the job queue
    pub concurrency: usize,
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Bound of the job queue; the producer blocks once it is full
    pub queue_capacity: usize,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl fmt::Display for CheckerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timeout={}s workers={} interval={}s queue={}",
            self.probe_timeout.as_secs(),
            self.concurrency,
            self.interval.as_secs(),
            self.queue_capacity
        )
    }
}

impl CheckerSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup.
    ///
    /// Values that are missing, non-numeric or not strictly positive fall
    /// back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            probe_timeout: positive::<u64>(&lookup, TIMEOUT_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
            concurrency: positive::<usize>(&lookup, CONCURRENCY_ENV).unwrap_or(defaults.concurrency),
            interval: positive::<u64>(&lookup, INTERVAL_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            queue_capacity: positive::<usize>(&lookup, QUEUE_CAPACITY_ENV)
                .unwrap_or(defaults.queue_capacity),
        }
    }
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "Ignoring invalid setting, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = CheckerSettings::from_lookup(|_| None);
        assert_eq!(settings, CheckerSettings::default());
        assert_eq!(settings.probe_timeout, Duration::from_secs(10));
        assert_eq!(settings.concurrency, 5);
        assert_eq!(settings.interval, Duration::from_secs(600));
        assert_eq!(settings.queue_capacity, 100);
    }

    #[test]
    fn test_valid_overrides() {
        let settings = CheckerSettings::from_lookup(lookup_from(&[
            (TIMEOUT_ENV, "3"),
            (CONCURRENCY_ENV, "12"),
            (INTERVAL_ENV, "60"),
            (QUEUE_CAPACITY_ENV, " 8 "),
        ]));
        assert_eq!(settings.probe_timeout, Duration::from_secs(3));
        assert_eq!(settings.concurrency, 12);
        assert_eq!(settings.interval, Duration::from_secs(60));
        assert_eq!(settings.queue_capacity, 8);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let settings = CheckerSettings::from_lookup(lookup_from(&[
            (TIMEOUT_ENV, "ten"),
            (CONCURRENCY_ENV, "0"),
            (INTERVAL_ENV, "-5"),
            (QUEUE_CAPACITY_ENV, ""),
        ]));
        assert_eq!(settings, CheckerSettings::default());
    }
}
