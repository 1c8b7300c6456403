//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use downtrack::{
    Checker, MemoryStatusStore, MonitorStatus, MonitoringExecutor, Notifier, NotifyError, Prober,
    Registry, RegistryError, StatusStore, StatusTracker, StoreError, Subscriber, TransportError,
};
use url::Url;

/// Checker that answers from a script instead of the network
#[derive(Default)]
pub struct ScriptedChecker {
    responses: Mutex<HashMap<String, Result<u16, TransportError>>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request takes `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    pub fn respond(&self, url: &str, response: Result<u16, TransportError>) {
        let key = Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string());
        self.responses.lock().unwrap().insert(key, response);
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        let key = Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string());
        self.calls.lock().unwrap().get(&key).copied().unwrap_or(0)
    }

    pub fn call_counts(&self) -> HashMap<String, usize> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Checker for ScriptedChecker {
    async fn get(&self, url: &Url) -> Result<u16, TransportError> {
        let key = url.to_string();
        *self.calls.lock().unwrap().entry(key.clone()).or_default() += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responses.lock().unwrap().get(&key).cloned().unwrap_or(Ok(200))
    }
}

/// Memory store that counts reads and writes per key
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStatusStore,
    reads: Mutex<HashMap<String, usize>>,
    writes: Mutex<HashMap<String, usize>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, key: &str, status: MonitorStatus) {
        self.inner.set_with_expiry(key, status, downtrack::STATUS_TTL).await.unwrap();
    }

    pub async fn seed_with_ttl(&self, key: &str, status: MonitorStatus, ttl: Duration) {
        self.inner.set_with_expiry(key, status, ttl).await.unwrap();
    }

    pub async fn current(&self, key: &str) -> Option<MonitorStatus> {
        self.inner.get(key).await.unwrap()
    }

    pub fn total_writes(&self) -> usize {
        self.writes.lock().unwrap().values().sum()
    }

    pub fn reads(&self) -> HashMap<String, usize> {
        self.reads.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<MonitorStatus>, StoreError> {
        *self.reads.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.inner.get(key).await
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        status: MonitorStatus,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        *self.writes.lock().unwrap().entry(key.to_string()).or_default() += 1;
        self.inner.set_with_expiry(key, status, ttl).await
    }
}

/// Store whose backend is unreachable
pub struct BrokenStore;

#[async_trait]
impl StatusStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<MonitorStatus>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn set_with_expiry(
        &self,
        _key: &str,
        _status: MonitorStatus,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

/// Notifier that keeps every message it was asked to send
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, html_body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery("smtp server said no".to_string()));
        }
        self.sent.lock().unwrap().push((recipient.to_string(), html_body.to_string()));
        Ok(())
    }
}

/// Registry returning a fixed subscriber list, optionally failing the first calls
#[derive(Default)]
pub struct ScriptedRegistry {
    subscribers: Vec<Subscriber>,
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedRegistry {
    pub fn new(subscribers: Vec<Subscriber>) -> Self {
        Self { subscribers, ..Self::default() }
    }

    pub fn failing_first(subscribers: Vec<Subscriber>, failures: usize) -> Self {
        Self { subscribers, failures_left: AtomicUsize::new(failures), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for ScriptedRegistry {
    async fn list_verified_subscribers_with_targets(&self) -> Result<Vec<Subscriber>, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RegistryError::Backend("registry offline".to_string()));
        }
        Ok(self.subscribers.clone())
    }
}

pub fn executor(
    checker: Arc<ScriptedChecker>,
    store: Arc<dyn StatusStore>,
    notifier: Arc<RecordingNotifier>,
) -> Arc<MonitoringExecutor> {
    Arc::new(MonitoringExecutor::new(Prober::new(checker), StatusTracker::new(store, notifier)))
}

/// `subscribers` subscribers with `per_subscriber` distinct URLs each
pub fn fleet(subscribers: usize, per_subscriber: usize) -> Vec<Subscriber> {
    (0..subscribers)
        .map(|s| {
            let targets = (0..per_subscriber)
                .map(|t| format!("https://site-{s}-{t}.example.com/"))
                .collect();
            Subscriber::new(format!("user{s}@example.com"), targets)
        })
        .collect()
}
