//! Prober validation and classification tests

mod common;

use std::sync::Arc;

use common::ScriptedChecker;
use downtrack::{MonitorStatus, Prober, TargetError, TransportError};

#[tokio::test]
async fn test_non_https_targets_never_reach_the_network() {
    let checker = Arc::new(ScriptedChecker::new());
    let prober = Prober::new(checker.clone());

    for target in ["http://example.com", "ftp://example.com/file", "example.com", "not a url", ""] {
        let result = prober.probe(target).await;
        assert!(result.is_err(), "{target:?} should be rejected");
    }

    assert!(matches!(
        prober.probe("http://example.com").await,
        Err(TargetError::UnsupportedScheme { .. })
    ));
    assert_eq!(checker.total_calls(), 0, "rejected targets must not be probed");
}

#[tokio::test]
async fn test_server_errors_are_down() {
    let checker = Arc::new(ScriptedChecker::new());
    checker.respond("https://broken.example.com", Ok(503));
    checker.respond("https://edge.example.com", Ok(599));
    let prober = Prober::new(checker.clone());

    let outcome = prober.probe("https://broken.example.com").await.unwrap();
    assert_eq!(outcome.status, MonitorStatus::Down);
    assert_eq!(outcome.status_code, Some(503));
    assert_eq!(outcome.detail.as_deref(), Some("received HTTP 503"));

    let outcome = prober.probe("https://edge.example.com").await.unwrap();
    assert_eq!(outcome.status, MonitorStatus::Down);
}

#[tokio::test]
async fn test_client_errors_and_redirects_are_up() {
    let checker = Arc::new(ScriptedChecker::new());
    checker.respond("https://missing.example.com", Ok(404));
    checker.respond("https://forbidden.example.com", Ok(403));
    checker.respond("https://moved.example.com", Ok(301));
    checker.respond("https://odd.example.com", Ok(600));
    let prober = Prober::new(checker.clone());

    for target in [
        "https://missing.example.com",
        "https://forbidden.example.com",
        "https://moved.example.com",
        "https://odd.example.com",
        "https://fine.example.com",
    ] {
        let outcome = prober.probe(target).await.unwrap();
        assert_eq!(outcome.status, MonitorStatus::Up, "{target} should be UP");
        assert!(outcome.detail.is_none());
    }
    assert_eq!(checker.total_calls(), 5);
}

#[tokio::test]
async fn test_transport_failures_are_down_with_detail() {
    let checker = Arc::new(ScriptedChecker::new());
    checker.respond(
        "https://slow.example.com",
        Err(TransportError::timeout("operation timed out")),
    );
    checker.respond(
        "https://gone.example.com",
        Err(TransportError::new("dns error: no record found")),
    );
    let prober = Prober::new(checker.clone());

    let outcome = prober.probe("https://slow.example.com").await.unwrap();
    assert_eq!(outcome.status, MonitorStatus::Down);
    assert_eq!(outcome.status_code, None);
    assert_eq!(outcome.detail.as_deref(), Some("timeout: operation timed out"));

    let outcome = prober.probe("https://gone.example.com").await.unwrap();
    assert_eq!(outcome.status, MonitorStatus::Down);
    assert_eq!(outcome.detail.as_deref(), Some("dns error: no record found"));
}
