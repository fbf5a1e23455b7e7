//! Integration tests for fanning a batch out to several notifiers.

use anyhow::Result;
use consul_notify::config::{Config, SlackConfig};
use consul_notify::core::CheckStatus;
use consul_notify::notification::test_utils::{HangingNotifier, RecordingNotifier};
use consul_notify::notification::{DeliveryFailure, NotifierRegistry};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[path = "../helpers/mod.rs"]
mod helpers;
use helpers::create_test_batch;

#[tokio::test]
async fn test_every_notifier_sees_batch_when_one_fails() {
    for failing in 0..5 {
        // Arrange
        let notifiers: Vec<Arc<RecordingNotifier>> = (0..5)
            .map(|i| {
                let name = format!("notifier-{}", i);
                if i == failing {
                    Arc::new(RecordingNotifier::failing(&name))
                } else {
                    Arc::new(RecordingNotifier::succeeding(&name))
                }
            })
            .collect();
        let mut registry = NotifierRegistry::new(Duration::from_secs(5));
        for notifier in &notifiers {
            registry.register(notifier.clone());
        }
        let alerts = Arc::new(create_test_batch(&[
            Some(CheckStatus::Critical),
            Some(CheckStatus::Passing),
        ]));

        // Act
        let report = registry.dispatch(alerts.clone()).await;

        // Assert
        for notifier in &notifiers {
            assert_eq!(notifier.calls(), 1);
            assert_eq!(notifier.received()[0], *alerts);
        }
        let failing_name = format!("notifier-{}", failing);
        assert_eq!(
            report.failed(),
            vec![(failing_name.as_str(), &DeliveryFailure::Rejected)]
        );
        assert_eq!(report.succeeded().len(), 4);
    }
}

#[tokio::test]
async fn test_hung_notifier_does_not_delay_report_beyond_timeout() {
    let fast = Arc::new(RecordingNotifier::succeeding("fast"));
    let mut registry = NotifierRegistry::new(Duration::from_millis(300));
    registry.register(Arc::new(HangingNotifier));
    registry.register(fast.clone());

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        registry.dispatch(Arc::new(create_test_batch(&[Some(CheckStatus::Warning)]))),
    )
    .await
    .expect("dispatch should finish once the hung notifier times out");

    assert_eq!(fast.calls(), 1);
    assert_eq!(report.succeeded(), vec!["fast"]);
    assert!(matches!(
        report.failed()[0],
        ("hanging", DeliveryFailure::TimedOut(_))
    ));
}

#[tokio::test]
async fn test_configured_registry_reports_per_backend_outcome() -> Result<()> {
    // Arrange: a failing Slack endpoint next to a working log file.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("alerts.log");

    let mut config = Config::default();
    config.cluster_name = "dc1".to_string();
    config.notifiers.log.path = Some(log_path.clone());
    config.notifiers.slack = Some(SlackConfig {
        webhook_url: format!("{}/hook", server.uri()),
        channel: None,
        username: None,
        timeout_seconds: 5,
    });
    let registry = NotifierRegistry::from_config(&config)?;
    let alerts = Arc::new(create_test_batch(&[
        Some(CheckStatus::Critical),
        Some(CheckStatus::Passing),
        Some(CheckStatus::Passing),
    ]));

    // Act
    let report = registry.dispatch(alerts).await;

    // Assert
    assert_eq!(report.succeeded(), vec!["log"]);
    assert_eq!(report.failed(), vec![("slack", &DeliveryFailure::Rejected)]);
    let logged = std::fs::read_to_string(&log_path)?;
    assert!(logged.starts_with("dc1 is CRITICAL.\n\nFail: 1, Warn: 0, Pass: 2\n"));
    Ok(())
}
