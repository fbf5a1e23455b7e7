//! The registry of enabled notifiers and the fan-out dispatch loop.

use crate::config::Config;
use crate::core::{Messages, Notifier};
use crate::notification::{CustomNotifier, LogNotifier, SlackNotifier};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Why a single backend's delivery did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    #[error("notifier reported a failed delivery")]
    Rejected,

    #[error("notifier did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("notifier panicked: {0}")]
    Panicked(String),
}

/// The outcome of presenting a batch to one backend.
#[derive(Debug, Clone)]
pub struct DeliveryOutcome {
    pub notifier: String,
    pub result: Result<(), DeliveryFailure>,
    pub elapsed: Duration,
}

impl DeliveryOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-backend outcomes of one dispatch, in registration order.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn outcomes(&self) -> &[DeliveryOutcome] {
        &self.outcomes
    }

    /// Names of the backends that delivered the batch.
    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.succeeded())
            .map(|o| o.notifier.as_str())
            .collect()
    }

    /// Names of the backends that failed, with the reason.
    pub fn failed(&self) -> Vec<(&str, &DeliveryFailure)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                Ok(()) => None,
                Err(e) => Some((o.notifier.as_str(), e)),
            })
            .collect()
    }

    /// True when every backend succeeded, including when there were none.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(DeliveryOutcome::succeeded)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Holds the enabled notifiers and presents each batch to all of them.
#[derive(Clone)]
pub struct NotifierRegistry {
    notifiers: Vec<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl NotifierRegistry {
    /// Creates an empty registry whose backends each get `timeout` per dispatch.
    pub fn new(timeout: Duration) -> Self {
        Self {
            notifiers: Vec::new(),
            timeout,
        }
    }

    /// Builds the registry from configuration. Backends that are not
    /// configured or are disabled are simply left out.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut registry = Self::new(Duration::from_secs(config.dispatch.timeout_seconds));
        let notifiers = &config.notifiers;

        if notifiers.log.enabled {
            registry.register(Arc::new(LogNotifier::new(
                &config.cluster_name,
                notifiers.log.path.clone(),
            )));
        }

        if let Some(slack) = &notifiers.slack {
            registry.register(Arc::new(SlackNotifier::from_config(
                slack,
                &config.cluster_name,
            )?));
        }

        for command in &notifiers.custom {
            registry.register(Arc::new(CustomNotifier::parse(command)?));
        }

        info!(notifiers = ?registry.names(), "Notifier registry initialized");
        Ok(registry)
    }

    pub fn register(&mut self, notifier: Arc<dyn Notifier>) {
        debug!(notifier = notifier.name(), "Registering notifier");
        self.notifiers.push(notifier);
    }

    pub fn names(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Presents the same batch to every registered notifier.
    ///
    /// Each notifier runs on its own task under the registry timeout; one
    /// backend's outcome never holds back another.
    /// Failed backends are reported, not retried.
    #[instrument(skip_all, fields(count = alerts.len(), notifiers = self.notifiers.len()))]
    pub async fn dispatch(&self, alerts: Arc<Messages>) -> DispatchReport {
        if self.notifiers.is_empty() {
            warn!("No notifiers enabled; nothing to dispatch to.");
            return DispatchReport::default();
        }

        let summary = alerts.summary();
        info!(
            status = %summary.status,
            fail = summary.fail,
            warn = summary.warn,
            pass = summary.pass,
            "Dispatching batch"
        );

        let timeout = self.timeout;
        let (names, handles): (Vec<String>, Vec<_>) = self
            .notifiers
            .iter()
            .map(|notifier| {
                let notifier = Arc::clone(notifier);
                let alerts = Arc::clone(&alerts);
                let name = notifier.name().to_string();
                let handle = tokio::spawn(async move {
                    let start = Instant::now();
                    let delivered =
                        AssertUnwindSafe(tokio::time::timeout(timeout, notifier.notify(&alerts)))
                            .catch_unwind()
                            .await;
                    (delivered, start.elapsed())
                });
                (name, handle)
            })
            .unzip();

        let started = Instant::now();
        let results = join_all(handles).await;

        let outcomes: Vec<DeliveryOutcome> = names
            .into_iter()
            .zip(results)
            .map(|(notifier, joined)| {
                let (result, elapsed) = match joined {
                    Ok((Ok(Ok(true)), elapsed)) => (Ok(()), elapsed),
                    Ok((Ok(Ok(false)), elapsed)) => (Err(DeliveryFailure::Rejected), elapsed),
                    Ok((Ok(Err(_)), elapsed)) => (Err(DeliveryFailure::TimedOut(timeout)), elapsed),
                    Ok((Err(payload), elapsed)) => {
                        (Err(DeliveryFailure::Panicked(panic_message(payload.as_ref()))), elapsed)
                    }
                    // Panics are caught inside the task, so this only fires
                    // when the runtime cancels it during shutdown.
                    Err(e) => (Err(DeliveryFailure::Panicked(e.to_string())), started.elapsed()),
                };
                record(&notifier, &result, elapsed);
                DeliveryOutcome {
                    notifier,
                    result,
                    elapsed,
                }
            })
            .collect();

        let report = DispatchReport { outcomes };
        if report.all_succeeded() {
            info!(delivered = report.len(), "Batch delivered to all notifiers");
        } else {
            warn!(
                delivered = report.succeeded().len(),
                failed = report.failed().len(),
                "Batch delivery failed for some notifiers"
            );
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn record(notifier: &str, result: &Result<(), DeliveryFailure>, elapsed: Duration) {
    let outcome = match result {
        Ok(()) => {
            debug!(notifier, ?elapsed, "Notifier delivered batch");
            "success"
        }
        Err(e) => {
            error!(notifier, error = %e, "Notifier failed to deliver batch");
            match e {
                DeliveryFailure::Rejected => "rejected",
                DeliveryFailure::TimedOut(_) => "timeout",
                DeliveryFailure::Panicked(_) => "panic",
            }
        }
    };
    metrics::counter!(
        "notifications_total",
        "notifier" => notifier.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("notification_duration_seconds", "notifier" => notifier.to_string())
        .record(elapsed.as_secs_f64());
}
