//! Notifier doubles shared by unit and integration tests.

use crate::core::{Messages, Notifier};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// A notifier that records every batch it is given and returns a fixed result.
#[derive(Clone, Debug)]
pub struct RecordingNotifier {
    name: String,
    succeed: bool,
    received: Arc<Mutex<Vec<Messages>>>,
    calls: Arc<AtomicUsize>,
}

impl RecordingNotifier {
    pub fn succeeding(name: &str) -> Self {
        Self::new(name, true)
    }

    pub fn failing(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, succeed: bool) -> Self {
        Self {
            name: name.to_string(),
            succeed,
            received: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The batches this notifier was called with, in call order.
    pub fn received(&self) -> Vec<Messages> {
        self.received.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn notify(&self, alerts: &Messages) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(alerts.clone());
        self.succeed
    }
}

/// A notifier whose delivery never completes.
#[derive(Clone, Copy, Debug)]
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn notify(&self, _alerts: &Messages) -> bool {
        std::future::pending::<bool>().await
    }
}

/// A notifier that panics mid-delivery.
#[derive(Clone, Copy, Debug)]
pub struct PanickingNotifier;

#[async_trait]
impl Notifier for PanickingNotifier {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn notify(&self, _alerts: &Messages) -> bool {
        panic!("delivery channel exploded");
    }
}
