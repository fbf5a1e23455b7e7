//! A notifier for posting batches to a Slack incoming webhook.

use crate::config::SlackConfig;
use crate::core::{Messages, Notifier};
use crate::formatting::{SlackTextFormatter, TextFormatter};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, instrument};

/// Posts the rendered batch to a Slack webhook.
pub struct SlackNotifier {
    webhook_url: String,
    channel: Option<String>,
    username: Option<String>,
    formatter: Box<dyn TextFormatter>,
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Creates a new `SlackNotifier`.
    pub fn new(
        webhook_url: String,
        formatter: Box<dyn TextFormatter>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Slack HTTP client")?;
        Ok(Self {
            webhook_url,
            channel: None,
            username: None,
            formatter,
            client,
        })
    }

    pub fn from_config(config: &SlackConfig, cluster_name: &str) -> anyhow::Result<Self> {
        let mut notifier = Self::new(
            config.webhook_url.clone(),
            Box::new(SlackTextFormatter::new(cluster_name)),
            Duration::from_secs(config.timeout_seconds),
        )?;
        notifier.channel = config.channel.clone();
        notifier.username = config.username.clone();
        Ok(notifier)
    }

    fn payload(&self, alerts: &Messages) -> Value {
        let mut payload = json!({ "text": self.formatter.format_batch(alerts) });
        if let Some(channel) = &self.channel {
            payload["channel"] = json!(channel);
        }
        if let Some(username) = &self.username {
            payload["username"] = json!(username);
        }
        payload
    }

    async fn send_request(&self, payload: &Value) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .context("HTTP request to Slack failed")?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!(
            "Failed to send Slack notification: status {}, body: {}",
            status,
            text
        );
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    /// Formats and sends a batch to the configured Slack webhook.
    #[instrument(skip(self, alerts), fields(count = alerts.len()))]
    async fn notify(&self, alerts: &Messages) -> bool {
        if alerts.is_empty() {
            return true;
        }

        info!("Formatting and sending batch to Slack.");
        match self.send_request(&self.payload(alerts)).await {
            Ok(()) => {
                info!("Successfully sent batch of {} checks to Slack.", alerts.len());
                true
            }
            Err(e) => {
                error!("Slack notification failed: {:#}", e);
                false
            }
        }
    }
}
