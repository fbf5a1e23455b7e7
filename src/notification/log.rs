//! A notifier that writes the rendered batch to the application log.
//!
//! The event level follows the overall status, so a `CRITICAL` batch is
//! logged at `error`. When a file path is configured the rendering is also
//! appended there.

use crate::core::{Messages, Notifier, SystemStatus};
use crate::formatting::{PlainTextFormatter, TextFormatter};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument, warn};

pub struct LogNotifier {
    formatter: PlainTextFormatter,
    path: Option<PathBuf>,
}

impl LogNotifier {
    pub fn new(cluster_name: &str, path: Option<PathBuf>) -> Self {
        Self {
            formatter: PlainTextFormatter::new(cluster_name),
            path,
        }
    }

    async fn append(&self, path: &Path, text: &str) -> anyhow::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        file.write_all(text.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    #[instrument(skip_all, fields(count = alerts.len()))]
    async fn notify(&self, alerts: &Messages) -> bool {
        let text = self.formatter.format_batch(alerts);
        match alerts.summary().status {
            SystemStatus::Critical => error!("{}", text),
            SystemStatus::Unstable => warn!("{}", text),
            SystemStatus::Healthy => info!("{}", text),
        }

        if let Some(path) = &self.path {
            if let Err(e) = self.append(path, &text).await {
                error!(error = %e, "Failed to write notification to log file");
                return false;
            }
        }
        true
    }
}
