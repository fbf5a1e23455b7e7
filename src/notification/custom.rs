//! A notifier that hands the batch to an external command.
//!
//! The batch is written to the command's stdin as a JSON array using the
//! same field names the monitoring source emits. Delivery succeeds when the
//! command exits with status 0.

use crate::core::{Messages, Notifier};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument};

pub struct CustomNotifier {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CustomNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        Self {
            name: format!("custom:{}", program),
            program,
            args,
        }
    }

    /// Builds a notifier from a whitespace-separated command line.
    pub fn parse(command_line: &str) -> anyhow::Result<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("custom notifier command is empty"))?;
        Ok(Self::new(program, parts.collect()))
    }

    async fn run(&self, alerts: &Messages) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(alerts).context("failed to serialize batch")?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program))?;

        // Stdin is fed while stderr is drained; a command that fills its
        // stderr pipe before reading stdin would otherwise block both sides.
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // A command that exits without reading stdin closes the pipe;
                // its exit status decides the outcome, not the write.
                if let Err(e) = stdin.write_all(&payload).await {
                    debug!(error = %e, "Custom notifier closed stdin early");
                }
            }
        };

        let ((), output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if output.status.success() {
            return Ok(());
        }
        Err(anyhow!(
            "{} exited with {}: {}",
            self.program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

#[async_trait]
impl Notifier for CustomNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(program = %self.program, count = alerts.len()))]
    async fn notify(&self, alerts: &Messages) -> bool {
        match self.run(alerts).await {
            Ok(()) => true,
            Err(e) => {
                error!("Custom notifier failed: {:#}", e);
                false
            }
        }
    }
}
