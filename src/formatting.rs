// src/formatting.rs

use crate::core::{Message, Messages, Summary};

/// A trait for formatting a batch of check results into a single string.
pub trait TextFormatter: Send + Sync {
    fn format_batch(&self, alerts: &Messages) -> String;
}

/// Renders the summary header shared by every text rendering.
pub fn header(cluster_name: &str, summary: &Summary) -> String {
    format!(
        "{} is {}.\n\nFail: {}, Warn: {}, Pass: {}\n",
        cluster_name, summary.status, summary.fail, summary.warn, summary.pass
    )
}

/// Describes what the check was attached to, e.g. `web-1:redis:Service check`.
fn check_target(message: &Message) -> String {
    if message.service.is_empty() {
        format!("{}:{}", message.node, message.check)
    } else {
        format!("{}:{}:{}", message.node, message.service, message.check)
    }
}

fn status_label(message: &Message) -> String {
    message
        .status_str()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// A plain-text formatter used for log sinks.
pub struct PlainTextFormatter {
    cluster_name: String,
}

impl PlainTextFormatter {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
        }
    }

    fn format_line(&self, message: &Message) -> String {
        let mut line = format!("{} is {}.", check_target(message), status_label(message));
        let output = message.output.trim();
        if !output.is_empty() {
            line.push_str("\n    ");
            line.push_str(&output.replace('\n', "\n    "));
        }
        line
    }
}

impl TextFormatter for PlainTextFormatter {
    fn format_batch(&self, alerts: &Messages) -> String {
        let mut text = header(&self.cluster_name, &alerts.summary());
        for message in alerts {
            text.push('\n');
            text.push_str(&self.format_line(message));
            text.push('\n');
        }
        text
    }
}

/// A formatter for Slack that keeps the header readable and puts the
/// per-check detail in a code block.
pub struct SlackTextFormatter {
    cluster_name: String,
}

impl SlackTextFormatter {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
        }
    }

    fn format_line(&self, message: &Message) -> String {
        let output = message.output.trim();
        if output.is_empty() {
            format!("[{}] {}", status_label(message), check_target(message))
        } else {
            // Only the first line of the output; Slack messages get long fast.
            let first = output.lines().next().unwrap_or_default();
            format!("[{}] {}: {}", status_label(message), check_target(message), first)
        }
    }
}

impl TextFormatter for SlackTextFormatter {
    fn format_batch(&self, alerts: &Messages) -> String {
        let head = header(&self.cluster_name, &alerts.summary());
        if alerts.is_empty() {
            return head;
        }

        let lines: Vec<String> = alerts.iter().map(|m| self.format_line(m)).collect();

        format!("{}```\n{}\n```", head, lines.join("\n"))
    }
}
