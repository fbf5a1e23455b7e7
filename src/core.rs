//! Core domain types and service traits for consul-notify
//!
//! This module defines the check-result record, the batch-level status
//! reduction, and the `Notifier` contract every delivery backend satisfies.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unrecognised check status: {0:?} (expected critical, warning or passing)")]
    UnknownStatus(String),
}

/// The status reported by a single health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Critical,
    Warning,
    Passing,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Passing => "passing",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckStatus {
    type Err = ModelError;

    /// Matching is exact: `"Critical"` or `"crit"` are not recognised.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Self::Critical),
            "warning" => Ok(Self::Warning),
            "passing" => Ok(Self::Passing),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// The system-wide status derived from a batch of check results.
///
/// Variants are declared in ascending severity, so `Ord` follows
/// `Healthy < Unstable < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SystemStatus {
    #[default]
    Healthy,
    Unstable,
    Critical,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => f.write_str("HEALTHY"),
            Self::Unstable => f.write_str("UNSTABLE"),
            Self::Critical => f.write_str("CRITICAL"),
        }
    }
}

/// One health-check observation at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub struct Message {
    /// The monitored host or agent.
    pub node: String,
    /// Empty for node-level checks.
    pub service_id: String,
    pub service: String,
    pub check_id: String,
    pub check: String,
    /// `None` when the source reported a status outside the known three.
    pub status: Option<CheckStatus>,
    /// The source's status string when it is not one of the known three.
    /// Written back unchanged on serialization.
    pub raw_status: Option<String>,
    /// Raw diagnostic text from the check.
    pub output: String,
    pub notes: String,
    /// How often the check runs, in seconds.
    pub interval: i64,
    /// When a dismissed status expires.
    pub rmd_check: Option<DateTime<Utc>>,
    /// Notification targets already informed about this check.
    pub notif_list: BTreeMap<String, bool>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_critical(&self) -> bool {
        self.status == Some(CheckStatus::Critical)
    }

    pub fn is_warning(&self) -> bool {
        self.status == Some(CheckStatus::Warning)
    }

    pub fn is_passing(&self) -> bool {
        self.status == Some(CheckStatus::Passing)
    }

    /// The status as the source reported it, if it reported one.
    pub fn status_str(&self) -> Option<&str> {
        match self.status {
            Some(status) => Some(status.as_str()),
            None => self.raw_status.as_deref(),
        }
    }
}

/// The JSON shape the monitoring source emits, with the status as a plain string.
#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct WireMessage {
    node: String,
    service_id: String,
    service: String,
    check_id: String,
    check: String,
    status: Option<String>,
    output: String,
    notes: String,
    interval: i64,
    rmd_check: Option<DateTime<Utc>>,
    notif_list: BTreeMap<String, bool>,
    timestamp: DateTime<Utc>,
}

impl From<WireMessage> for Message {
    // Unknown values are kept out of the counts rather than failing the whole
    // batch, but they are reported here where the raw string is still visible.
    fn from(wire: WireMessage) -> Self {
        let (status, raw_status) = match wire.status {
            Some(raw) => match raw.parse::<CheckStatus>() {
                Ok(status) => (Some(status), None),
                Err(e) => {
                    warn!(node = %wire.node, check = %wire.check_id, status = %raw, "{}", e);
                    (None, Some(raw))
                }
            },
            None => (None, None),
        };
        Self {
            node: wire.node,
            service_id: wire.service_id,
            service: wire.service,
            check_id: wire.check_id,
            check: wire.check,
            status,
            raw_status,
            output: wire.output,
            notes: wire.notes,
            interval: wire.interval,
            rmd_check: wire.rmd_check,
            notif_list: wire.notif_list,
            timestamp: wire.timestamp,
        }
    }
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let status = message.status_str().map(str::to_string);
        Self {
            node: message.node,
            service_id: message.service_id,
            service: message.service,
            check_id: message.check_id,
            check: message.check,
            status,
            output: message.output,
            notes: message.notes,
            interval: message.interval,
            rmd_check: message.rmd_check,
            notif_list: message.notif_list,
            timestamp: message.timestamp,
        }
    }
}

/// The result of reducing a batch to a single system-wide status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub status: SystemStatus,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

/// An ordered batch of check results evaluated together in one cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Messages(Vec<Message>);

impl Messages {
    pub fn new(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    /// Reduces the batch to an overall status and per-status counts.
    ///
    /// A single critical check makes the whole system `CRITICAL` no matter
    /// how many checks pass. Messages without a recognised status count
    /// toward nothing.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        let mut has_critical = false;
        let mut has_warning = false;

        for message in &self.0 {
            if message.is_critical() {
                has_critical = true;
                summary.fail += 1;
            } else if message.is_warning() {
                has_warning = true;
                summary.warn += 1;
            } else if message.is_passing() {
                summary.pass += 1;
            }
        }

        summary.status = if has_critical {
            SystemStatus::Critical
        } else if has_warning {
            SystemStatus::Unstable
        } else {
            SystemStatus::Healthy
        };
        summary
    }

    pub fn into_inner(self) -> Vec<Message> {
        self.0
    }
}

impl Deref for Messages {
    type Target = [Message];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Message>> for Messages {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

impl FromIterator<Message> for Messages {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Messages {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// A delivery channel that renders and transmits a batch of check results.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// A stable, descriptive name for the backend (e.g., "log", "slack").
    /// Used for logging, metrics and dispatch reports.
    fn name(&self) -> &str;

    /// Attempts to deliver the batch through this backend's channel.
    ///
    /// # Returns
    /// * `true` if the batch was delivered
    /// * `false` on any failure; the cause is logged by the backend itself
    async fn notify(&self, alerts: &Messages) -> bool;
}
