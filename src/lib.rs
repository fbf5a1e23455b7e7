//! consul-notify - health-check aggregation and notification dispatch
//!
//! This library reduces a batch of Consul check results to a single
//! system-wide status and fans the batch out to every enabled notifier.
pub mod cli;
pub mod config;
pub mod core;
pub mod formatting;
pub mod notification;

// Re-export core types for convenience
pub use crate::core::*;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Reads a JSON batch of check results from `path`, or from stdin when no
/// path is given.
pub fn read_batch(path: Option<&Path>) -> Result<Messages> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read batch from {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read batch from stdin")?;
            raw
        }
    };
    let batch = serde_json::from_str(&raw).context("batch is not a JSON array of checks")?;
    Ok(batch)
}
