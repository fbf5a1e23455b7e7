//! Configuration management for consul-notify
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to layer defaults, a TOML file, environment variables and CLI
//! arguments, in that order of increasing priority.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Name used in notification headers, e.g. "Consul is CRITICAL."
    pub cluster_name: String,
    /// Configuration for the dispatch loop.
    pub dispatch: DispatchConfig,
    /// Which notifiers are enabled, and how.
    pub notifiers: NotifiersConfig,
}

/// Configuration for the dispatch loop.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Upper bound on a single notifier's delivery, in seconds.
    pub timeout_seconds: u64,
}

/// The set of notifiers. A missing table means the notifier is disabled.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct NotifiersConfig {
    #[serde(default)]
    pub log: LogConfig,
    pub slack: Option<SlackConfig>,
    /// Command lines of external notifiers; each receives the batch as JSON.
    #[serde(default)]
    pub custom: Vec<String>,
}

/// Configuration for the log notifier.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    pub enabled: bool,
    /// Also append each rendered batch to this file.
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

/// Configuration for Slack notifications.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlackConfig {
    /// The Slack incoming webhook URL.
    pub webhook_url: String,
    pub channel: Option<String>,
    pub username: Option<String>,
    #[serde(default = "default_slack_timeout")]
    pub timeout_seconds: u64,
}

fn default_slack_timeout() -> u64 {
    10
}

impl Config {
    /// Loads the application configuration by layering sources.
    ///
    /// # Arguments
    /// * `cli` - Parsed command-line arguments; supplies the config file
    ///   path and the highest-priority overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // e.g., CONSUL_NOTIFY_DISPATCH__TIMEOUT_SECONDS=5
            .merge(Env::prefixed("CONSUL_NOTIFY_").split("__"))
            .merge(cli)
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            cluster_name: "Consul".to_string(),
            dispatch: DispatchConfig {
                timeout_seconds: 30,
            },
            notifiers: NotifiersConfig::default(),
        }
    }
}
