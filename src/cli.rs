//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. These arguments are parsed at startup and then merged with
//! the configuration file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Summarizes a batch of Consul health checks and dispatches it to every
/// enabled notifier.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON file holding the batch of check results. Reads stdin if omitted.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Cluster name used in notification headers.
    #[arg(long, value_name = "NAME")]
    pub cluster_name: Option<String>,

    /// Logging level (e.g. "debug", "info").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Per-notifier delivery timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(name) = &self.cluster_name {
            dict.insert("cluster_name".into(), Value::from(name.clone()));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(timeout) = self.timeout_seconds {
            let mut dispatch = Dict::new();
            dispatch.insert("timeout_seconds".into(), Value::from(timeout));
            dict.insert("dispatch".into(), Value::from(dispatch));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
