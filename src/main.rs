//! consul-notify - Consul health-check notifier
//!
//! Reads one batch of check results, logs the overall status, and dispatches
//! the batch to every enabled notifier.

use anyhow::Result;
use clap::Parser;
use consul_notify::{cli::Cli, config::Config, notification::NotifierRegistry, read_batch};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load(&cli).unwrap_or_else(|err| {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("-------------------- Configuration --------------------");
    info!("Log Level: {}", config.log_level);
    info!("Cluster Name: {}", config.cluster_name);
    info!("Dispatch Timeout: {}s", config.dispatch.timeout_seconds);
    info!(
        "Log Notifier: {}",
        if config.notifiers.log.enabled { "Enabled" } else { "Disabled" }
    );
    info!(
        "Slack Notifier: {}",
        if config.notifiers.slack.is_some() { "Enabled" } else { "Disabled" }
    );
    info!("Custom Notifiers: {}", config.notifiers.custom.len());
    info!("-------------------------------------------------------");

    let registry = NotifierRegistry::from_config(&config)?;
    let alerts = read_batch(cli.input.as_deref())?;

    let summary = alerts.summary();
    info!(
        "{} is {} (fail: {}, warn: {}, pass: {})",
        config.cluster_name, summary.status, summary.fail, summary.warn, summary.pass
    );

    let report = registry.dispatch(Arc::new(alerts)).await;
    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(()) => println!("{}: ok ({:.2?})", outcome.notifier, outcome.elapsed),
            Err(e) => println!("{}: failed: {}", outcome.notifier, e),
        }
    }

    if !report.all_succeeded() {
        let failed: Vec<&str> = report.failed().into_iter().map(|(name, _)| name).collect();
        anyhow::bail!(
            "{} of {} notifiers failed: {}",
            failed.len(),
            report.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
