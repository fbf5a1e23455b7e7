//! End-to-end tests for the `consul-notify` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const BATCH: &str = r#"[
    {"Node": "web-1", "CheckId": "serfHealth", "Check": "Serf Health Status", "Status": "critical", "Output": "Agent not live"},
    {"Node": "web-2", "CheckId": "serfHealth", "Check": "Serf Health Status", "Status": "passing"}
]"#;

fn write_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_dispatches_batch_from_stdin_to_log_notifier() {
    Command::cargo_bin("consul-notify")
        .unwrap()
        .write_stdin(BATCH)
        .assert()
        .success()
        .stdout(predicate::str::contains("log: ok"))
        .stderr(predicate::str::contains("Consul is CRITICAL"));
}

#[test]
fn test_reads_batch_from_input_file() {
    let input = write_file(BATCH);

    Command::cargo_bin("consul-notify")
        .unwrap()
        .arg("--input")
        .arg(input.path())
        .arg("--cluster-name")
        .arg("dc1")
        .assert()
        .success()
        .stderr(predicate::str::contains("dc1 is CRITICAL"));
}

#[cfg(unix)]
#[test]
fn test_failing_custom_notifier_fails_the_run() {
    let config = write_file(
        r#"
        [notifiers]
        custom = ["false"]
    "#,
    );

    Command::cargo_bin("consul-notify")
        .unwrap()
        .arg("--config")
        .arg(config.path())
        .write_stdin(BATCH)
        .assert()
        .failure()
        .stdout(predicate::str::contains("log: ok"))
        .stdout(predicate::str::contains("custom:false: failed"))
        .stderr(predicate::str::contains("1 of 2 notifiers failed: custom:false"));
}

#[test]
fn test_rejects_malformed_batch() {
    Command::cargo_bin("consul-notify")
        .unwrap()
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch is not a JSON array of checks"));
}
