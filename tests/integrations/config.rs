use consul_notify::cli::Cli;
use consul_notify::config::Config;
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(toml_content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();
    file
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let toml_content = r##"
        log_level = "debug"
        cluster_name = "dc1"
        [dispatch]
        timeout_seconds = 12
        [notifiers]
        custom = ["/usr/local/bin/page-oncall --team infra"]
        [notifiers.log]
        enabled = false
        path = "/var/log/consul-notify.log"
        [notifiers.slack]
        webhook_url = "https://hooks.slack.com/services/..."
        channel = "#ops"
    "##;
    let file = write_config(toml_content);

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.cluster_name, "dc1");
    assert_eq!(config.dispatch.timeout_seconds, 12);
    assert!(!config.notifiers.log.enabled);
    assert_eq!(
        config.notifiers.log.path,
        Some(PathBuf::from("/var/log/consul-notify.log"))
    );
    let slack = config.notifiers.slack.unwrap();
    assert_eq!(slack.webhook_url, "https://hooks.slack.com/services/...");
    assert_eq!(slack.channel.as_deref(), Some("#ops"));
    assert_eq!(slack.username, None);
    assert_eq!(slack.timeout_seconds, 10); // Not in the toml, so it should be the default value
    assert_eq!(
        config.notifiers.custom,
        vec!["/usr/local/bin/page-oncall --team infra".to_string()]
    );
}

#[test]
#[serial]
fn test_load_default_values() {
    let file = write_config("");

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();

    assert_eq!(config, Config::default());
    assert!(config.notifiers.log.enabled);
    assert!(config.notifiers.slack.is_none());
}

#[test]
#[serial]
fn test_cli_overrides_file_and_environment() {
    let file = write_config(
        r#"
        cluster_name = "from-file"
        [dispatch]
        timeout_seconds = 12
    "#,
    );
    std::env::set_var("CONSUL_NOTIFY_CLUSTER_NAME", "from-env");
    std::env::set_var("CONSUL_NOTIFY_DISPATCH__TIMEOUT_SECONDS", "20");

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        timeout_seconds: Some(3),
        ..Default::default()
    };
    let config = Config::load(&cli);

    std::env::remove_var("CONSUL_NOTIFY_CLUSTER_NAME");
    std::env::remove_var("CONSUL_NOTIFY_DISPATCH__TIMEOUT_SECONDS");

    let config = config.unwrap();
    assert_eq!(config.cluster_name, "from-env");
    assert_eq!(config.dispatch.timeout_seconds, 3);
}

#[test]
#[serial]
fn test_invalid_value_type() {
    let file = write_config(
        r#"
        [dispatch]
        timeout_seconds = "thirty"
    "#,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(Config::load(&cli).is_err());
}

#[test]
#[serial]
fn test_missing_required_field() {
    let file = write_config(
        r##"
        [notifiers.slack]
        # webhook_url is missing
        channel = "#ops"
    "##,
    );

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    assert!(Config::load(&cli).is_err());
}
