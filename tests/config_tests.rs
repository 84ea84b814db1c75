use std::fs;
use std::time::Duration;

use telnet_client::{ClientConfig, ConfigError};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("telnet-client.conf");

    let config = ClientConfig::load_from_file(&path).unwrap();

    assert_eq!(config.connection.port, 23);
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[session]"));
    assert!(written.contains("poll_interval_ms = 10"));

    // The generated file loads back to the same settings
    let reloaded = ClientConfig::load_from_file(&path).unwrap();
    assert_eq!(reloaded.session_options(), config.session_options());
    assert_eq!(reloaded.session.prompt_pattern, config.session.prompt_pattern);
}

#[test]
fn test_load_custom_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("router.conf");
    fs::write(
        &path,
        r#"
[connection]
host = "10.1.1.1"
port = 2323

[session]
await_timeout_ms = 3000
prompt_pattern = "router[>#]\s*$"
exit_command = "logout"

[login]
username = "admin"
"#,
    )
    .unwrap();

    let config = ClientConfig::load_from_file(&path).unwrap();
    let options = config.session_options();

    assert_eq!(config.connection.host, "10.1.1.1");
    assert_eq!(config.connection.port, 2323);
    assert_eq!(options.timeout, Duration::from_secs(3));
    assert_eq!(options.exit_command, "logout");
    assert_eq!(config.session.prompt_pattern, r"router[>#]\s*$");
    assert_eq!(config.login.username.as_deref(), Some("admin"));
    assert_eq!(config.login.password, None);
}

#[test]
fn test_round_trip_custom_values() {
    let mut config = ClientConfig::default();
    config.connection.host = "switch01".to_string();
    config.session.read_chunk_size = 512;
    config.login.username = Some("ops".to_string());
    config.logging.log_traffic = false;

    let parsed = ClientConfig::parse_config(&config.to_config_file_format()).unwrap();

    assert_eq!(parsed.connection.host, "switch01");
    assert_eq!(parsed.session.read_chunk_size, 512);
    assert_eq!(parsed.login.username.as_deref(), Some("ops"));
    assert!(!parsed.logging.log_traffic);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.conf");
    fs::write(&path, "[session]\npoll_interval_ms = 0\n").unwrap();

    let result = ClientConfig::load_from_file(&path);

    assert!(matches!(result, Err(ConfigError::InvalidValue(key, _)) if key == "poll_interval_ms"));
}
