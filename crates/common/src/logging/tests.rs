//! Unit tests for the logging subsystem.

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;

use super::{service::build_logger_config, types::*, *};

#[test]
fn test_format_service_name() {
    assert_eq!(format_service_name("rollhub-sim", None), "rollhub-sim");
    assert_eq!(
        format_service_name("rollhub-sim", Some("dev")),
        "rollhub-sim%dev"
    );
}

#[test]
fn test_logger_config_defaults() {
    let config = LoggerConfig::new("test-service".to_string());
    assert_eq!(config.service_name, "test-service");
    assert_eq!(config.default_directive, DEFAULT_LOG_DIRECTIVE);
    assert!(!config.stdout_config.json_format);
    assert!(config.file_logging_config.is_none());
}

#[test]
fn test_logger_config_builder_pattern() {
    let file_config = FileLoggingConfig::new("/tmp/logs".into(), "rollhub".to_string())
        .with_rotation(Rotation::HOURLY)
        .with_json_format(true);

    let config = LoggerConfig::new("test-service".to_string())
        .with_json_logging(true)
        .with_fmt_span(FmtSpan::CLOSE)
        .with_default_directive("debug")
        .with_file_logging(file_config);

    assert!(config.stdout_config.json_format);
    assert_eq!(config.default_directive, "debug");
    let file = config.file_logging_config.expect("file config set");
    assert_eq!(file.file_name_prefix, "rollhub");
    assert_eq!(file.rotation, Rotation::HOURLY);
    assert!(file.json_format);
}

#[test]
fn test_build_logger_config_uses_default_prefix() {
    let dir = Path::new("/var/log/rollhub");
    let init_config = LoggingInitConfig {
        service_base_name: "rollhub-sim",
        service_label: Some("prod"),
        log_dir: Some(dir),
        log_file_prefix: None,
        json_format: Some(true),
        default_log_prefix: "rollhub-sim",
    };

    let config = build_logger_config(&init_config);
    assert_eq!(config.service_name, "rollhub-sim%prod");
    assert!(config.stdout_config.json_format);

    let file = config.file_logging_config.expect("file logging enabled");
    assert_eq!(file.directory, dir);
    assert_eq!(file.file_name_prefix, "rollhub-sim");
    assert_eq!(file.rotation, Rotation::DAILY);
}

#[test]
fn test_build_logger_config_without_file_logging() {
    let init_config = LoggingInitConfig {
        service_base_name: "rollhub-sim",
        service_label: None,
        log_dir: None,
        log_file_prefix: Some("ignored"),
        json_format: None,
        default_log_prefix: "rollhub-sim",
    };

    let config = build_logger_config(&init_config);
    assert!(config.file_logging_config.is_none());
    assert!(!config.stdout_config.json_format);
}

#[test]
fn test_init_with_file_logging_returns_guard() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = LoggerConfig::new("test-service".to_string())
        .with_file_logging(FileLoggingConfig::new(dir.path().to_path_buf(), "t".into()));

    // Only one test installs the global subscriber.
    let guard = init(config).expect("first init succeeds");
    assert!(guard.has_file_writer());

    let second = init(LoggerConfig::default());
    assert!(second.is_err(), "global subscriber can only be set once");
}
