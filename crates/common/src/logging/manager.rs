//! Logging initialization.

use tracing::*;
use tracing_appender::{non_blocking::WorkerGuard, rolling::RollingFileAppender};
use tracing_subscriber::{
    fmt::layer, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
    Layer,
};

use super::types::LoggerConfig;

/// Keeps the background file writer alive.
///
/// Dropping this flushes and stops the file layer, so binaries hold it until
/// they exit.
#[derive(Debug)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn has_file_writer(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Builds the filter from `RUST_LOG`, falling back to `default_directive`.
pub fn build_env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initializes the logging subsystem with the provided config.
///
/// Fails if a global subscriber was already installed.
pub fn init(config: LoggerConfig) -> Result<LoggingGuard, TryInitError> {
    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(build_env_filter(&config.default_directive))
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(build_env_filter(&config.default_directive))
            .boxed()
    };

    let mut file_guard = None;
    let file_layer = config.file_logging_config.as_ref().map(|file_config| {
        let file_appender = RollingFileAppender::new(
            file_config.rotation.clone(),
            &file_config.directory,
            &file_config.file_name_prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);

        if file_config.json_format {
            layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(build_env_filter(&config.default_directive))
                .boxed()
        } else {
            layer()
                .compact()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(build_env_filter(&config.default_directive))
                .boxed()
        }
    });

    tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer)
        .try_init()?;

    info!(
        service_name = %config.service_name,
        file_logging = file_guard.is_some(),
        "logging initialized"
    );

    Ok(LoggingGuard { file_guard })
}
