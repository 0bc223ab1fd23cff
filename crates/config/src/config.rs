use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rollhub_state_types::{HubParams, ParamsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::SimConfig;

/// Default value for `datadir` in [`Config`].
const DEFAULT_DATADIR: &str = "rollhub-data";

/// Default value for `db_retry_count` in [`Config`].
const DEFAULT_DB_RETRY_COUNT: u16 = 3;

/// Default DB retry delay in ms.
const DEFAULT_DB_RETRY_DELAY: u64 = 150;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid hub params: {0}")]
    Params(#[from] ParamsError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, Eq, PartialEq)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The data directory where database contents reside.
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,

    /// For optimistic transactions, how many times to retry if a write fails.
    #[serde(default = "default_db_retry_count")]
    pub db_retry_count: u16,

    /// Db retry delay in ms.
    #[serde(default = "default_db_retry_delay")]
    pub db_retry_delay_ms: u64,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Finalization and liveness parameters.
    #[serde(default)]
    pub params: HubParams,

    /// Simulator workload.
    #[serde(default)]
    pub sim: SimConfig,
}

fn default_datadir() -> PathBuf {
    DEFAULT_DATADIR.into()
}

fn default_db_retry_count() -> u16 {
    DEFAULT_DB_RETRY_COUNT
}

fn default_db_retry_delay() -> u64 {
    DEFAULT_DB_RETRY_DELAY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
            db_retry_count: DEFAULT_DB_RETRY_COUNT,
            db_retry_delay_ms: DEFAULT_DB_RETRY_DELAY,
            logging: LoggingConfig::default(),
            params: HubParams::default(),
            sim: SimConfig::default(),
        }
    }
}

impl Config {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        if let Some(msg) = self.sim.check() {
            return Err(ConfigError::Invalid(msg));
        }
        Ok(())
    }
}

/// Reads the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&raw)
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;
    use crate::sim::FraudConfig;

    #[test]
    fn test_config_load() {
        let config_string = r#"
            datadir = "/path/to/data/directory"
            db_retry_count = 5

            [logging]
            service_label = "dev"
            json_format = true

            [params]
            dispute_period_in_blocks = 10
            hub_block_interval_secs = 3600

            [sim]
            num_rollapps = 4
            seed = 42

            [sim.fraud]
            hub_height = 55
            rollapp = 1
        "#;

        let config = Config::from_toml_str(config_string);
        assert!(
            config.is_ok(),
            "should be able to load TOML config but got: {:?}",
            config.err()
        );
        let config = config.unwrap();

        assert_eq!(config.datadir, PathBuf::from("/path/to/data/directory"));
        assert_eq!(config.db_retry_count, 5);
        assert_eq!(config.db_retry_delay_ms, DEFAULT_DB_RETRY_DELAY);
        assert_eq!(config.logging.service_label.as_deref(), Some("dev"));
        assert_eq!(config.logging.json_format, Some(true));
        assert_eq!(config.params.dispute_period_in_blocks, 10);
        assert_eq!(config.params.hub_block_interval_secs, 3600);
        assert_eq!(
            config.params.liveness_jail_time_secs,
            HubParams::default().liveness_jail_time_secs
        );
        assert_eq!(config.sim.num_rollapps, 4);
        assert_eq!(config.sim.seed, 42);
        assert_eq!(
            config.sim.fraud,
            Some(FraudConfig {
                hub_height: 55,
                rollapp: 1
            })
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.datadir, PathBuf::from(DEFAULT_DATADIR));
        assert_eq!(config.params, HubParams::default());
        assert_eq!(config.sim, SimConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let res = Config::from_toml_str(
            r#"
            [params]
            dispute_period_in_blocks = 0
            "#,
        );
        assert!(matches!(
            res,
            Err(ConfigError::Params(ParamsError::DisputePeriodTooShort))
        ));

        let res = Config::from_toml_str(
            r#"
            [params]
            liveness_slash_time_no_update_secs = 100
            liveness_jail_time_secs = 50
            "#,
        );
        assert!(matches!(
            res,
            Err(ConfigError::Params(ParamsError::JailBeforeSlash { .. }))
        ));
    }

    #[test]
    fn test_invalid_sim_rejected() {
        for doc in [
            "[sim]\nnum_rollapps = 0",
            "[sim]\nsubmit_percent = 101",
            "[sim]\nmax_batch_blocks = 0",
            "[sim]\nnum_rollapps = 2\n[sim.fraud]\nhub_height = 3\nrollapp = 2",
        ] {
            let res = Config::from_toml_str(doc);
            assert!(
                matches!(res, Err(ConfigError::Invalid(_))),
                "expected rejection for {doc:?}, got {res:?}"
            );
        }
    }

    #[test]
    fn test_malformed_toml() {
        let res = Config::from_toml_str("datadir = [");
        assert!(matches!(res, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sim]\nblocks = 7").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.sim.blocks, 7);

        let missing = load_config(Path::new("/nonexistent/rollhub.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
