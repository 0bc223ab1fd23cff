//! Configuration for the rollhub binaries.

mod config;
mod sim;

pub use config::{load_config, Config, ConfigError, LoggingConfig};
pub use sim::{FraudConfig, SimConfig};
