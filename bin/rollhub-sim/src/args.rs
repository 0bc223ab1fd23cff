//! CLI argument parsing.

use std::path::PathBuf;

use argh::FromArgs;
use rollhub_config::{Config, FraudConfig};

#[derive(Clone, Debug, FromArgs)]
#[argh(description = "Rollhub finalization pipeline simulator")]
pub(crate) struct Args {
    // Config non-overriding args
    #[argh(option, short = 'c', description = "path to configuration")]
    pub(crate) config: Option<PathBuf>,

    // Config overriding args
    #[argh(
        option,
        short = 'd',
        description = "datadir path used mainly for databases"
    )]
    pub(crate) datadir: Option<PathBuf>,

    #[argh(option, short = 'n', description = "number of hub blocks to drive")]
    pub(crate) blocks: Option<u64>,

    #[argh(option, description = "seed for the synthetic workload")]
    pub(crate) seed: Option<u64>,

    #[argh(option, description = "hub height to inject a fraud proof at")]
    pub(crate) fraud_height: Option<u64>,

    #[argh(
        option,
        description = "synthetic rollapp the fraud proof targets (default 0)"
    )]
    pub(crate) fraud_rollapp: Option<u32>,

    #[argh(switch, description = "log in JSON format")]
    pub(crate) json_logs: bool,
}

impl Args {
    /// Applies the overriding args on top of the config file.
    pub(crate) fn override_config(&self, config: &mut Config) {
        if let Some(datadir) = &self.datadir {
            config.datadir = datadir.clone();
        }
        if let Some(blocks) = self.blocks {
            config.sim.blocks = blocks;
        }
        if let Some(seed) = self.seed {
            config.sim.seed = seed;
        }
        if let Some(hub_height) = self.fraud_height {
            config.sim.fraud = Some(FraudConfig {
                hub_height,
                rollapp: self.fraud_rollapp.unwrap_or(0),
            });
        }
        if self.json_logs {
            config.logging.json_format = Some(true);
        }
    }
}
