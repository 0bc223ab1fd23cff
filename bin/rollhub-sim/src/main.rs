//! Rollhub simulator binary entrypoint.
//!
//! Drives synthetic rollapps through the hub's finalization pipeline on a
//! sled database, checking invariants after every block.

use anyhow::{anyhow, Result};
use argh::from_env;
use rollhub_common::logging;
use rollhub_config::{load_config, Config};
use rollhub_db_store_sled::{open_hub_state_db, SledDbConfig, SLED_NAME};
use tracing::*;

use crate::{args::Args, sim::Simulator};

mod args;
mod sequencers;
mod sim;
mod workload;

fn main() -> Result<()> {
    let args: Args = from_env();

    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(|e| anyhow!("Failed to load configuration: {e}"))?,
        None => Config::default(),
    };
    args.override_config(&mut config);
    config.validate()?;

    let _log_guard = init_logging(&config)?;

    let db_config =
        SledDbConfig::new_with_constant_backoff(config.db_retry_count, config.db_retry_delay_ms);
    let db = open_hub_state_db(&config.datadir, SLED_NAME, db_config)?;

    let mut sim = Simulator::open(db, config.params.clone(), &config.sim)?;
    let start = sim.next_height();
    info!(datadir = %config.datadir.display(), %start, blocks = config.sim.blocks, "starting simulation");

    sim.run(config.sim.blocks)?;

    let stats = sim.stats();
    info!(
        last_height = sim.next_height() - 1,
        blocks = stats.blocks,
        state_updates = stats.state_updates,
        finalized = stats.finalized,
        hard_forks = stats.hard_forks,
        slashes = stats.slashes,
        jails = stats.jails,
        rejected_txs = stats.rejected_txs,
        "simulation finished"
    );

    let sequencers = sim.keeper().sequencers();
    info!(
        state_infos = sim.state().state_info_count(),
        slashes_applied = sequencers.slashes(),
        jails_applied = sequencers.jails(),
        heights_pruned = sequencers.prunes(),
        "final hub state"
    );
    Ok(())
}

fn init_logging(config: &Config) -> Result<logging::LoggingGuard> {
    logging::init_logging_from_config(logging::LoggingInitConfig {
        service_base_name: "rollhub-sim",
        service_label: config.logging.service_label.as_deref(),
        log_dir: config.logging.log_dir.as_deref(),
        log_file_prefix: config.logging.log_file_prefix.as_deref(),
        json_format: config.logging.json_format,
        default_log_prefix: "rollhub",
    })
    .map_err(|e| anyhow!("Failed to initialize logging: {e}"))
}
