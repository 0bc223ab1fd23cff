use serde::{Deserialize, Serialize};

/// Default value for `num_rollapps` in [`SimConfig`].
const DEFAULT_NUM_ROLLAPPS: u32 = 3;

/// Default value for `blocks` in [`SimConfig`].
const DEFAULT_BLOCKS: u64 = 200;

/// Default value for `max_batch_blocks` in [`SimConfig`].
const DEFAULT_MAX_BATCH_BLOCKS: u64 = 10;

/// Default value for `submit_percent` in [`SimConfig`].
const DEFAULT_SUBMIT_PERCENT: u8 = 50;

/// Synthetic workload driven by the simulator.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// How many synthetic rollapps get registered on a fresh database.
    #[serde(default = "default_num_rollapps")]
    pub num_rollapps: u32,

    /// Hub blocks to drive per run.
    #[serde(default = "default_blocks")]
    pub blocks: u64,

    /// Upper bound on the rollapp blocks covered by one batch.
    #[serde(default = "default_max_batch_blocks")]
    pub max_batch_blocks: u64,

    /// Chance, in percent, that a rollapp submits a batch in a given hub block.
    #[serde(default = "default_submit_percent")]
    pub submit_percent: u8,

    /// Seed for the workload RNG.
    #[serde(default)]
    pub seed: u64,

    /// Optional fraud proof injected during the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud: Option<FraudConfig>,
}

/// A fraud proof against one synthetic rollapp.
///
/// At `hub_height` the simulator hard forks the rollapp at the first rollapp
/// height still awaiting finalization.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct FraudConfig {
    pub hub_height: u64,
    pub rollapp: u32,
}

fn default_num_rollapps() -> u32 {
    DEFAULT_NUM_ROLLAPPS
}

fn default_blocks() -> u64 {
    DEFAULT_BLOCKS
}

fn default_max_batch_blocks() -> u64 {
    DEFAULT_MAX_BATCH_BLOCKS
}

fn default_submit_percent() -> u8 {
    DEFAULT_SUBMIT_PERCENT
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_rollapps: DEFAULT_NUM_ROLLAPPS,
            blocks: DEFAULT_BLOCKS,
            max_batch_blocks: DEFAULT_MAX_BATCH_BLOCKS,
            submit_percent: DEFAULT_SUBMIT_PERCENT,
            seed: 0,
            fraud: None,
        }
    }
}

impl SimConfig {
    /// Returns a description of the first problem found, if any.
    pub(crate) fn check(&self) -> Option<String> {
        if self.num_rollapps == 0 {
            return Some("sim.num_rollapps must be at least 1".to_owned());
        }
        if self.max_batch_blocks == 0 {
            return Some("sim.max_batch_blocks must be at least 1".to_owned());
        }
        if self.submit_percent > 100 {
            return Some(format!(
                "sim.submit_percent must be at most 100, got {}",
                self.submit_percent
            ));
        }
        if let Some(fraud) = &self.fraud {
            if fraud.rollapp >= self.num_rollapps {
                return Some(format!(
                    "sim.fraud.rollapp {} is out of range for {} rollapps",
                    fraud.rollapp, self.num_rollapps
                ));
            }
        }
        None
    }
}
