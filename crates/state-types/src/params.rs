use std::time::Duration;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default value for `dispute_period_in_blocks` in [`HubParams`].
const DEFAULT_DISPUTE_PERIOD_IN_BLOCKS: u64 = 120_960;

/// Default value for `hub_block_interval_secs` in [`HubParams`].
const DEFAULT_HUB_BLOCK_INTERVAL_SECS: u64 = 6;

/// Default value for `liveness_slash_time_no_update_secs`, 12h.
const DEFAULT_LIVENESS_SLASH_TIME_NO_UPDATE_SECS: u64 = 12 * 60 * 60;

/// Default value for `liveness_slash_interval_secs`, 1h.
const DEFAULT_LIVENESS_SLASH_INTERVAL_SECS: u64 = 60 * 60;

/// Default value for `liveness_jail_time_secs`, 48h.
const DEFAULT_LIVENESS_JAIL_TIME_SECS: u64 = 48 * 60 * 60;

/// Minimum accepted dispute period.
pub const MIN_DISPUTE_PERIOD_IN_BLOCKS: u64 = 1;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("dispute period in blocks must be at least {MIN_DISPUTE_PERIOD_IN_BLOCKS}")]
    DisputePeriodTooShort,

    #[error("{0} must be non-zero")]
    ZeroDuration(&'static str),

    #[error("jail time ({jail}s) must not be below slash time ({slash}s)")]
    JailBeforeSlash { slash: u64, jail: u64 },
}

/// Parameters governing finalization and liveness of rollapps on the hub.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct HubParams {
    /// Number of hub blocks a batch stays disputable.
    #[serde(default = "default_dispute_period_in_blocks")]
    pub dispute_period_in_blocks: u64,

    /// Expected wall time between hub blocks, used to convert liveness
    /// durations into block counts.
    #[serde(default = "default_hub_block_interval_secs")]
    pub hub_block_interval_secs: u64,

    /// Downtime after which the first liveness slash happens.
    #[serde(default = "default_liveness_slash_time_no_update_secs")]
    pub liveness_slash_time_no_update_secs: u64,

    /// Spacing between consecutive liveness slashes.
    #[serde(default = "default_liveness_slash_interval_secs")]
    pub liveness_slash_interval_secs: u64,

    /// Downtime after which the sequencer is jailed instead of slashed.
    #[serde(default = "default_liveness_jail_time_secs")]
    pub liveness_jail_time_secs: u64,
}

fn default_dispute_period_in_blocks() -> u64 {
    DEFAULT_DISPUTE_PERIOD_IN_BLOCKS
}

fn default_hub_block_interval_secs() -> u64 {
    DEFAULT_HUB_BLOCK_INTERVAL_SECS
}

fn default_liveness_slash_time_no_update_secs() -> u64 {
    DEFAULT_LIVENESS_SLASH_TIME_NO_UPDATE_SECS
}

fn default_liveness_slash_interval_secs() -> u64 {
    DEFAULT_LIVENESS_SLASH_INTERVAL_SECS
}

fn default_liveness_jail_time_secs() -> u64 {
    DEFAULT_LIVENESS_JAIL_TIME_SECS
}

impl Default for HubParams {
    fn default() -> Self {
        Self {
            dispute_period_in_blocks: DEFAULT_DISPUTE_PERIOD_IN_BLOCKS,
            hub_block_interval_secs: DEFAULT_HUB_BLOCK_INTERVAL_SECS,
            liveness_slash_time_no_update_secs: DEFAULT_LIVENESS_SLASH_TIME_NO_UPDATE_SECS,
            liveness_slash_interval_secs: DEFAULT_LIVENESS_SLASH_INTERVAL_SECS,
            liveness_jail_time_secs: DEFAULT_LIVENESS_JAIL_TIME_SECS,
        }
    }
}

impl HubParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.dispute_period_in_blocks < MIN_DISPUTE_PERIOD_IN_BLOCKS {
            return Err(ParamsError::DisputePeriodTooShort);
        }
        if self.hub_block_interval_secs == 0 {
            return Err(ParamsError::ZeroDuration("hub_block_interval_secs"));
        }
        if self.liveness_slash_time_no_update_secs == 0 {
            return Err(ParamsError::ZeroDuration(
                "liveness_slash_time_no_update_secs",
            ));
        }
        if self.liveness_slash_interval_secs == 0 {
            return Err(ParamsError::ZeroDuration("liveness_slash_interval_secs"));
        }
        if self.liveness_jail_time_secs < self.liveness_slash_time_no_update_secs {
            return Err(ParamsError::JailBeforeSlash {
                slash: self.liveness_slash_time_no_update_secs,
                jail: self.liveness_jail_time_secs,
            });
        }
        Ok(())
    }

    pub fn hub_block_interval(&self) -> Duration {
        Duration::from_secs(self.hub_block_interval_secs)
    }

    pub fn liveness_slash_time_no_update(&self) -> Duration {
        Duration::from_secs(self.liveness_slash_time_no_update_secs)
    }

    pub fn liveness_slash_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_slash_interval_secs)
    }

    pub fn liveness_jail_time(&self) -> Duration {
        Duration::from_secs(self.liveness_jail_time_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert_eq!(HubParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_params_partial_toml_uses_defaults() {
        let params: HubParams = toml::from_str("dispute_period_in_blocks = 5").unwrap();
        assert_eq!(params.dispute_period_in_blocks, 5);
        assert_eq!(
            params.liveness_jail_time_secs,
            DEFAULT_LIVENESS_JAIL_TIME_SECS
        );
    }

    #[test]
    fn test_params_rejects_bad_values() {
        let params = HubParams {
            dispute_period_in_blocks: 0,
            ..Default::default()
        };
        assert_eq!(params.validate(), Err(ParamsError::DisputePeriodTooShort));

        let params = HubParams {
            liveness_slash_interval_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::ZeroDuration(_))
        ));

        let params = HubParams {
            liveness_jail_time_secs: 60,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::JailBeforeSlash { .. })
        ));
    }
}
