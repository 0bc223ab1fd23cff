//! Collaborators the pipeline calls out to.
//!
//! These are handed to [`RollappKeeper`](crate::RollappKeeper) at
//! construction, there is no global registry.

use std::collections::BTreeSet;

use rollhub_identifiers::{RollappHeight, RollappId, SequencerAddr};
use rollhub_state_types::StateInfo;

/// Hooks into the modules depending on rollapp state.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait RollappHooks {
    /// Called before a batch is appended, an error rejects the update.
    ///
    /// This is where the submitter is checked against the rollapp's
    /// current proposer.
    fn before_update_state(&self, rollapp_id: &RollappId, info: &StateInfo) -> anyhow::Result<()>;

    /// Called for each batch as it gets finalized.
    ///
    /// An error reverts that batch's finalization, it is retried on a later
    /// block.
    fn after_state_finalized(&self, rollapp_id: &RollappId, info: &StateInfo)
        -> anyhow::Result<()>;

    /// Called once a hard fork has rewound a rollapp's state log.
    ///
    /// An error aborts the hard fork.
    fn on_hard_fork(
        &self,
        rollapp_id: &RollappId,
        new_start_height: RollappHeight,
    ) -> anyhow::Result<()>;
}

/// Sequencer module operations driven by the rollapp pipeline.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait SequencerKeeper {
    /// Slashes the rollapp's proposer for missing its liveness deadline.
    fn slash_liveness(&self, rollapp_id: &RollappId) -> anyhow::Result<()>;

    /// Jails the rollapp's proposer for prolonged downtime.
    fn jail_liveness(&self, rollapp_id: &RollappId) -> anyhow::Result<()>;

    /// Drops the sequencers' recorded heights above `last_height`, called
    /// with every sequencer whose batches a hard fork removed.
    fn prune_sequencer_heights(
        &self,
        sequencers: &BTreeSet<SequencerAddr>,
        last_height: RollappHeight,
    ) -> anyhow::Result<()>;
}

/// Hooks implementation that accepts everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopHooks;

impl RollappHooks for NoopHooks {
    fn before_update_state(&self, _: &RollappId, _: &StateInfo) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_state_finalized(&self, _: &RollappId, _: &StateInfo) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_hard_fork(&self, _: &RollappId, _: RollappHeight) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Sequencer keeper that does nothing, for hubs without a sequencer module.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopSequencers;

impl SequencerKeeper for NoopSequencers {
    fn slash_liveness(&self, _: &RollappId) -> anyhow::Result<()> {
        Ok(())
    }

    fn jail_liveness(&self, _: &RollappId) -> anyhow::Result<()> {
        Ok(())
    }

    fn prune_sequencer_heights(
        &self,
        _: &BTreeSet<SequencerAddr>,
        _: RollappHeight,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
