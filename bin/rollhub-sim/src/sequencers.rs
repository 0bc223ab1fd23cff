//! Sequencer module stand-in for the simulator.

use std::{
    collections::BTreeSet,
    sync::atomic::{AtomicU64, Ordering},
};

use rollhub_identifiers::{RollappHeight, RollappId, SequencerAddr};
use rollhub_rollapp::SequencerKeeper;
use tracing::*;

/// Records the penalties the pipeline hands out instead of applying them.
#[derive(Debug, Default)]
pub(crate) struct SimSequencers {
    slashes: AtomicU64,
    jails: AtomicU64,
    prunes: AtomicU64,
}

impl SimSequencers {
    pub(crate) fn slashes(&self) -> u64 {
        self.slashes.load(Ordering::Relaxed)
    }

    pub(crate) fn jails(&self) -> u64 {
        self.jails.load(Ordering::Relaxed)
    }

    pub(crate) fn prunes(&self) -> u64 {
        self.prunes.load(Ordering::Relaxed)
    }
}

impl SequencerKeeper for SimSequencers {
    fn slash_liveness(&self, rollapp_id: &RollappId) -> anyhow::Result<()> {
        self.slashes.fetch_add(1, Ordering::Relaxed);
        debug!(%rollapp_id, "slashing proposer");
        Ok(())
    }

    fn jail_liveness(&self, rollapp_id: &RollappId) -> anyhow::Result<()> {
        self.jails.fetch_add(1, Ordering::Relaxed);
        warn!(%rollapp_id, "jailing proposer");
        Ok(())
    }

    fn prune_sequencer_heights(
        &self,
        sequencers: &BTreeSet<SequencerAddr>,
        last_height: RollappHeight,
    ) -> anyhow::Result<()> {
        self.prunes.fetch_add(1, Ordering::Relaxed);
        debug!(sequencers = sequencers.len(), %last_height, "pruning sequencer heights");
        Ok(())
    }
}
