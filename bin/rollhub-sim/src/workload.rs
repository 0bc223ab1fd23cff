//! Synthetic rollapps and the batches their sequencers post.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rollhub_config::SimConfig;
use rollhub_identifiers::{Buf32, HubHeight, RollappHeight, RollappId, SequencerAddr};
use rollhub_rollapp::{state_log, RollappResult, StateUpdate};
use rollhub_state_types::{BlockDescriptor, IHubStateAccessor, Rollapp};

/// DRS version stamped on every synthetic block.
const SIM_DRS_VERSION: u32 = 1;

/// Owner recorded on synthetic rollapps.
const SIM_OWNER: &str = "rollhub-sim";

/// Id of the `n`th synthetic rollapp.
pub(crate) fn sim_rollapp_id(n: u32) -> RollappId {
    RollappId::new(format!("simapp{n}_{}-1", 9000 + n))
}

fn sim_sequencer(id: &RollappId) -> SequencerAddr {
    SequencerAddr::new(format!("simseq-{id}"))
}

/// Fresh records for every configured synthetic rollapp.
pub(crate) fn sim_rollapps(cfg: &SimConfig) -> Vec<Rollapp> {
    (0..cfg.num_rollapps)
        .map(|n| Rollapp::new(sim_rollapp_id(n), SIM_OWNER.to_owned(), 1))
        .collect()
}

/// Seeded source of rollapp activity.
#[derive(Debug)]
pub(crate) struct Workload {
    rng: StdRng,
    max_batch_blocks: u64,
    submit_percent: u8,
}

impl Workload {
    /// Creates the workload for a run starting at `start_height`.
    ///
    /// Resumed runs are mixed with their start height so they don't replay
    /// the same choices.
    pub(crate) fn new(cfg: &SimConfig, start_height: HubHeight) -> Self {
        Self {
            rng: StdRng::seed_from_u64(cfg.seed ^ start_height.rotate_left(32)),
            max_batch_blocks: cfg.max_batch_blocks,
            submit_percent: cfg.submit_percent,
        }
    }

    /// Decides whether the rollapp posts this block.
    pub(crate) fn should_submit(&mut self) -> bool {
        self.rng.gen_range(0..100u8) < self.submit_percent
    }

    /// Builds the next batch continuing the rollapp's log.
    pub(crate) fn next_update<S: IHubStateAccessor>(
        &mut self,
        state: &S,
        rollapp: &Rollapp,
        timestamp: u64,
    ) -> RollappResult<StateUpdate> {
        let id = rollapp.rollapp_id();
        let start_height = match state_log::latest_state_info(state, id)? {
            Some(prev) => prev.latest_height() + 1,
            None => rollapp.genesis_height(),
        };
        let num_blocks = self.rng.gen_range(1..=self.max_batch_blocks);

        let bds = (start_height..start_height + num_blocks)
            .map(|h| {
                BlockDescriptor::new(h, Buf32::new(self.rng.gen()), timestamp, SIM_DRS_VERSION)
            })
            .collect();

        Ok(StateUpdate {
            creator: sim_sequencer(id),
            rollapp_id: id.clone(),
            start_height,
            num_blocks,
            da_path: format!("sim://{id}/{start_height}"),
            bds,
            next_proposer: None,
        })
    }

    /// Picks a rollapp height in the not yet finalized part of the log.
    ///
    /// Returns `None` if nothing is pending.
    pub(crate) fn fraud_height<S: IHubStateAccessor>(
        &mut self,
        state: &S,
        id: &RollappId,
    ) -> RollappResult<Option<RollappHeight>> {
        let Some(latest) = state_log::latest_state_info(state, id)? else {
            return Ok(None);
        };
        if latest.is_finalized() {
            return Ok(None);
        }

        let first_pending = state.latest_finalized_index(id).unwrap_or(0) + 1;
        let from = state_log::get_state_info(state, id, first_pending)?.start_height();
        Ok(Some(self.rng.gen_range(from..=latest.latest_height())))
    }
}
