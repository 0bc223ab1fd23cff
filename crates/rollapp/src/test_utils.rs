//! Shared fixtures for the pipeline tests.

use rollhub_identifiers::{HubHeight, RollappHeight, RollappId, StateInfoIndex};
use rollhub_state_types::{HubParams, HubState};
use rollhub_test_utils::{test_block_descriptors, test_rollapp, test_sequencer};

use crate::{
    context::{BlockContext, ExecContext},
    hooks::{NoopHooks, NoopSequencers, RollappHooks, SequencerKeeper},
    keeper::RollappKeeper,
    update_state::StateUpdate,
};

/// Params with hour long hub blocks, so liveness heights read as hours:
/// first slash after 12, hourly slashes, jail at 48.
pub(crate) fn test_params(dispute_period_in_blocks: u64) -> HubParams {
    HubParams {
        dispute_period_in_blocks,
        hub_block_interval_secs: 3600,
        liveness_slash_time_no_update_secs: 12 * 3600,
        liveness_slash_interval_secs: 3600,
        liveness_jail_time_secs: 48 * 3600,
    }
}

pub(crate) fn noop_keeper(params: HubParams) -> RollappKeeper<NoopHooks, NoopSequencers> {
    RollappKeeper::new(params, NoopHooks, NoopSequencers)
}

pub(crate) fn ctx_at(height: HubHeight) -> ExecContext {
    ExecContext::new(BlockContext::new(height, 1_700_000_000 + height * 6))
}

pub(crate) fn state_with_rollapps<H: RollappHooks, Q: SequencerKeeper>(
    keeper: &RollappKeeper<H, Q>,
    ids: &[RollappId],
) -> HubState {
    let mut state = HubState::new();
    for id in ids {
        keeper
            .register_rollapp(&mut state, test_rollapp(id))
            .expect("test: register rollapp");
    }
    state
}

/// Well formed update of `n` blocks from `start`, posted by sequencer 1.
pub(crate) fn make_update(id: &RollappId, start: RollappHeight, n: u64) -> StateUpdate {
    StateUpdate {
        creator: test_sequencer(1),
        rollapp_id: id.clone(),
        start_height: start,
        num_blocks: n,
        da_path: format!("mock://{start}"),
        bds: test_block_descriptors(start, n),
        next_proposer: None,
    }
}

/// Posts an update at `hub_height`, panicking if it's rejected.
pub(crate) fn submit<H: RollappHooks, Q: SequencerKeeper>(
    keeper: &RollappKeeper<H, Q>,
    state: &mut HubState,
    id: &RollappId,
    start: RollappHeight,
    n: u64,
    hub_height: HubHeight,
) -> StateInfoIndex {
    let mut ctx = ctx_at(hub_height);
    keeper
        .update_state(state, &mut ctx, make_update(id, start, n))
        .expect("test: update state")
}
