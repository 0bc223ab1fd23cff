//! Per-block driver.

use rollhub_state_support_types::WriteTrackingState;
use rollhub_state_types::{HubWriteBatch, IHubStateAccessor};

use crate::{
    context::{BlockContext, ExecContext},
    events::HubEvent,
    hooks::{RollappHooks, SequencerKeeper},
    keeper::RollappKeeper,
};

/// Describes the output of executing a hub block.
#[derive(Debug, Clone)]
pub struct BlockExecutionOutput {
    /// Events emitted by the block's operations, in order.
    events: Vec<HubEvent>,

    /// Changes to the hub state we store in the database.
    write_batch: HubWriteBatch,
}

impl BlockExecutionOutput {
    pub fn new(events: Vec<HubEvent>, write_batch: HubWriteBatch) -> Self {
        Self {
            events,
            write_batch,
        }
    }

    pub fn events(&self) -> &[HubEvent] {
        &self.events
    }

    pub fn write_batch(&self) -> &HubWriteBatch {
        &self.write_batch
    }

    pub fn into_parts(self) -> (Vec<HubEvent>, HubWriteBatch) {
        (self.events, self.write_batch)
    }
}

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    /// End of block processing: finalization sweep, then liveness sweep.
    pub fn end_block<S: IHubStateAccessor>(&self, state: &mut S, ctx: &mut ExecContext) {
        self.finalize_rollapp_states(state, ctx);
        self.check_liveness(state, ctx);
    }

    /// Executes a hub block on top of `base` without touching it.
    ///
    /// `txs` runs the block's transactions against the block's write layer,
    /// then the end-block sweeps run. The returned batch holds every write
    /// of the block.
    pub fn execute_block<S, F>(&self, base: &S, block: BlockContext, txs: F) -> BlockExecutionOutput
    where
        S: IHubStateAccessor,
        F: FnOnce(&Self, &mut WriteTrackingState<'_, S>, &mut ExecContext),
    {
        let mut layer = WriteTrackingState::new(base);
        let mut ctx = ExecContext::new(block);

        txs(self, &mut layer, &mut ctx);
        self.end_block(&mut layer, &mut ctx);

        BlockExecutionOutput::new(ctx.into_output().into_events(), layer.into_batch())
    }
}

#[cfg(test)]
mod tests {
    use rollhub_state_types::{HubState, StateStatus};
    use rollhub_test_utils::test_rollapp_id;

    use super::*;
    use crate::{invariants::check_all, test_utils::*};

    #[test]
    fn test_execute_block_leaves_base_untouched() {
        let keeper = noop_keeper(test_params(2));
        let id = test_rollapp_id(1);
        let mut state = state_with_rollapps(&keeper, &[id.clone()]);
        let snapshot = state.clone();

        let out = keeper.execute_block(&state, BlockContext::new(1, 0), |k, s, ctx| {
            k.update_state(s, ctx, make_update(&id, 1, 10)).unwrap();
        });
        assert_eq!(state, snapshot);
        assert_eq!(out.events().len(), 1);
        assert!(!out.write_batch().is_empty());

        let (_, batch) = out.into_parts();
        state.apply_write_batch(batch);
        assert_eq!(state.latest_state_index(&id), Some(1));
    }

    #[test]
    fn test_blocks_drive_finalization_and_liveness() {
        let keeper = noop_keeper(test_params(2));
        let id = test_rollapp_id(1);
        let mut state: HubState = state_with_rollapps(&keeper, &[id.clone()]);

        let mut events = Vec::new();
        for h in 1..=20 {
            let out = keeper.execute_block(&state, BlockContext::new(h, h * 3600), |k, s, ctx| {
                if h == 1 {
                    k.update_state(s, ctx, make_update(&id, 1, 10)).unwrap();
                }
            });
            let (evs, batch) = out.into_parts();
            state.apply_write_batch(batch);
            events.extend(evs.into_iter().map(|ev| (h, ev)));
            assert!(check_all(&state).is_empty(), "height {h}");
        }

        assert!(events.iter().any(|(h, ev)| *h == 3
            && matches!(ev, HubEvent::StatusChange { status: StateStatus::Finalized, .. })));
        let slashes: Vec<_> = events
            .iter()
            .filter(|(_, ev)| matches!(ev, HubEvent::LivenessSlash { .. }))
            .map(|(h, _)| *h)
            .collect();
        assert_eq!(slashes, (13..=20).collect::<Vec<_>>());
    }
}
