//! Accepting new state batches from sequencers.

use rollhub_identifiers::{RollappHeight, RollappId, SequencerAddr, StateInfoIndex};
use rollhub_state_types::{BlockDescriptor, IHubStateAccessor, StateInfo};
use tracing::*;

use crate::{
    context::ExecContext,
    errors::{RollappError, RollappResult},
    events::HubEvent,
    finalization_queue::enqueue,
    hooks::{RollappHooks, SequencerKeeper},
    keeper::{atomically, RollappKeeper},
    state_log::append_state_info,
};

/// A batch submitted by a sequencer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateUpdate {
    pub creator: SequencerAddr,
    pub rollapp_id: RollappId,
    pub start_height: RollappHeight,
    pub num_blocks: u64,
    pub da_path: String,
    pub bds: Vec<BlockDescriptor>,
    pub next_proposer: Option<SequencerAddr>,
}

impl StateUpdate {
    /// Checks the batch is well formed on its own.
    fn validate(&self) -> RollappResult<()> {
        if self.start_height == 0 {
            return Err(RollappError::InvalidHeight(0));
        }
        if self.bds.is_empty() {
            return Err(RollappError::InvalidBatch("no block descriptors".to_owned()));
        }
        if self.num_blocks != self.bds.len() as u64 {
            return Err(RollappError::InvalidBatch(format!(
                "num_blocks {} doesn't match {} descriptors",
                self.num_blocks,
                self.bds.len()
            )));
        }
        for (expected, bd) in (self.start_height..).zip(&self.bds) {
            if bd.height() != expected {
                return Err(RollappError::InvalidBatch(format!(
                    "descriptor height {} where {expected} was expected",
                    bd.height()
                )));
            }
        }
        Ok(())
    }
}

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    /// Appends a batch to the rollapp's state log and queues it for
    /// finalization once the dispute period is over.
    ///
    /// Leaves no writes if anything fails.
    pub fn update_state<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        update: StateUpdate,
    ) -> RollappResult<StateInfoIndex> {
        atomically(state, ctx, |s, ctx| self.update_state_inner(s, ctx, update))
    }

    fn update_state_inner<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        update: StateUpdate,
    ) -> RollappResult<StateInfoIndex> {
        update.validate()?;

        let rollapp = state
            .get_rollapp(&update.rollapp_id)
            .cloned()
            .ok_or_else(|| RollappError::UnknownRollapp(update.rollapp_id.clone()))?;
        if rollapp.is_frozen() {
            return Err(RollappError::Frozen(update.rollapp_id));
        }

        let height = ctx.height();
        let info = StateInfo::new(
            StateInfoIndex::new(update.rollapp_id.clone(), 0),
            update.creator,
            update.start_height,
            update.da_path,
            height,
            ctx.block_context().timestamp(),
            update.next_proposer,
            update.bds,
        );

        self.hooks()
            .before_update_state(&update.rollapp_id, &info)
            .map_err(|e| RollappError::Hook("before_update_state", e))?;

        let start_height = info.start_height();
        let num_blocks = info.num_blocks();
        let sequencer = info.sequencer().clone();

        let index = append_state_info(state, &rollapp, info)?;
        enqueue(
            state,
            height + self.params().dispute_period_in_blocks,
            index.clone(),
        );
        self.indicate_liveness(state, &update.rollapp_id, height)?;

        debug!(rollapp_id = %update.rollapp_id, index = %index.index(), "accepted state update");
        ctx.emit(HubEvent::StateUpdate {
            rollapp_id: update.rollapp_id,
            index: index.index(),
            start_height,
            num_blocks,
            sequencer,
            creation_height: height,
        });
        Ok(index)
    }
}
