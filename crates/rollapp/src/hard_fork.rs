//! Rewinding a rollapp's state log after fraud.

use std::collections::BTreeSet;

use rollhub_identifiers::{RollappHeight, RollappId};
use rollhub_state_types::{IHubStateAccessor, StateInfo};
use tracing::*;

use crate::{
    context::ExecContext,
    errors::{RollappError, RollappResult},
    events::HubEvent,
    finalization_queue::prune_above,
    hooks::{RollappHooks, SequencerKeeper},
    keeper::{atomically, RollappKeeper},
    state_log::{find_state_info_by_height, get_state_info, latest_state_info},
};

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    /// Forks the rollapp at `fraud_height`, dropping every pending block from
    /// there on and starting a new revision right after the last kept block.
    ///
    /// Either fully applies or leaves no writes.
    pub fn hard_fork<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
        fraud_height: RollappHeight,
    ) -> RollappResult<()> {
        atomically(state, ctx, |s, ctx| {
            self.hard_fork_inner(s, ctx, rollapp_id, fraud_height)
        })
    }

    /// Forks the rollapp right after its latest posted block.
    pub fn hard_fork_to_latest<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
    ) -> RollappResult<()> {
        atomically(state, ctx, |s, ctx| {
            self.hard_fork_to_latest_inner(s, ctx, rollapp_id)
        })
    }

    /// Freezes the rollapp for good, forking away its pending state if the
    /// latest batch isn't finalized yet.
    pub fn mark_obsolete<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
    ) -> RollappResult<()> {
        atomically(state, ctx, |s, ctx| {
            let mut rollapp = s
                .get_rollapp(rollapp_id)
                .cloned()
                .ok_or_else(|| RollappError::UnknownRollapp(rollapp_id.clone()))?;
            rollapp.freeze();
            s.put_rollapp(rollapp);

            let has_pending = latest_state_info(s, rollapp_id)?.is_some_and(|si| !si.is_finalized());
            if has_pending {
                self.hard_fork_to_latest_inner(s, ctx, rollapp_id)?;
            } else {
                info!(%rollapp_id, "no pending state to fork on obsolete rollapp");
            }

            warn!(%rollapp_id, "marked rollapp obsolete");
            Ok(())
        })
    }

    pub(crate) fn hard_fork_to_latest_inner<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
    ) -> RollappResult<()> {
        let latest = latest_state_info(state, rollapp_id)?
            .ok_or_else(|| RollappError::NoStateUpdates(rollapp_id.clone()))?;
        let fraud_height = latest.latest_height() + 1;
        self.hard_fork_inner(state, ctx, rollapp_id, fraud_height)
    }

    fn hard_fork_inner<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
        fraud_height: RollappHeight,
    ) -> RollappResult<()> {
        let mut rollapp = state
            .get_rollapp(rollapp_id)
            .cloned()
            .ok_or_else(|| RollappError::UnknownRollapp(rollapp_id.clone()))?;

        let last_height = self.revert_pending_states(state, rollapp_id, fraud_height)?;

        let revision = rollapp.bump_revision(last_height + 1);
        state.put_rollapp(rollapp);

        self.reset_liveness_clock(state, rollapp_id, ctx.height())?;

        self.hooks()
            .on_hard_fork(rollapp_id, last_height + 1)
            .map_err(|e| RollappError::Hook("on_hard_fork", e))?;

        warn!(%rollapp_id, %fraud_height, revision = %revision.number(), %last_height, "hard forked rollapp");
        ctx.emit(HubEvent::HardFork {
            rollapp_id: rollapp_id.clone(),
            fraud_height,
            revision: revision.number(),
            revision_start_height: revision.start_height(),
        });
        Ok(())
    }

    /// Drops the rollapp's state from `fraud_height` on, returning the last
    /// rollapp height still committed.
    fn revert_pending_states<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        rollapp_id: &RollappId,
        fraud_height: RollappHeight,
    ) -> RollappResult<RollappHeight> {
        let located = match find_state_info_by_height(state, rollapp_id, fraud_height) {
            Ok(si) => si.clone(),
            Err(RollappError::StateNotExists(..)) => latest_state_info(state, rollapp_id)?
                .cloned()
                .ok_or_else(|| RollappError::NoStateUpdates(rollapp_id.clone()))?,
            Err(e) => return Err(e),
        };

        if located.is_finalized() {
            return Err(RollappError::AlreadyFinalized(
                rollapp_id.clone(),
                located.index().index(),
            ));
        }

        let kept = update_last_state_info(state, located, fraud_height)?;
        let kept_index = kept.index().index();
        let last_height = kept.latest_height();

        let latest_index = state
            .latest_state_index(rollapp_id)
            .ok_or_else(|| RollappError::NoStateUpdates(rollapp_id.clone()))?;

        let mut removed_sequencers = BTreeSet::new();
        for index in (kept_index + 1)..=latest_index {
            let info = get_state_info(state, rollapp_id, index)?;
            removed_sequencers.insert(info.sequencer().clone());
            state.del_state_info(rollapp_id, index);
        }
        state.set_latest_state_index(rollapp_id, kept_index);

        let unqueued = prune_above(state, rollapp_id, kept_index);
        debug!(%rollapp_id, %kept_index, removed = %(latest_index - kept_index), %unqueued, "reverted pending states");

        self.sequencers()
            .prune_sequencer_heights(&removed_sequencers, last_height)
            .map_err(|e| RollappError::Hook("prune_sequencer_heights", e))?;

        Ok(last_height)
    }
}

/// Makes the batch covering `fraud_height` the last one, truncating it or
/// stepping back to its predecessor. A `fraud_height` past the batch keeps
/// it whole. Returns the batch that's kept.
fn update_last_state_info<S: IHubStateAccessor>(
    state: &mut S,
    located: StateInfo,
    fraud_height: RollappHeight,
) -> RollappResult<StateInfo> {
    let rollapp_id = located.rollapp_id().clone();
    let index = located.index().index();

    if fraud_height < located.start_height() {
        return Err(RollappError::FraudHeightBeforeStart {
            rollapp_id,
            fraud_height,
            start_height: located.start_height(),
        });
    }

    let mut info = if fraud_height == located.start_height() {
        if index <= 1 {
            return Err(RollappError::NoPreviousState(rollapp_id));
        }
        let prev = get_state_info(state, &rollapp_id, index - 1)?.clone();
        // Finalized batches are never rewritten.
        if prev.is_finalized() {
            return Ok(prev);
        }
        prev
    } else {
        let mut info = located;
        if fraud_height <= info.latest_height() {
            info.truncate_from(fraud_height);
        }
        info
    };

    info.clear_next_proposer();
    state.put_state_info(info.clone());
    Ok(info)
}
