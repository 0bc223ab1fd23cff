//! Per-block sweep finalizing batches whose dispute period is over.

use std::collections::BTreeSet;

use rollhub_identifiers::{RollappId, StateInfoIndex};
use rollhub_state_types::{FinalizationQueueEntry, IHubStateAccessor, StateStatus};
use tracing::*;

use crate::{
    context::ExecContext,
    errors::{RollappError, RollappResult},
    events::HubEvent,
    finalization_queue::dequeue_up_to,
    hooks::{RollappHooks, SequencerKeeper},
    keeper::{atomically, RollappKeeper},
    state_log::get_state_info,
};

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    /// Finalizes every queued batch due at or before the current hub height.
    ///
    /// Never fails as a whole. A rollapp with a failing batch is skipped for
    /// the rest of the sweep and its unprocessed batches stay queued under
    /// their original height, so they're retried next block.
    pub fn finalize_rollapp_states<S: IHubStateAccessor>(&self, state: &mut S, ctx: &mut ExecContext) {
        let due = dequeue_up_to(state, ctx.height());
        if due.is_empty() {
            return;
        }

        let mut failed = BTreeSet::new();
        let mut finalized = 0usize;
        for entry in due {
            finalized += self.finalize_queue_entry(state, ctx, entry, &mut failed);
        }

        debug!(height = %ctx.height(), %finalized, failed = %failed.len(), "finished finalization sweep");
    }

    /// Finalizes the batches of one queue entry in order, re-enqueueing what's
    /// left from the first failure on. Returns how many were finalized.
    fn finalize_queue_entry<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        entry: FinalizationQueueEntry,
        failed: &mut BTreeSet<RollappId>,
    ) -> usize {
        let height = entry.finalization_height();
        let rollapp_id = entry.rollapp_id().clone();

        let mut finalized = 0;
        let mut leftover = Vec::new();
        for index in entry.into_pending() {
            if failed.contains(&rollapp_id) {
                leftover.push(index);
                continue;
            }

            let res = atomically(state, ctx, |s, ctx| self.finalize_pending(s, ctx, &index));
            match res {
                Ok(()) => finalized += 1,
                Err(e) => {
                    error!(%rollapp_id, index = %index.index(), %e, "failed to finalize state");
                    failed.insert(rollapp_id.clone());
                    leftover.push(index);
                }
            }
        }

        if !leftover.is_empty() {
            state.put_finalization_queue(FinalizationQueueEntry::new(height, rollapp_id, leftover));
        }

        finalized
    }

    fn finalize_pending<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        index: &StateInfoIndex,
    ) -> RollappResult<()> {
        let rollapp_id = index.rollapp_id();
        let mut info = get_state_info(state, rollapp_id, index.index())?.clone();
        if info.status() != StateStatus::Pending {
            return Err(RollappError::NotPending(rollapp_id.clone(), index.index()));
        }

        info.finalize();
        state.put_state_info(info.clone());
        state.set_latest_finalized_index(rollapp_id, index.index());

        self.hooks()
            .after_state_finalized(rollapp_id, &info)
            .map_err(|e| RollappError::Hook("after_state_finalized", e))?;

        trace!(%rollapp_id, index = %index.index(), "finalized state");
        ctx.emit(HubEvent::StatusChange {
            rollapp_id: rollapp_id.clone(),
            index: index.index(),
            status: StateStatus::Finalized,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use rollhub_state_types::HubState;
    use rollhub_test_utils::test_rollapp_id;

    use super::*;
    use crate::{
        finalization_queue::{all_entries, enqueue, entries_for_rollapp},
        hooks::{MockRollappHooks, NoopSequencers},
        invariants::check_all,
        test_utils::*,
    };

    #[test]
    fn test_ten_batches_at_height_15() {
        let keeper = noop_keeper(test_params(5));
        let id = test_rollapp_id(1);
        let mut state = state_with_rollapps(&keeper, &[id.clone()]);
        for i in 0..10 {
            submit(&keeper, &mut state, &id, 1 + i * 10, 10, 1 + i * 10);
        }

        let mut ctx = ctx_at(15);
        keeper.finalize_rollapp_states(&mut state, &mut ctx);

        assert!(get_state_info(&state, &id, 1).unwrap().is_finalized());
        assert_eq!(state.latest_finalized_index(&id), Some(1));
        for i in 2..=10 {
            assert_eq!(
                get_state_info(&state, &id, i).unwrap().status(),
                StateStatus::Pending
            );
        }
        assert_eq!(
            ctx.events(),
            &[HubEvent::StatusChange {
                rollapp_id: id.clone(),
                index: 1,
                status: StateStatus::Finalized,
            }]
        );
        assert!(check_all(&state).is_empty());
    }

    #[test]
    fn test_sweep_every_block_finalizes_in_order() {
        let keeper = noop_keeper(test_params(5));
        let id = test_rollapp_id(1);
        let mut state = state_with_rollapps(&keeper, &[id.clone()]);

        let mut finalized = Vec::new();
        for h in 1..=20 {
            let mut ctx = ctx_at(h);
            if h <= 10 {
                keeper
                    .update_state(&mut state, &mut ctx, make_update(&id, 1 + (h - 1) * 10, 10))
                    .unwrap();
            }
            keeper.finalize_rollapp_states(&mut state, &mut ctx);
            if let Some(idx) = state.latest_finalized_index(&id) {
                finalized.push((h, idx));
            }
            assert!(check_all(&state).is_empty(), "height {h}");
        }

        assert_eq!(finalized.first(), Some(&(6, 1)));
        assert_eq!(finalized.last(), Some(&(20, 10)));
        assert!(finalized.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(all_entries(&state).is_empty());
    }

    #[test]
    fn test_skipped_heights_are_caught_up() {
        let keeper = noop_keeper(test_params(5));
        let id = test_rollapp_id(1);
        let mut state = state_with_rollapps(&keeper, &[id.clone()]);
        for i in 0..4 {
            submit(&keeper, &mut state, &id, 1 + i * 10, 10, 1 + i);
        }

        let mut ctx = ctx_at(30);
        keeper.finalize_rollapp_states(&mut state, &mut ctx);
        assert_eq!(state.latest_finalized_index(&id), Some(4));
        assert_eq!(ctx.events().len(), 4);
    }

    #[test]
    fn test_hook_failure_requeues_rest_of_rollapp() {
        let a = test_rollapp_id(1);
        let b = test_rollapp_id(2);

        let failed_once = Arc::new(AtomicBool::new(false));
        let mut hooks = MockRollappHooks::new();
        hooks.expect_before_update_state().returning(|_, _| Ok(()));
        let fid = a.clone();
        let flag = failed_once.clone();
        hooks
            .expect_after_state_finalized()
            .returning(move |id, info| {
                if *id == fid && info.index().index() == 2 && !flag.swap(true, Ordering::SeqCst) {
                    return Err(anyhow::anyhow!("bank transfer failed"));
                }
                Ok(())
            });
        let keeper = RollappKeeper::new(test_params(5), hooks, NoopSequencers);

        let mut state = state_with_rollapps(&keeper, &[a.clone(), b.clone()]);
        submit(&keeper, &mut state, &a, 1, 10, 1);
        submit(&keeper, &mut state, &a, 11, 10, 1);
        submit(&keeper, &mut state, &b, 1, 10, 1);
        submit(&keeper, &mut state, &a, 21, 10, 2);

        let mut ctx = ctx_at(7);
        keeper.finalize_rollapp_states(&mut state, &mut ctx);
        assert!(failed_once.load(Ordering::SeqCst));

        assert_eq!(state.latest_finalized_index(&a), Some(1));
        assert_eq!(state.latest_finalized_index(&b), Some(1));
        assert!(!get_state_info(&state, &a, 2).unwrap().is_finalized());

        let left: Vec<_> = entries_for_rollapp(&state, &a)
            .into_iter()
            .map(|e| {
                let h = e.finalization_height();
                (h, e.into_pending().iter().map(|i| i.index()).collect::<Vec<_>>())
            })
            .collect();
        assert_eq!(left, vec![(6, vec![2]), (7, vec![3])]);
        assert!(entries_for_rollapp(&state, &b).is_empty());
        assert!(check_all(&state).is_empty());

        let mut ctx = ctx_at(8);
        keeper.finalize_rollapp_states(&mut state, &mut ctx);
        assert_eq!(state.latest_finalized_index(&a), Some(3));
        assert!(all_entries(&state).is_empty());
    }

    #[test]
    fn test_missing_state_info_does_not_block_others() {
        let keeper = noop_keeper(test_params(5));
        let a = test_rollapp_id(1);
        let b = test_rollapp_id(2);
        let mut state: HubState = state_with_rollapps(&keeper, &[a.clone(), b.clone()]);
        submit(&keeper, &mut state, &b, 1, 10, 1);
        enqueue(&mut state, 6, StateInfoIndex::new(a.clone(), 1));

        let mut ctx = ctx_at(6);
        keeper.finalize_rollapp_states(&mut state, &mut ctx);
        assert_eq!(state.latest_finalized_index(&b), Some(1));
        assert_eq!(state.latest_finalized_index(&a), None);
        assert_eq!(entries_for_rollapp(&state, &a).len(), 1);
    }
}
