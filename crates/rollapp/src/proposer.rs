//! Reactions to proposer changes in the sequencer module.

use rollhub_identifiers::{RollappId, SequencerAddr};
use rollhub_state_types::IHubStateAccessor;
use tracing::*;

use crate::{
    context::ExecContext,
    errors::RollappResult,
    hooks::{RollappHooks, SequencerKeeper},
    keeper::{atomically, RollappKeeper},
};

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    /// Restarts the liveness countdown for a new proposer. With no proposer
    /// there's nobody to slash, so nothing gets scheduled.
    pub fn after_choose_new_proposer<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
        proposer: Option<&SequencerAddr>,
    ) -> RollappResult<()> {
        let height = ctx.height();
        atomically(state, ctx, |s, _| {
            self.reset_liveness_clock(s, rollapp_id, height)?;
            if let Some(proposer) = proposer {
                debug!(%rollapp_id, %proposer, "new proposer, rearming liveness");
                self.schedule_liveness_event(s, rollapp_id, height)?;
            }
            Ok(())
        })
    }

    /// The proposer was kicked, whatever it posted past the finalized state
    /// can't be trusted anymore.
    pub fn after_kick_proposer<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        rollapp_id: &RollappId,
    ) -> RollappResult<()> {
        info!(%rollapp_id, "proposer kicked, forking to latest");
        self.hard_fork_to_latest(state, ctx, rollapp_id)
    }
}

#[cfg(test)]
mod tests {
    use rollhub_test_utils::{test_rollapp_id, test_sequencer};

    use super::*;
    use crate::{events::HubEvent, test_utils::*};

    #[test]
    fn test_new_proposer_rearms_liveness() {
        let keeper = noop_keeper(test_params(5));
        let id = test_rollapp_id(1);
        let mut state = state_with_rollapps(&keeper, &[id.clone()]);
        submit(&keeper, &mut state, &id, 1, 10, 1);

        let mut ctx = ctx_at(5);
        keeper
            .after_choose_new_proposer(&mut state, &mut ctx, &id, Some(&test_sequencer(2)))
            .unwrap();
        let events = state.all_liveness_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].hub_height(), 17);

        keeper
            .after_choose_new_proposer(&mut state, &mut ctx, &id, None)
            .unwrap();
        assert!(state.all_liveness_events().is_empty());
        let rollapp = state.get_rollapp(&id).unwrap();
        assert_eq!(rollapp.liveness_event_height(), None);
        assert_eq!(rollapp.liveness_countdown_start_height(), 5);
    }

    #[test]
    fn test_kick_proposer_forks_to_latest() {
        let keeper = noop_keeper(test_params(5));
        let id = test_rollapp_id(1);
        let mut state = state_with_rollapps(&keeper, &[id.clone()]);
        submit(&keeper, &mut state, &id, 1, 10, 1);
        submit(&keeper, &mut state, &id, 11, 10, 2);

        let mut ctx = ctx_at(3);
        keeper.after_kick_proposer(&mut state, &mut ctx, &id).unwrap();
        assert_eq!(
            state.get_rollapp(&id).unwrap().revision_start_height(),
            21
        );
        assert!(matches!(ctx.events(), [HubEvent::HardFork { .. }]));
    }
}
