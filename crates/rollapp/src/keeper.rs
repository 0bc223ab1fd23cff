//! The rollapp keeper, owner of the pipeline's params and collaborators.

use rollhub_state_support_types::{apply_if_ok, WriteTrackingState};
use rollhub_state_types::{HubParams, IHubStateAccessor, Rollapp};
use tracing::*;

use crate::{
    context::ExecContext,
    errors::{RollappError, RollappResult},
    hooks::{RollappHooks, SequencerKeeper},
};

/// Entry point for every rollapp pipeline operation.
///
/// Operations are generic over the state they run on, so the same keeper
/// drives the toplevel state and any write-tracking layer over it.
#[derive(Debug)]
pub struct RollappKeeper<H, Q> {
    params: HubParams,
    hooks: H,
    sequencers: Q,
}

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    pub fn new(params: HubParams, hooks: H, sequencers: Q) -> Self {
        Self {
            params,
            hooks,
            sequencers,
        }
    }

    pub fn params(&self) -> &HubParams {
        &self.params
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn sequencers(&self) -> &Q {
        &self.sequencers
    }

    /// Registers a new rollapp.
    pub fn register_rollapp<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        rollapp: Rollapp,
    ) -> RollappResult<()> {
        if state.get_rollapp(rollapp.rollapp_id()).is_some() {
            return Err(RollappError::RollappExists(rollapp.rollapp_id().clone()));
        }
        info!(rollapp_id = %rollapp.rollapp_id(), genesis_height = %rollapp.genesis_height(), "registered rollapp");
        state.put_rollapp(rollapp);
        Ok(())
    }
}

/// Runs `f` as a sub-transaction: its state writes and emitted events are
/// kept only if it returns `Ok`.
///
/// Side effects of the hooks it calls are not rolled back.
pub(crate) fn atomically<S, T, F>(state: &mut S, ctx: &mut ExecContext, f: F) -> RollappResult<T>
where
    S: IHubStateAccessor,
    F: FnOnce(&mut WriteTrackingState<'_, S>, &mut ExecContext) -> RollappResult<T>,
{
    let checkpoint = ctx.output_mut().checkpoint();
    let res = apply_if_ok(state, |layer| f(layer, ctx));
    if res.is_err() {
        ctx.output_mut().rollback(checkpoint);
    }
    res
}

#[cfg(test)]
mod tests {
    use rollhub_state_types::HubState;
    use rollhub_test_utils::{test_rollapp, test_rollapp_id};

    use super::*;
    use crate::{
        context::BlockContext,
        events::HubEvent,
        hooks::{NoopHooks, NoopSequencers},
    };

    #[test]
    fn test_register_rejects_duplicates() {
        let keeper = RollappKeeper::new(HubParams::default(), NoopHooks, NoopSequencers);
        let id = test_rollapp_id(1);
        let mut state = HubState::new();
        keeper.register_rollapp(&mut state, test_rollapp(&id)).unwrap();
        assert!(matches!(
            keeper.register_rollapp(&mut state, test_rollapp(&id)),
            Err(RollappError::RollappExists(_))
        ));
    }

    #[test]
    fn test_atomically_discards_writes_and_events() {
        let id = test_rollapp_id(1);
        let mut state = HubState::new();
        let mut ctx = ExecContext::new(BlockContext::new(1, 0));
        let ev = HubEvent::LivenessSlash {
            rollapp_id: id.clone(),
            hub_height: 1,
        };

        let res: RollappResult<()> = atomically(&mut state, &mut ctx, |s, ctx| {
            s.put_rollapp(test_rollapp(&id));
            ctx.emit(ev.clone());
            Err(RollappError::Frozen(id.clone()))
        });
        assert!(res.is_err());
        assert!(state.get_rollapp(&id).is_none());
        assert!(ctx.events().is_empty());

        atomically(&mut state, &mut ctx, |s, ctx| {
            s.put_rollapp(test_rollapp(&id));
            ctx.emit(ev.clone());
            Ok(())
        })
        .unwrap();
        assert!(state.get_rollapp(&id).is_some());
        assert_eq!(ctx.events(), &[ev]);
    }
}
