//! Liveness scheduling: slashing and jailing sequencers of rollapps that stop
//! posting updates.

use std::time::Duration;

use rollhub_identifiers::{HubHeight, RollappId};
use rollhub_state_types::{IHubStateAccessor, LivenessEvent, Rollapp};
use tracing::*;

use crate::{
    context::ExecContext,
    errors::{RollappError, RollappResult},
    events::HubEvent,
    hooks::{RollappHooks, SequencerKeeper},
    keeper::{atomically, RollappKeeper},
};

/// Computes the hub height of the next liveness event for a rollapp last
/// updated at `last_update_height`, and whether it's a jail.
///
/// The first slash fires once `slash_time_no_update` has passed without an
/// update, then one every `slash_interval` until `jail_time` is reached, at
/// which point the sequencer is jailed instead. The result is always after
/// `current_height`.
pub fn next_slash_or_jail_height(
    hub_block_interval: Duration,
    slash_time_no_update: Duration,
    slash_interval: Duration,
    jail_time: Duration,
    current_height: HubHeight,
    last_update_height: HubHeight,
) -> (HubHeight, bool) {
    let interval = hub_block_interval.as_millis().max(1);
    let slash = slash_time_no_update.as_millis();
    let step = slash_interval.as_millis().max(1);
    let jail = jail_time.as_millis();

    let down = u128::from(current_height.saturating_sub(last_update_height)) * interval;
    let mut target = if down < slash {
        slash
    } else {
        slash + ((down - slash) / step + 1) * step
    };

    let is_jail = target >= jail;
    if is_jail {
        target = jail;
    }

    let blocks = u64::try_from(target.div_ceil(interval)).unwrap_or(u64::MAX);
    let height = last_update_height
        .saturating_add(blocks)
        .max(current_height.saturating_add(1));
    (height, is_jail)
}

fn get_rollapp_owned<S: IHubStateAccessor>(
    state: &S,
    rollapp_id: &RollappId,
) -> RollappResult<Rollapp> {
    state
        .get_rollapp(rollapp_id)
        .cloned()
        .ok_or_else(|| RollappError::UnknownRollapp(rollapp_id.clone()))
}

impl<H: RollappHooks, Q: SequencerKeeper> RollappKeeper<H, Q> {
    /// Schedules the rollapp's next liveness event, counting down from its
    /// last liveness reset. Replaces any event already scheduled.
    pub fn schedule_liveness_event<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        rollapp_id: &RollappId,
        hub_height: HubHeight,
    ) -> RollappResult<()> {
        let mut rollapp = get_rollapp_owned(state, rollapp_id)?;
        if let Some(prev) = rollapp.liveness_event_height() {
            state.del_liveness_event(prev, rollapp_id);
        }

        let params = self.params();
        let (height, is_jail) = next_slash_or_jail_height(
            params.hub_block_interval(),
            params.liveness_slash_time_no_update(),
            params.liveness_slash_interval(),
            params.liveness_jail_time(),
            hub_height,
            rollapp.liveness_countdown_start_height(),
        );

        state.put_liveness_event(LivenessEvent::new(rollapp_id.clone(), height, is_jail));
        rollapp.set_liveness_event_height(Some(height));
        state.put_rollapp(rollapp);

        trace!(%rollapp_id, %height, %is_jail, "scheduled liveness event");
        Ok(())
    }

    /// Drops the rollapp's pending liveness event and restarts its countdown
    /// at `hub_height`.
    pub fn reset_liveness_clock<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        rollapp_id: &RollappId,
        hub_height: HubHeight,
    ) -> RollappResult<()> {
        let mut rollapp = get_rollapp_owned(state, rollapp_id)?;
        if let Some(prev) = rollapp.liveness_event_height() {
            state.del_liveness_event(prev, rollapp_id);
        }
        rollapp.set_liveness_event_height(None);
        rollapp.set_liveness_countdown_start_height(hub_height);
        state.put_rollapp(rollapp);
        Ok(())
    }

    /// Records that the rollapp is live at `hub_height`.
    pub fn indicate_liveness<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        rollapp_id: &RollappId,
        hub_height: HubHeight,
    ) -> RollappResult<()> {
        self.reset_liveness_clock(state, rollapp_id, hub_height)?;
        self.schedule_liveness_event(state, rollapp_id, hub_height)
    }

    /// Fires the liveness events scheduled at the current hub height.
    ///
    /// A failing event is dropped from processing and logged, it is not
    /// rescheduled.
    pub fn check_liveness<S: IHubStateAccessor>(&self, state: &mut S, ctx: &mut ExecContext) {
        let height = ctx.height();
        for ev in state.liveness_events_at(height) {
            let res = atomically(state, ctx, |s, ctx| self.handle_liveness_event(s, ctx, &ev));
            if let Err(e) = res {
                error!(rollapp_id = %ev.rollapp_id(), %height, is_jail = %ev.is_jail(), %e, "failed to handle liveness event");
            }
        }
    }

    fn handle_liveness_event<S: IHubStateAccessor>(
        &self,
        state: &mut S,
        ctx: &mut ExecContext,
        ev: &LivenessEvent,
    ) -> RollappResult<()> {
        let rollapp_id = ev.rollapp_id();
        let height = ev.hub_height();
        let mut rollapp = get_rollapp_owned(state, rollapp_id)?;

        if ev.is_jail() {
            self.sequencers()
                .jail_liveness(rollapp_id)
                .map_err(|e| RollappError::Hook("jail_liveness", e))?;
        } else {
            self.sequencers()
                .slash_liveness(rollapp_id)
                .map_err(|e| RollappError::Hook("slash_liveness", e))?;
        }

        state.del_liveness_event(height, rollapp_id);
        rollapp.set_liveness_event_height(None);
        state.put_rollapp(rollapp);

        if ev.is_jail() {
            warn!(%rollapp_id, %height, "jailed sequencer for downtime");
            ctx.emit(HubEvent::LivenessJail {
                rollapp_id: rollapp_id.clone(),
                hub_height: height,
            });
        } else {
            self.schedule_liveness_event(state, rollapp_id, height)?;
            info!(%rollapp_id, %height, "slashed sequencer for downtime");
            ctx.emit(HubEvent::LivenessSlash {
                rollapp_id: rollapp_id.clone(),
                hub_height: height,
            });
        }
        Ok(())
    }
}
