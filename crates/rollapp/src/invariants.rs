//! Consistency checks over the whole rollapp pipeline state.
//!
//! These never mutate anything. An empty result means the state is sound.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use rollhub_identifiers::{RollappId, StateInfoIndex};
use rollhub_state_types::{IHubStateAccessor, StateStatus};

use crate::finalization_queue::all_entries;

pub const ROUTE_FINALIZED_STATE: &str = "rollapp-finalized-state";
pub const ROUTE_FINALIZATION_QUEUE: &str = "finalization-queue";
pub const ROUTE_STATE_CONTIGUITY: &str = "state-contiguity";
pub const ROUTE_LIVENESS_EVENT: &str = "liveness-event";

/// A broken invariant, tagged with the check that found it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvariantViolation {
    route: &'static str,
    msg: String,
}

impl InvariantViolation {
    fn new(route: &'static str, msg: impl Into<String>) -> Self {
        Self {
            route,
            msg: msg.into(),
        }
    }

    pub fn route(&self) -> &'static str {
        self.route
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.route, self.msg)
    }
}

/// Batches up to the finalized pointer are finalized, the ones after it are
/// pending.
pub fn check_finalized_states<S: IHubStateAccessor>(state: &S) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let mut broken = |msg: String| out.push(InvariantViolation::new(ROUTE_FINALIZED_STATE, msg));

    for id in state.rollapp_ids() {
        let latest = state.latest_state_index(&id).unwrap_or(0);
        let finalized = state.latest_finalized_index(&id).unwrap_or(0);
        if finalized > latest {
            broken(format!("{id}: finalized index {finalized} above latest {latest}"));
            continue;
        }

        for i in 1..=latest {
            let Some(info) = state.get_state_info(&id, i) else {
                broken(format!("{id}: no state info at index {i}"));
                continue;
            };
            let expected = if i <= finalized {
                StateStatus::Finalized
            } else {
                StateStatus::Pending
            };
            if info.status() != expected {
                broken(format!("{id}: state info {i} is {:?}, expected {expected:?}", info.status()));
            }
        }
    }

    out
}

/// Every pending batch is queued exactly once, after its creation height,
/// under the right rollapp, and nothing else is queued.
pub fn check_finalization_queue<S: IHubStateAccessor>(state: &S) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let mut broken = |msg: String| out.push(InvariantViolation::new(ROUTE_FINALIZATION_QUEUE, msg));

    let mut queued: BTreeMap<StateInfoIndex, u64> = BTreeMap::new();
    for entry in all_entries(state) {
        let height = entry.finalization_height();
        if entry.is_empty() {
            broken(format!("empty entry at ({height}, {})", entry.rollapp_id()));
        }

        for index in entry.pending() {
            if index.rollapp_id() != entry.rollapp_id() {
                broken(format!("{index} queued under {} at {height}", entry.rollapp_id()));
            }
            if queued.insert(index.clone(), height).is_some() {
                broken(format!("{index} queued more than once"));
            }

            let Some(info) = state.get_state_info(index.rollapp_id(), index.index()) else {
                broken(format!("{index} queued at {height} but doesn't exist"));
                continue;
            };
            if info.is_finalized() {
                broken(format!("{index} queued at {height} but already finalized"));
            }
            if height <= info.creation_height() {
                broken(format!(
                    "{index} queued at {height}, not after its creation at {}",
                    info.creation_height()
                ));
            }
        }
    }

    for id in state.rollapp_ids() {
        let latest = state.latest_state_index(&id).unwrap_or(0);
        let finalized = state.latest_finalized_index(&id).unwrap_or(0);
        for i in (finalized + 1)..=latest {
            let index = StateInfoIndex::new(id.clone(), i);
            if !queued.contains_key(&index) {
                broken(format!("pending {index} is not queued"));
            }
        }
    }

    out
}

/// Each rollapp's log starts at its genesis height and has no gaps, overlaps
/// or empty batches.
pub fn check_state_contiguity<S: IHubStateAccessor>(state: &S) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let mut broken = |msg: String| out.push(InvariantViolation::new(ROUTE_STATE_CONTIGUITY, msg));

    for id in state.rollapp_ids() {
        let Some(rollapp) = state.get_rollapp(&id) else {
            continue;
        };
        let latest = state.latest_state_index(&id).unwrap_or(0);
        let mut expected_start = rollapp.genesis_height();

        for i in 1..=latest {
            let Some(info) = state.get_state_info(&id, i) else {
                // Reported by the finalized state check.
                continue;
            };
            if info.index().index() != i || info.rollapp_id() != &id {
                broken(format!("{id}: state info stored at {i} is {}", info.index()));
            }
            if info.start_height() != expected_start {
                broken(format!(
                    "{id}: state info {i} starts at {}, expected {expected_start}",
                    info.start_height()
                ));
            }
            if info.num_blocks() == 0 || info.num_blocks() != info.block_descriptors().len() as u64 {
                broken(format!("{id}: state info {i} has a bad block count"));
            }
            expected_start = info.latest_height() + 1;
        }

        if state.get_state_info(&id, latest + 1).is_some() {
            broken(format!("{id}: state info past the latest index {latest}"));
        }
    }

    out
}

/// Scheduled liveness events and the heights mirrored on rollapps agree.
pub fn check_liveness_events<S: IHubStateAccessor>(state: &S) -> Vec<InvariantViolation> {
    let mut out = Vec::new();
    let mut broken = |msg: String| out.push(InvariantViolation::new(ROUTE_LIVENESS_EVENT, msg));

    for id in state.rollapp_ids() {
        let Some(height) = state.get_rollapp(&id).and_then(|ra| ra.liveness_event_height()) else {
            continue;
        };
        let found = state
            .liveness_events_at(height)
            .iter()
            .filter(|ev| ev.rollapp_id() == &id)
            .count();
        if found != 1 {
            broken(format!("{id}: expected one event at {height}, found {found}"));
        }
    }

    let events = state.all_liveness_events();
    let mut seen: BTreeSet<&RollappId> = BTreeSet::new();
    for (i, ev) in events.iter().enumerate() {
        if i > 0 && ev.hub_height() < events[i - 1].hub_height() {
            broken(format!("events out of order at {}", ev.hub_height()));
        }
        if !seen.insert(ev.rollapp_id()) {
            broken(format!("{}: more than one event", ev.rollapp_id()));
        }
        match state.get_rollapp(ev.rollapp_id()) {
            None => broken(format!("{}: event for unknown rollapp", ev.rollapp_id())),
            Some(ra) if ra.liveness_event_height() != Some(ev.hub_height()) => broken(format!(
                "{}: event at {} but rollapp mirrors {:?}",
                ev.rollapp_id(),
                ev.hub_height(),
                ra.liveness_event_height()
            )),
            Some(_) => {}
        }
    }

    out
}

/// Runs every check.
pub fn check_all<S: IHubStateAccessor>(state: &S) -> Vec<InvariantViolation> {
    let mut out = check_finalized_states(state);
    out.extend(check_finalization_queue(state));
    out.extend(check_state_contiguity(state));
    out.extend(check_liveness_events(state));
    out
}
