//! Queue of pending batches keyed by the hub height they become final at.
//!
//! Storage is split per `(finalization_height, rollapp_id)` so a sweep or a
//! fork only rewrites the entries of the rollapps it touches.

use rollhub_identifiers::{HubHeight, RollappId, StateInfoIndex};
use rollhub_state_types::{FinalizationQueueEntry, IHubStateAccessor};

/// Appends an index to the entry at `height`, creating it if needed.
pub fn enqueue<S: IHubStateAccessor>(state: &mut S, height: HubHeight, index: StateInfoIndex) {
    let rollapp_id = index.rollapp_id().clone();
    let mut entry = state
        .get_finalization_queue(height, &rollapp_id)
        .cloned()
        .unwrap_or_else(|| FinalizationQueueEntry::new(height, rollapp_id, Vec::new()));
    entry.push(index);
    state.put_finalization_queue(entry);
}

/// Removes and returns every entry at or below `height`, ascending by height
/// then rollapp id.
pub fn dequeue_up_to<S: IHubStateAccessor>(
    state: &mut S,
    height: HubHeight,
) -> Vec<FinalizationQueueEntry> {
    let keys = state.finalization_queue_keys_until(height);
    let mut out = Vec::with_capacity(keys.len());
    for (h, id) in keys {
        if let Some(entry) = state.get_finalization_queue(h, &id).cloned() {
            out.push(entry);
        }
        state.del_finalization_queue(h, &id);
    }
    out
}

/// Removes a single index from wherever it's queued.
///
/// Returns whether it was found.
pub fn remove_entry<S: IHubStateAccessor>(state: &mut S, index: &StateInfoIndex) -> bool {
    let keys: Vec<_> = state
        .all_finalization_queue_keys()
        .into_iter()
        .filter(|(_, id)| id == index.rollapp_id())
        .collect();

    for (h, id) in keys {
        let Some(mut entry) = state.get_finalization_queue(h, &id).cloned() else {
            continue;
        };
        if !entry.pending().contains(index) {
            continue;
        }
        entry.retain(|i| i != index);
        if entry.is_empty() {
            state.del_finalization_queue(h, &id);
        } else {
            state.put_finalization_queue(entry);
        }
        return true;
    }

    false
}

/// Drops every queued index of a rollapp above `kept_index`.
///
/// Returns how many indexes were removed.
pub fn prune_above<S: IHubStateAccessor>(
    state: &mut S,
    rollapp_id: &RollappId,
    kept_index: u64,
) -> usize {
    let mut removed = 0;
    for entry in entries_for_rollapp(state, rollapp_id) {
        let before = entry.pending().len();
        let mut entry = entry;
        entry.retain(|i| i.index() <= kept_index);
        let dropped = before - entry.pending().len();
        if dropped == 0 {
            continue;
        }
        removed += dropped;
        if entry.is_empty() {
            state.del_finalization_queue(entry.finalization_height(), rollapp_id);
        } else {
            state.put_finalization_queue(entry);
        }
    }
    removed
}

/// All queue entries of one rollapp, ascending by height.
pub fn entries_for_rollapp<S: IHubStateAccessor>(
    state: &S,
    rollapp_id: &RollappId,
) -> Vec<FinalizationQueueEntry> {
    state
        .all_finalization_queue_keys()
        .into_iter()
        .filter(|(_, id)| id == rollapp_id)
        .filter_map(|(h, id)| state.get_finalization_queue(h, &id).cloned())
        .collect()
}

/// Every queue entry, ascending by height then rollapp id.
pub fn all_entries<S: IHubStateAccessor>(state: &S) -> Vec<FinalizationQueueEntry> {
    state
        .all_finalization_queue_keys()
        .into_iter()
        .filter_map(|(h, id)| state.get_finalization_queue(h, &id).cloned())
        .collect()
}
