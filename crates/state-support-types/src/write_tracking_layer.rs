//! Hub state layer that stores writes into a write batch.
//!
//! This provides an `IHubStateAccessor` implementation that tracks all writes
//! in a `HubWriteBatch`, allowing them to be applied atomically or discarded.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use rollhub_identifiers::{HubHeight, RollappId};
use rollhub_state_types::{
    FinalizationQueueEntry, HubWriteBatch, IHubStateAccessor, LivenessEvent, Rollapp, StateInfo,
};

/// A write-tracking state accessor that wraps a base state.
///
/// All reads check the write batch first, then fall back to the base state.
/// All writes are recorded in the write batch.
pub struct WriteTrackingState<'base, S: IHubStateAccessor> {
    base: &'base S,
    batch: HubWriteBatch,
}

impl<S: IHubStateAccessor + fmt::Debug> fmt::Debug for WriteTrackingState<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteTrackingState")
            .field("base", &self.base)
            .field("batch", &self.batch)
            .finish()
    }
}

impl<'base, S: IHubStateAccessor> WriteTrackingState<'base, S> {
    /// Creates a new write-tracking state with an empty batch.
    pub fn new(base: &'base S) -> Self {
        Self::new_with_batch(base, HubWriteBatch::new())
    }

    /// Creates a new write-tracking state wrapping the given base state and
    /// some writes already made on top of it.
    pub fn new_with_batch(base: &'base S, batch: HubWriteBatch) -> Self {
        Self { base, batch }
    }

    /// Returns a reference to the underlying write batch.
    pub fn batch(&self) -> &HubWriteBatch {
        &self.batch
    }

    /// Consumes this wrapper and returns the write batch.
    pub fn into_batch(self) -> HubWriteBatch {
        self.batch
    }
}

/// Runs `f` against a fresh write-tracking layer over `state`, applying its
/// writes only if it returns `Ok`.
///
/// This is the sub-transaction primitive: an error leaves `state` untouched.
pub fn apply_if_ok<S, T, E, F>(state: &mut S, f: F) -> Result<T, E>
where
    S: IHubStateAccessor,
    F: FnOnce(&mut WriteTrackingState<'_, S>) -> Result<T, E>,
{
    let mut layer = WriteTrackingState::new(&*state);
    let out = f(&mut layer)?;
    let batch = layer.into_batch();
    state.apply_write_batch(batch);
    Ok(out)
}

impl<S: IHubStateAccessor> IHubStateAccessor for WriteTrackingState<'_, S> {
    // ===== Rollapp methods =====

    fn get_rollapp(&self, id: &RollappId) -> Option<&Rollapp> {
        // Check write batch first
        if let Some(ra) = self.batch.rollapps().get(id) {
            return Some(ra);
        }
        // Fall back to base state
        self.base.get_rollapp(id)
    }

    fn put_rollapp(&mut self, rollapp: Rollapp) {
        self.batch.put_rollapp(rollapp);
    }

    fn rollapp_ids(&self) -> Vec<RollappId> {
        let mut ids: BTreeSet<RollappId> = self.base.rollapp_ids().into_iter().collect();
        ids.extend(self.batch.rollapps().keys().cloned());
        ids.into_iter().collect()
    }

    // ===== State log methods =====

    fn get_state_info(&self, id: &RollappId, index: u64) -> Option<&StateInfo> {
        match self.batch.state_infos().get(&(id.clone(), index)) {
            Some(write) => write.as_ref(),
            None => self.base.get_state_info(id, index),
        }
    }

    fn put_state_info(&mut self, info: StateInfo) {
        self.batch.put_state_info(info);
    }

    fn del_state_info(&mut self, id: &RollappId, index: u64) {
        self.batch.del_state_info(id, index);
    }

    fn latest_state_index(&self, id: &RollappId) -> Option<u64> {
        match self.batch.latest_indices().get(id) {
            Some(idx) => Some(*idx),
            None => self.base.latest_state_index(id),
        }
    }

    fn set_latest_state_index(&mut self, id: &RollappId, index: u64) {
        self.batch.set_latest_state_index(id, index);
    }

    fn latest_finalized_index(&self, id: &RollappId) -> Option<u64> {
        match self.batch.finalized_indices().get(id) {
            Some(idx) => Some(*idx),
            None => self.base.latest_finalized_index(id),
        }
    }

    fn set_latest_finalized_index(&mut self, id: &RollappId, index: u64) {
        self.batch.set_latest_finalized_index(id, index);
    }

    // ===== Finalization queue methods =====

    fn get_finalization_queue(
        &self,
        height: HubHeight,
        id: &RollappId,
    ) -> Option<&FinalizationQueueEntry> {
        match self.batch.finalization_queue().get(&(height, id.clone())) {
            Some(write) => write.as_ref(),
            None => self.base.get_finalization_queue(height, id),
        }
    }

    fn put_finalization_queue(&mut self, entry: FinalizationQueueEntry) {
        self.batch.put_finalization_queue(entry);
    }

    fn del_finalization_queue(&mut self, height: HubHeight, id: &RollappId) {
        self.batch.del_finalization_queue(height, id);
    }

    fn finalization_queue_keys_until(&self, height: HubHeight) -> Vec<(HubHeight, RollappId)> {
        let mut keys: BTreeSet<(HubHeight, RollappId)> = self
            .base
            .finalization_queue_keys_until(height)
            .into_iter()
            .collect();
        let writes = self
            .batch
            .finalization_queue()
            .iter()
            .take_while(|((h, _), _)| *h <= height);
        for (key, write) in writes {
            match write {
                Some(_) => keys.insert(key.clone()),
                None => keys.remove(key),
            };
        }
        keys.into_iter().collect()
    }

    // ===== Liveness methods =====

    fn put_liveness_event(&mut self, event: LivenessEvent) {
        self.batch.put_liveness_event(event);
    }

    fn del_liveness_event(&mut self, height: HubHeight, id: &RollappId) {
        self.batch.del_liveness_event(height, id);
    }

    fn liveness_events_at(&self, height: HubHeight) -> Vec<LivenessEvent> {
        let base = self.base.liveness_events_at(height);
        let writes = self
            .batch
            .liveness_events()
            .iter()
            .filter(|((h, _), _)| *h == height);
        merge_events(base, writes)
    }

    fn all_liveness_events(&self) -> Vec<LivenessEvent> {
        merge_events(
            self.base.all_liveness_events(),
            self.batch.liveness_events().iter(),
        )
    }

    // ===== Batch methods =====

    fn apply_write_batch(&mut self, batch: HubWriteBatch) {
        self.batch.extend(batch);
    }
}

fn merge_events<'a>(
    base: Vec<LivenessEvent>,
    writes: impl Iterator<Item = (&'a (HubHeight, RollappId), &'a Option<LivenessEvent>)>,
) -> Vec<LivenessEvent> {
    let mut merged: BTreeMap<(HubHeight, RollappId), LivenessEvent> = base
        .into_iter()
        .map(|ev| ((ev.hub_height(), ev.rollapp_id().clone()), ev))
        .collect();
    for (key, write) in writes {
        match write {
            Some(ev) => {
                merged.insert(key.clone(), ev.clone());
            }
            None => {
                merged.remove(key);
            }
        }
    }
    merged.into_values().collect()
}
