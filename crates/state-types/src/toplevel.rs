//! Toplevel hub state.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use rollhub_identifiers::{HubHeight, RollappId};

use crate::{
    write_batch::{HeightKey, StateInfoKey},
    FinalizationQueueEntry, HubWriteBatch, IHubStateAccessor, LivenessEvent, Rollapp, StateInfo,
};

/// Full hub state tracked by the rollapp pipeline.
///
/// Every collection is ordered so height-indexed lookups are plain range
/// queries.
#[derive(Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct HubState {
    rollapps: BTreeMap<RollappId, Rollapp>,
    state_infos: BTreeMap<StateInfoKey, StateInfo>,
    latest_indices: BTreeMap<RollappId, u64>,
    finalized_indices: BTreeMap<RollappId, u64>,
    finalization_queue: BTreeMap<HeightKey, FinalizationQueueEntry>,
    liveness_events: BTreeMap<HeightKey, LivenessEvent>,
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches stored across all rollapps.
    pub fn state_info_count(&self) -> usize {
        self.state_infos.len()
    }
}

fn apply_opt<K: Ord, V>(map: &mut BTreeMap<K, V>, writes: BTreeMap<K, Option<V>>) {
    for (k, v) in writes {
        match v {
            Some(v) => {
                map.insert(k, v);
            }
            None => {
                map.remove(&k);
            }
        }
    }
}

impl IHubStateAccessor for HubState {
    fn get_rollapp(&self, id: &RollappId) -> Option<&Rollapp> {
        self.rollapps.get(id)
    }

    fn put_rollapp(&mut self, rollapp: Rollapp) {
        self.rollapps.insert(rollapp.rollapp_id().clone(), rollapp);
    }

    fn rollapp_ids(&self) -> Vec<RollappId> {
        self.rollapps.keys().cloned().collect()
    }

    fn get_state_info(&self, id: &RollappId, index: u64) -> Option<&StateInfo> {
        self.state_infos.get(&(id.clone(), index))
    }

    fn put_state_info(&mut self, info: StateInfo) {
        let key = (info.rollapp_id().clone(), info.index().index());
        self.state_infos.insert(key, info);
    }

    fn del_state_info(&mut self, id: &RollappId, index: u64) {
        self.state_infos.remove(&(id.clone(), index));
    }

    fn latest_state_index(&self, id: &RollappId) -> Option<u64> {
        self.latest_indices.get(id).copied()
    }

    fn set_latest_state_index(&mut self, id: &RollappId, index: u64) {
        self.latest_indices.insert(id.clone(), index);
    }

    fn latest_finalized_index(&self, id: &RollappId) -> Option<u64> {
        self.finalized_indices.get(id).copied()
    }

    fn set_latest_finalized_index(&mut self, id: &RollappId, index: u64) {
        self.finalized_indices.insert(id.clone(), index);
    }

    fn get_finalization_queue(
        &self,
        height: HubHeight,
        id: &RollappId,
    ) -> Option<&FinalizationQueueEntry> {
        self.finalization_queue.get(&(height, id.clone()))
    }

    fn put_finalization_queue(&mut self, entry: FinalizationQueueEntry) {
        let key = (entry.finalization_height(), entry.rollapp_id().clone());
        self.finalization_queue.insert(key, entry);
    }

    fn del_finalization_queue(&mut self, height: HubHeight, id: &RollappId) {
        self.finalization_queue.remove(&(height, id.clone()));
    }

    fn finalization_queue_keys_until(&self, height: HubHeight) -> Vec<(HubHeight, RollappId)> {
        self.finalization_queue
            .keys()
            .take_while(|(h, _)| *h <= height)
            .cloned()
            .collect()
    }

    fn put_liveness_event(&mut self, event: LivenessEvent) {
        let key = (event.hub_height(), event.rollapp_id().clone());
        self.liveness_events.insert(key, event);
    }

    fn del_liveness_event(&mut self, height: HubHeight, id: &RollappId) {
        self.liveness_events.remove(&(height, id.clone()));
    }

    fn liveness_events_at(&self, height: HubHeight) -> Vec<LivenessEvent> {
        self.liveness_events
            .iter()
            .skip_while(|((h, _), _)| *h < height)
            .take_while(|((h, _), _)| *h == height)
            .map(|(_, ev)| ev.clone())
            .collect()
    }

    fn all_liveness_events(&self) -> Vec<LivenessEvent> {
        self.liveness_events.values().cloned().collect()
    }

    fn apply_write_batch(&mut self, batch: HubWriteBatch) {
        self.rollapps.extend(batch.rollapps);
        apply_opt(&mut self.state_infos, batch.state_infos);
        self.latest_indices.extend(batch.latest_indices);
        self.finalized_indices.extend(batch.finalized_indices);
        apply_opt(&mut self.finalization_queue, batch.finalization_queue);
        apply_opt(&mut self.liveness_events, batch.liveness_events);
    }
}
