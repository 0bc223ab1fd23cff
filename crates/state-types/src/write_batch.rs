use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use rollhub_identifiers::{HubHeight, RollappId};

use crate::{FinalizationQueueEntry, LivenessEvent, Rollapp, StateInfo};

/// Key of a batch in the state log.
pub type StateInfoKey = (RollappId, u64);

/// Key of height-indexed per-rollapp records.
pub type HeightKey = (HubHeight, RollappId);

/// Sparse set of writes against the hub state.
///
/// `None` values are tombstones, they delete the key when applied.
#[derive(Clone, Debug, Default, Eq, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct HubWriteBatch {
    pub(crate) rollapps: BTreeMap<RollappId, Rollapp>,
    pub(crate) state_infos: BTreeMap<StateInfoKey, Option<StateInfo>>,
    pub(crate) latest_indices: BTreeMap<RollappId, u64>,
    pub(crate) finalized_indices: BTreeMap<RollappId, u64>,
    pub(crate) finalization_queue: BTreeMap<HeightKey, Option<FinalizationQueueEntry>>,
    pub(crate) liveness_events: BTreeMap<HeightKey, Option<LivenessEvent>>,
}

impl HubWriteBatch {
    /// Create a new empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rollapps.is_empty()
            && self.state_infos.is_empty()
            && self.latest_indices.is_empty()
            && self.finalized_indices.is_empty()
            && self.finalization_queue.is_empty()
            && self.liveness_events.is_empty()
    }

    pub fn rollapps(&self) -> &BTreeMap<RollappId, Rollapp> {
        &self.rollapps
    }

    pub fn state_infos(&self) -> &BTreeMap<StateInfoKey, Option<StateInfo>> {
        &self.state_infos
    }

    pub fn latest_indices(&self) -> &BTreeMap<RollappId, u64> {
        &self.latest_indices
    }

    pub fn finalized_indices(&self) -> &BTreeMap<RollappId, u64> {
        &self.finalized_indices
    }

    pub fn finalization_queue(&self) -> &BTreeMap<HeightKey, Option<FinalizationQueueEntry>> {
        &self.finalization_queue
    }

    pub fn liveness_events(&self) -> &BTreeMap<HeightKey, Option<LivenessEvent>> {
        &self.liveness_events
    }

    pub fn put_rollapp(&mut self, rollapp: Rollapp) {
        self.rollapps.insert(rollapp.rollapp_id().clone(), rollapp);
    }

    pub fn put_state_info(&mut self, info: StateInfo) {
        let key = (info.rollapp_id().clone(), info.index().index());
        self.state_infos.insert(key, Some(info));
    }

    pub fn del_state_info(&mut self, id: &RollappId, index: u64) {
        self.state_infos.insert((id.clone(), index), None);
    }

    pub fn set_latest_state_index(&mut self, id: &RollappId, index: u64) {
        self.latest_indices.insert(id.clone(), index);
    }

    pub fn set_latest_finalized_index(&mut self, id: &RollappId, index: u64) {
        self.finalized_indices.insert(id.clone(), index);
    }

    pub fn put_finalization_queue(&mut self, entry: FinalizationQueueEntry) {
        let key = (entry.finalization_height(), entry.rollapp_id().clone());
        self.finalization_queue.insert(key, Some(entry));
    }

    pub fn del_finalization_queue(&mut self, height: HubHeight, id: &RollappId) {
        self.finalization_queue.insert((height, id.clone()), None);
    }

    pub fn put_liveness_event(&mut self, event: LivenessEvent) {
        let key = (event.hub_height(), event.rollapp_id().clone());
        self.liveness_events.insert(key, Some(event));
    }

    pub fn del_liveness_event(&mut self, height: HubHeight, id: &RollappId) {
        self.liveness_events.insert((height, id.clone()), None);
    }

    /// Layers `other` on top of this batch, later writes win.
    pub fn extend(&mut self, other: HubWriteBatch) {
        self.rollapps.extend(other.rollapps);
        self.state_infos.extend(other.state_infos);
        self.latest_indices.extend(other.latest_indices);
        self.finalized_indices.extend(other.finalized_indices);
        self.finalization_queue.extend(other.finalization_queue);
        self.liveness_events.extend(other.liveness_events);
    }
}
