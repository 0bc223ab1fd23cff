use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use rollhub_identifiers::{HubHeight, RollappId, StateInfoIndex};
use serde::{Deserialize, Serialize};

/// Pending batches of one rollapp that become final at the same hub height.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct FinalizationQueueEntry {
    finalization_height: HubHeight,
    rollapp_id: RollappId,
    pending: Vec<StateInfoIndex>,
}

impl FinalizationQueueEntry {
    pub fn new(
        finalization_height: HubHeight,
        rollapp_id: RollappId,
        pending: Vec<StateInfoIndex>,
    ) -> Self {
        Self {
            finalization_height,
            rollapp_id,
            pending,
        }
    }

    pub fn finalization_height(&self) -> HubHeight {
        self.finalization_height
    }

    pub fn rollapp_id(&self) -> &RollappId {
        &self.rollapp_id
    }

    /// Pending indexes, in insertion order.
    pub fn pending(&self) -> &[StateInfoIndex] {
        &self.pending
    }

    pub fn push(&mut self, index: StateInfoIndex) {
        self.pending.push(index);
    }

    /// Keeps only the indexes matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&StateInfoIndex) -> bool) {
        self.pending.retain(f);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn into_pending(self) -> Vec<StateInfoIndex> {
        self.pending
    }
}
