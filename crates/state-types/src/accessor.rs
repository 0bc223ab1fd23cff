use rollhub_identifiers::{HubHeight, RollappId};

use crate::{FinalizationQueueEntry, HubWriteBatch, LivenessEvent, Rollapp, StateInfo};

/// Opaque interface for manipulating the hub state, for all of the keyed
/// collections the rollapp pipeline works on.
///
/// This exists because we want to make this generic across the various
/// different contexts we'll be manipulating state, the toplevel state and
/// write-tracking layers stacked on top of it.
pub trait IHubStateAccessor {
    // ===== Rollapp methods =====

    /// Gets a rollapp record, if registered.
    fn get_rollapp(&self, id: &RollappId) -> Option<&Rollapp>;

    /// Inserts or overwrites a rollapp record.
    fn put_rollapp(&mut self, rollapp: Rollapp);

    /// Ids of all registered rollapps, in ascending order.
    fn rollapp_ids(&self) -> Vec<RollappId>;

    // ===== State log methods =====

    /// Gets the batch at `index` of a rollapp's state log.
    fn get_state_info(&self, id: &RollappId, index: u64) -> Option<&StateInfo>;

    /// Inserts or overwrites a batch, keyed by its own index.
    fn put_state_info(&mut self, info: StateInfo);

    /// Deletes a batch, if present.
    fn del_state_info(&mut self, id: &RollappId, index: u64);

    /// Index of the latest batch of a rollapp, if it ever posted one.
    fn latest_state_index(&self, id: &RollappId) -> Option<u64>;

    fn set_latest_state_index(&mut self, id: &RollappId, index: u64);

    /// Index of the latest finalized batch of a rollapp, if any.
    fn latest_finalized_index(&self, id: &RollappId) -> Option<u64>;

    fn set_latest_finalized_index(&mut self, id: &RollappId, index: u64);

    // ===== Finalization queue methods =====

    /// Gets the queue entry of a rollapp at a finalization height.
    fn get_finalization_queue(
        &self,
        height: HubHeight,
        id: &RollappId,
    ) -> Option<&FinalizationQueueEntry>;

    /// Inserts or overwrites a queue entry, keyed by its height and rollapp.
    fn put_finalization_queue(&mut self, entry: FinalizationQueueEntry);

    /// Deletes a queue entry, if present.
    fn del_finalization_queue(&mut self, height: HubHeight, id: &RollappId);

    /// Keys of all queue entries at or below `height`, ascending by height
    /// then rollapp id.
    fn finalization_queue_keys_until(&self, height: HubHeight) -> Vec<(HubHeight, RollappId)>;

    /// Keys of every queue entry, ascending.
    fn all_finalization_queue_keys(&self) -> Vec<(HubHeight, RollappId)> {
        self.finalization_queue_keys_until(HubHeight::MAX)
    }

    // ===== Liveness methods =====

    /// Inserts or overwrites a liveness event, keyed by its height and rollapp.
    fn put_liveness_event(&mut self, event: LivenessEvent);

    /// Deletes a liveness event, if present.
    fn del_liveness_event(&mut self, height: HubHeight, id: &RollappId);

    /// All liveness events scheduled at exactly `height`.
    fn liveness_events_at(&self, height: HubHeight) -> Vec<LivenessEvent>;

    /// Every scheduled liveness event, ascending by height then rollapp id.
    fn all_liveness_events(&self) -> Vec<LivenessEvent>;

    // ===== Batch methods =====

    /// Applies the writes recorded in a batch on top of this state.
    fn apply_write_batch(&mut self, batch: HubWriteBatch);
}
