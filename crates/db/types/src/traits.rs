//! Trait definitions for low level database interfaces.

use rollhub_identifiers::HubHeight;
use rollhub_state_types::{HubState, HubWriteBatch};

use crate::DbResult;

/// Database interface for the hub state produced by each hub block.
///
/// Stores a toplevel state snapshot and the block's write batch per hub
/// height.  Operations are NOT VALIDATED at this level, the driver is
/// expected to write heights in order.
pub trait HubStateDatabase: Send + Sync + 'static {
    /// Stores a toplevel hub state snapshot for a given hub height.
    fn put_toplevel_hub_state(&self, height: HubHeight, state: HubState) -> DbResult<()>;

    /// Retrieves a toplevel hub state snapshot for a given hub height.
    fn get_toplevel_hub_state(&self, height: HubHeight) -> DbResult<Option<HubState>>;

    /// Gets the latest toplevel hub state (highest height).
    fn get_latest_toplevel_hub_state(&self) -> DbResult<Option<(HubHeight, HubState)>>;

    /// Deletes a toplevel hub state snapshot for a given hub height.
    fn del_toplevel_hub_state(&self, height: HubHeight) -> DbResult<()>;

    /// Stores the write batch of the hub block at a given height.
    ///
    /// Applying it to the state at `height - 1` gives the state at `height`.
    fn put_hub_write_batch(&self, height: HubHeight, wb: HubWriteBatch) -> DbResult<()>;

    /// Retrieves the write batch of the hub block at a given height.
    fn get_hub_write_batch(&self, height: HubHeight) -> DbResult<Option<HubWriteBatch>>;

    /// Deletes the write batch of the hub block at a given height.
    fn del_hub_write_batch(&self, height: HubHeight) -> DbResult<()>;

    /// Stores a block's write batch and the resulting state together, so
    /// neither is visible without the other.
    fn put_block_output(
        &self,
        height: HubHeight,
        wb: HubWriteBatch,
        state: HubState,
    ) -> DbResult<()>;

    /// Deletes every state snapshot and write batch above `height`.
    ///
    /// Fails if `height` is above the latest stored height.
    fn rollback_to_height(&self, height: HubHeight) -> DbResult<()>;
}
