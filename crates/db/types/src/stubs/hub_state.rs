use std::collections::*;

use parking_lot::Mutex;
use rollhub_identifiers::HubHeight;
use rollhub_state_types::{HubState, HubWriteBatch};

use crate::{traits::*, DbError, DbResult};

/// Hub state database kept entirely in memory.
#[derive(Debug)]
pub struct StubHubStateDb {
    states: Mutex<BTreeMap<HubHeight, HubState>>,
    write_batches: Mutex<BTreeMap<HubHeight, HubWriteBatch>>,
}

impl Default for StubHubStateDb {
    fn default() -> Self {
        Self::new()
    }
}

impl StubHubStateDb {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(BTreeMap::new()),
            write_batches: Mutex::new(BTreeMap::new()),
        }
    }
}

impl HubStateDatabase for StubHubStateDb {
    fn put_toplevel_hub_state(&self, height: HubHeight, state: HubState) -> DbResult<()> {
        self.states.lock().insert(height, state);
        Ok(())
    }

    fn get_toplevel_hub_state(&self, height: HubHeight) -> DbResult<Option<HubState>> {
        Ok(self.states.lock().get(&height).cloned())
    }

    fn get_latest_toplevel_hub_state(&self) -> DbResult<Option<(HubHeight, HubState)>> {
        Ok(self
            .states
            .lock()
            .last_key_value()
            .map(|(h, s)| (*h, s.clone())))
    }

    fn del_toplevel_hub_state(&self, height: HubHeight) -> DbResult<()> {
        self.states.lock().remove(&height);
        Ok(())
    }

    fn put_hub_write_batch(&self, height: HubHeight, wb: HubWriteBatch) -> DbResult<()> {
        self.write_batches.lock().insert(height, wb);
        Ok(())
    }

    fn get_hub_write_batch(&self, height: HubHeight) -> DbResult<Option<HubWriteBatch>> {
        Ok(self.write_batches.lock().get(&height).cloned())
    }

    fn del_hub_write_batch(&self, height: HubHeight) -> DbResult<()> {
        self.write_batches.lock().remove(&height);
        Ok(())
    }

    fn put_block_output(
        &self,
        height: HubHeight,
        wb: HubWriteBatch,
        state: HubState,
    ) -> DbResult<()> {
        // Lock order matches rollback so the pair always moves together.
        let mut states = self.states.lock();
        let mut batches = self.write_batches.lock();
        batches.insert(height, wb);
        states.insert(height, state);
        Ok(())
    }

    fn rollback_to_height(&self, height: HubHeight) -> DbResult<()> {
        let mut states = self.states.lock();
        let mut batches = self.write_batches.lock();

        let tip = states
            .last_key_value()
            .map(|(h, _)| *h)
            .into_iter()
            .chain(batches.last_key_value().map(|(h, _)| *h))
            .max()
            .unwrap_or(0);
        if height > tip {
            return Err(DbError::RevertAboveCurrent(height, tip));
        }

        states.retain(|h, _| *h <= height);
        batches.retain(|h, _| *h <= height);
        Ok(())
    }
}
