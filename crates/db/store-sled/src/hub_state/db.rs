use rollhub_db_types::{traits::*, DbError, DbResult};
use rollhub_identifiers::HubHeight;
use rollhub_state_types::{HubState, HubWriteBatch};
use tracing::*;

use super::schemas::{HubStateSchema, HubWriteBatchSchema};
use crate::define_sled_database;

define_sled_database!(
    pub struct HubStateDBSled {
        state_tree: HubStateSchema,
        write_batch_tree: HubWriteBatchSchema,
    }
);

impl HubStateDBSled {
    /// Highest height either tree has an entry for.
    fn tip_height(&self) -> DbResult<Option<HubHeight>> {
        let state_tip = self.state_tree.last()?.map(|(h, _)| h);
        let wb_tip = self.write_batch_tree.last()?.map(|(h, _)| h);
        Ok(state_tip.max(wb_tip))
    }
}

impl HubStateDatabase for HubStateDBSled {
    fn put_toplevel_hub_state(&self, height: HubHeight, state: HubState) -> DbResult<()> {
        Ok(self.state_tree.insert(&height, &state)?)
    }

    fn get_toplevel_hub_state(&self, height: HubHeight) -> DbResult<Option<HubState>> {
        Ok(self.state_tree.get(&height)?)
    }

    fn get_latest_toplevel_hub_state(&self) -> DbResult<Option<(HubHeight, HubState)>> {
        Ok(self.state_tree.last()?)
    }

    fn del_toplevel_hub_state(&self, height: HubHeight) -> DbResult<()> {
        Ok(self.state_tree.remove(&height)?)
    }

    fn put_hub_write_batch(&self, height: HubHeight, wb: HubWriteBatch) -> DbResult<()> {
        Ok(self.write_batch_tree.insert(&height, &wb)?)
    }

    fn get_hub_write_batch(&self, height: HubHeight) -> DbResult<Option<HubWriteBatch>> {
        Ok(self.write_batch_tree.get(&height)?)
    }

    fn del_hub_write_batch(&self, height: HubHeight) -> DbResult<()> {
        Ok(self.write_batch_tree.remove(&height)?)
    }

    fn put_block_output(
        &self,
        height: HubHeight,
        wb: HubWriteBatch,
        state: HubState,
    ) -> DbResult<()> {
        self.config.with_retry(
            (&self.state_tree, &self.write_batch_tree),
            |(st, wbt)| {
                wbt.insert(&height, &wb)?;
                st.insert(&height, &state)?;
                Ok(())
            },
        )
    }

    fn rollback_to_height(&self, height: HubHeight) -> DbResult<()> {
        let tip = self.tip_height()?.unwrap_or(0);
        if height > tip {
            return Err(DbError::RevertAboveCurrent(height, tip));
        }

        self.config.with_retry(
            (&self.state_tree, &self.write_batch_tree),
            |(st, wbt)| {
                for h in (height + 1)..=tip {
                    st.remove(&h)?;
                    wbt.remove(&h)?;
                }
                Ok(())
            },
        )?;

        debug!(%height, %tip, "rolled back hub state db");
        Ok(())
    }
}
