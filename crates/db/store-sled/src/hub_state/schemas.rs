use rollhub_identifiers::HubHeight;
use rollhub_state_types::{HubState, HubWriteBatch};

use crate::define_table_with_integer_key;

define_table_with_integer_key!(
    /// Table to store toplevel hub state snapshots keyed by hub height.
    (HubStateSchema) HubHeight => HubState
);

define_table_with_integer_key!(
    /// Table to store hub write batches keyed by hub height.
    (HubWriteBatchSchema) HubHeight => HubWriteBatch
);
