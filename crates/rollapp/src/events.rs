//! Typed events emitted while processing hub blocks.

use rollhub_identifiers::{HubHeight, RollappHeight, RollappId, SequencerAddr};
use rollhub_state_types::StateStatus;

/// Observable outcome of a pipeline operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HubEvent {
    /// A batch was appended to a rollapp's state log.
    StateUpdate {
        rollapp_id: RollappId,
        index: u64,
        start_height: RollappHeight,
        num_blocks: u64,
        sequencer: SequencerAddr,
        creation_height: HubHeight,
    },

    /// A batch changed status.
    StatusChange {
        rollapp_id: RollappId,
        index: u64,
        status: StateStatus,
    },

    /// A rollapp was forked after fraud or forced retirement.
    HardFork {
        rollapp_id: RollappId,
        fraud_height: RollappHeight,
        revision: u64,
        revision_start_height: RollappHeight,
    },

    /// A rollapp's sequencer was slashed for downtime.
    LivenessSlash {
        rollapp_id: RollappId,
        hub_height: HubHeight,
    },

    /// A rollapp's sequencer was jailed for downtime.
    LivenessJail {
        rollapp_id: RollappId,
        hub_height: HubHeight,
    },
}

/// Collector for events that we can pass around between operations.
#[derive(Clone, Debug, Default)]
pub struct EventBuffer {
    events: Vec<HubEvent>,
}

impl EventBuffer {
    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HubEvent] {
        &self.events
    }

    pub fn emit(&mut self, ev: HubEvent) {
        self.events.push(ev);
    }

    /// Current length, for rolling back events of a failed operation.
    pub(crate) fn checkpoint(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        self.events.truncate(checkpoint);
    }

    pub fn into_events(self) -> Vec<HubEvent> {
        self.events
    }
}
