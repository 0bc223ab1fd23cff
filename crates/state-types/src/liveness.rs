use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use rollhub_identifiers::{HubHeight, RollappId};
use serde::{Deserialize, Serialize};

/// Scheduled penalty for a rollapp that stopped posting updates.
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
pub struct LivenessEvent {
    rollapp_id: RollappId,
    hub_height: HubHeight,
    is_jail: bool,
}

impl LivenessEvent {
    pub fn new(rollapp_id: RollappId, hub_height: HubHeight, is_jail: bool) -> Self {
        Self {
            rollapp_id,
            hub_height,
            is_jail,
        }
    }

    pub fn rollapp_id(&self) -> &RollappId {
        &self.rollapp_id
    }

    pub fn hub_height(&self) -> HubHeight {
        self.hub_height
    }

    pub fn is_jail(&self) -> bool {
        self.is_jail
    }
}
