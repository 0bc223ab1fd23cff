//! Identifiers for rollapps, their sequencers and their state batches.

use std::fmt;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Height of a block on the hub chain.
pub type HubHeight = u64;

/// Height of a block on a rollapp chain.
pub type RollappHeight = u64;

/// Chain id of a rollapp registered on the hub.
#[derive(
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
#[serde(transparent)]
pub struct RollappId(String);

impl_str_name!(RollappId);

/// Address of a sequencer operating some rollapp.
#[derive(
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
#[serde(transparent)]
pub struct SequencerAddr(String);

impl_str_name!(SequencerAddr);

/// Addresses a single batch in a rollapp's state log.
///
/// Indexes start at 1 and are dense per rollapp.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
pub struct StateInfoIndex {
    rollapp_id: RollappId,
    index: u64,
}

impl StateInfoIndex {
    pub fn new(rollapp_id: RollappId, index: u64) -> Self {
        Self { rollapp_id, index }
    }

    pub fn rollapp_id(&self) -> &RollappId {
        &self.rollapp_id
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

impl fmt::Display for StateInfoIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.rollapp_id, self.index)
    }
}
