use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use rollhub_identifiers::{
    Buf32, HubHeight, RollappHeight, RollappId, SequencerAddr, StateInfoIndex,
};
use serde::{Deserialize, Serialize};

/// Finalization status of a state batch.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Arbitrary,
    BorshDeserialize,
    BorshSerialize,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateStatus {
    /// Still within its dispute period, may be reverted by a hard fork.
    Pending,

    /// Dispute period elapsed, immutable from here on.
    Finalized,
}

/// Describes a single rollapp block committed by a batch.
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
pub struct BlockDescriptor {
    height: RollappHeight,
    state_root: Buf32,
    timestamp: u64,
    drs_version: u32,
}

impl BlockDescriptor {
    pub fn new(height: RollappHeight, state_root: Buf32, timestamp: u64, drs_version: u32) -> Self {
        Self {
            height,
            state_root,
            timestamp,
            drs_version,
        }
    }

    pub fn height(&self) -> RollappHeight {
        self.height
    }

    pub fn state_root(&self) -> &Buf32 {
        &self.state_root
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn drs_version(&self) -> u32 {
        self.drs_version
    }
}

/// A batch of rollapp blocks submitted to the hub by a sequencer.
///
/// The batch covers rollapp heights `start_height..=latest_height()` and is
/// addressed by its [`StateInfoIndex`] in the rollapp's state log.
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
pub struct StateInfo {
    index: StateInfoIndex,
    sequencer: SequencerAddr,
    start_height: RollappHeight,
    num_blocks: u64,
    da_path: String,
    creation_height: HubHeight,
    created_at: u64,
    status: StateStatus,
    next_proposer: Option<SequencerAddr>,
    bds: Vec<BlockDescriptor>,
}

impl StateInfo {
    /// Builds a pending batch from its block descriptors.
    ///
    /// The index is assigned when the batch is appended to the log, so
    /// callers can pass any placeholder here.
    #[expect(clippy::too_many_arguments, reason = "mirrors the submitted batch")]
    pub fn new(
        index: StateInfoIndex,
        sequencer: SequencerAddr,
        start_height: RollappHeight,
        da_path: String,
        creation_height: HubHeight,
        created_at: u64,
        next_proposer: Option<SequencerAddr>,
        bds: Vec<BlockDescriptor>,
    ) -> Self {
        Self {
            index,
            sequencer,
            start_height,
            num_blocks: bds.len() as u64,
            da_path,
            creation_height,
            created_at,
            status: StateStatus::Pending,
            next_proposer,
            bds,
        }
    }

    pub fn index(&self) -> &StateInfoIndex {
        &self.index
    }

    pub fn rollapp_id(&self) -> &RollappId {
        self.index.rollapp_id()
    }

    pub fn set_index(&mut self, index: StateInfoIndex) {
        self.index = index;
    }

    pub fn sequencer(&self) -> &SequencerAddr {
        &self.sequencer
    }

    pub fn start_height(&self) -> RollappHeight {
        self.start_height
    }

    pub fn num_blocks(&self) -> u64 {
        self.num_blocks
    }

    /// Last rollapp height covered by this batch.
    ///
    /// An empty batch reports `start_height - 1`.
    pub fn latest_height(&self) -> RollappHeight {
        (self.start_height + self.num_blocks).saturating_sub(1)
    }

    pub fn contains_height(&self, height: RollappHeight) -> bool {
        self.start_height <= height && height <= self.latest_height()
    }

    pub fn da_path(&self) -> &str {
        &self.da_path
    }

    pub fn creation_height(&self) -> HubHeight {
        self.creation_height
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn status(&self) -> StateStatus {
        self.status
    }

    pub fn is_finalized(&self) -> bool {
        self.status == StateStatus::Finalized
    }

    pub fn finalize(&mut self) {
        self.status = StateStatus::Finalized;
    }

    pub fn next_proposer(&self) -> Option<&SequencerAddr> {
        self.next_proposer.as_ref()
    }

    pub fn block_descriptors(&self) -> &[BlockDescriptor] {
        &self.bds
    }

    /// Drops every descriptor at or above `height`. A height past the end of
    /// the batch leaves it as is.
    pub fn truncate_from(&mut self, height: RollappHeight) {
        self.bds.retain(|bd| bd.height < height);
        self.num_blocks = self
            .num_blocks
            .min(height.saturating_sub(self.start_height));
    }

    /// Forgets the handed-over proposer, the successor is decided again
    /// after a fork.
    pub fn clear_next_proposer(&mut self) {
        self.next_proposer = None;
    }
}
