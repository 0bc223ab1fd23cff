//! Deterministic builders for rollapps and their batches.

use rollhub_identifiers::{Buf32, RollappHeight, RollappId, SequencerAddr};
use rollhub_state_types::{BlockDescriptor, Rollapp};

/// DRS version stamped on generated block descriptors.
pub const TEST_DRS_VERSION: u32 = 1;

/// Rollapp id with a predictable shape, `rollapp{n}_{eip155}-1`.
pub fn test_rollapp_id(n: u32) -> RollappId {
    RollappId::new(format!("rollapp{n}_{}-1", 1000 + n))
}

/// Sequencer address with a predictable value.
pub fn test_sequencer(n: u32) -> SequencerAddr {
    SequencerAddr::new(format!("seq1{n:0>38}"))
}

/// Fresh rollapp whose first batch must start at height 1.
pub fn test_rollapp(id: &RollappId) -> Rollapp {
    Rollapp::new(id.clone(), "owner1".to_owned(), 1)
}

/// State root for a rollapp height, unique per height.
pub fn test_state_root(height: RollappHeight) -> Buf32 {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&height.to_be_bytes());
    Buf32::new(bytes)
}

/// Descriptors for rollapp heights `start..start + n`.
pub fn test_block_descriptors(start: RollappHeight, n: u64) -> Vec<BlockDescriptor> {
    (start..start + n)
        .map(|h| BlockDescriptor::new(h, test_state_root(h), 1_700_000_000 + h, TEST_DRS_VERSION))
        .collect()
}
