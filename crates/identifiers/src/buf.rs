use std::fmt;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// 32 byte buffer, used for state roots committed in block descriptors.
#[derive(
    Copy,
    Clone,
    Default,
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
pub struct Buf32(#[serde(with = "hex::serde")] [u8; 32]);

impl Buf32 {
    pub const LEN: usize = 32;

    pub const fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub const fn zero() -> Self {
        Self([0; 32])
    }

    pub const fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl From<[u8; 32]> for Buf32 {
    fn from(data: [u8; 32]) -> Self {
        Self(data)
    }
}

impl From<Buf32> for [u8; 32] {
    fn from(buf: Buf32) -> Self {
        buf.0
    }
}

impl AsRef<[u8; 32]> for Buf32 {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Display for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Abbreviated, the full value is available through `Debug`.
        let enc = hex::encode(&self.0[..4]);
        write!(f, "{enc}..")
    }
}
