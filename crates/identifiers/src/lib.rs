//! Core identifier types for the rollhub workspace.

#[macro_use]
mod macros;

mod buf;
mod rollapp;

pub use buf::Buf32;
pub use rollapp::{HubHeight, RollappHeight, RollappId, SequencerAddr, StateInfoIndex};
