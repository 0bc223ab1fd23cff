//! Rollapp state commitment pipeline of the hub.
//!
//! Sequencers post batches of rollapp blocks, which sit in a per-rollapp
//! state log and a height-keyed finalization queue until their dispute
//! period passes.  Fraud rewinds the log with a hard fork, and rollapps that
//! stop posting get their sequencer slashed and eventually jailed.
//!
//! Everything is driven from [`RollappKeeper`], generic over the state it
//! runs on so the same code works on the toplevel state and on per-block
//! write layers.

mod block;
mod context;
mod errors;
mod events;
mod finalization;
mod hard_fork;
mod hooks;
mod keeper;
mod liveness;
mod proposer;
mod update_state;

pub mod finalization_queue;
pub mod invariants;
pub mod state_log;

#[cfg(test)]
mod test_utils;

pub use block::BlockExecutionOutput;
pub use context::{BlockContext, ExecContext};
pub use errors::{ErrorKind, RollappError, RollappResult};
pub use events::{EventBuffer, HubEvent};
#[cfg(any(test, feature = "test-utils"))]
pub use hooks::{MockRollappHooks, MockSequencerKeeper};
pub use hooks::{NoopHooks, NoopSequencers, RollappHooks, SequencerKeeper};
pub use keeper::RollappKeeper;
pub use liveness::next_slash_or_jail_height;
pub use update_state::StateUpdate;
