//! State types of the hub's rollapp pipeline.

mod accessor;
mod finalization_queue;
mod liveness;
mod params;
mod rollapp;
mod state_info;
mod toplevel;
mod write_batch;

pub use accessor::IHubStateAccessor;
pub use finalization_queue::FinalizationQueueEntry;
pub use liveness::LivenessEvent;
pub use params::{HubParams, ParamsError, MIN_DISPUTE_PERIOD_IN_BLOCKS};
pub use rollapp::{Revision, Rollapp};
pub use state_info::{BlockDescriptor, StateInfo, StateStatus};
pub use toplevel::HubState;
pub use write_batch::{HeightKey, HubWriteBatch, StateInfoKey};
