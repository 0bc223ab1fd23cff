//! Errors produced by the rollapp pipeline.

use rollhub_identifiers::{HubHeight, RollappHeight, RollappId};
use thiserror::Error;

/// Broad class of a [`RollappError`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// A rollapp or state entry does not exist.
    NotFound,

    /// The operation does not apply to the current state.
    FailedPrecondition,

    /// The targeted state is already finalized and can't be touched.
    AlreadyFinalized,

    /// Malformed heights or indexes.
    InvalidArgument,
}

#[derive(Debug, Error)]
pub enum RollappError {
    #[error("unknown rollapp {0}")]
    UnknownRollapp(RollappId),

    #[error("rollapp {0} already registered")]
    RollappExists(RollappId),

    #[error("rollapp {0} has no state updates")]
    NoStateUpdates(RollappId),

    #[error("missing state info {0}#{1}")]
    MissingStateInfo(RollappId, u64),

    #[error("no state info covers height {1} of rollapp {0}")]
    StateNotExists(RollappId, RollappHeight),

    #[error("invalid height {0}")]
    InvalidHeight(RollappHeight),

    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    #[error("rollapp {0} is frozen")]
    Frozen(RollappId),

    #[error("wrong start height for rollapp {rollapp_id}: expected {expected}, got {got}")]
    WrongBlockHeight {
        rollapp_id: RollappId,
        expected: RollappHeight,
        got: RollappHeight,
    },

    #[error("state info {0}#{1} is already finalized")]
    AlreadyFinalized(RollappId, u64),

    #[error("state info {0}#{1} is not pending")]
    NotPending(RollappId, u64),

    #[error("fraud height {fraud_height} is before state info start {start_height} of {rollapp_id}")]
    FraudHeightBeforeStart {
        rollapp_id: RollappId,
        fraud_height: RollappHeight,
        start_height: RollappHeight,
    },

    #[error("can't revert the first state info of rollapp {0}")]
    NoPreviousState(RollappId),

    #[error("state log of {0} is inconsistent: {1}")]
    BrokenStateLog(RollappId, String),

    #[error("finalization queue entry ({0}, {1}) is missing")]
    MissingQueueEntry(HubHeight, RollappId),

    #[error("hook {0} failed: {1}")]
    Hook(&'static str, #[source] anyhow::Error),
}

impl RollappError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownRollapp(_)
            | Self::NoStateUpdates(_)
            | Self::MissingStateInfo(..)
            | Self::StateNotExists(..)
            | Self::MissingQueueEntry(..) => ErrorKind::NotFound,
            Self::AlreadyFinalized(..) => ErrorKind::AlreadyFinalized,
            Self::InvalidHeight(_) | Self::InvalidBatch(_) => ErrorKind::InvalidArgument,
            Self::RollappExists(_)
            | Self::Frozen(_)
            | Self::WrongBlockHeight { .. }
            | Self::NotPending(..)
            | Self::FraudHeightBeforeStart { .. }
            | Self::NoPreviousState(_)
            | Self::BrokenStateLog(..)
            | Self::Hook(..) => ErrorKind::FailedPrecondition,
        }
    }
}

pub type RollappResult<T> = Result<T, RollappError>;
