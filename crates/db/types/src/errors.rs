use rollhub_identifiers::HubHeight;
use thiserror::Error;
use typed_sled::error::Error;

#[derive(Debug, Error, Clone)]
pub enum DbError {
    #[error("missing hub state at height {0}")]
    MissingHubState(HubHeight),

    #[error("missing write batch at height {0}")]
    MissingWriteBatch(HubHeight),

    #[error("tried to revert to height {0} above current tip {1}")]
    RevertAboveCurrent(HubHeight, HubHeight),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for DbError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}

impl From<Error> for DbError {
    fn from(value: Error) -> Self {
        Self::Other(format!("sled error: {value:?}"))
    }
}

pub type DbResult<T> = Result<T, DbError>;
