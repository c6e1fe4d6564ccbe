//! Errors from the storage server handler.

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Replication(#[from] replication::ReplicationError),

    #[error(transparent)]
    Wire(#[from] wire::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Backend(#[from] sled::Error),
}
