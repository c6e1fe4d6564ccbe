//! Errors from replica selection.

#[derive(Debug, thiserror::Error)]
pub enum ReplicationError {
    #[error("replica count must be greater than zero, got {0}")]
    InvalidCount(usize),

    #[error("no peers to select replicas from")]
    EmptyPeerSet,
}
