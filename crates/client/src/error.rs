//! Errors from the client coordinator.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] corelib::Error),

    #[error("precondition failed: {0}")]
    Precondition(String),
}
