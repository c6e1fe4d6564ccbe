//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A precondition on ring construction or mutation was violated.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A lookup could not be satisfied (e.g. an empty ring).
    #[error("placement failed: {0}")]
    Placement(String),

    /// The skip list's internal bookkeeping is inconsistent.
    #[error("internal ring error: {0}")]
    Internal(String),
}
