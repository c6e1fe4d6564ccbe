//! Errors from the framed transport.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("operation timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("encode/decode error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("connection closed by peer")]
    Closed,
}
