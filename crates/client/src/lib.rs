//! Client coordinator for the storage cluster.
//!
//! Owns the consistent hash ring, the node membership table, and a
//! background task that evicts nodes their own RPC proxies report as
//! unreachable.

pub mod coordinator;
pub mod error;
pub mod proxy;

pub use coordinator::{Client, DEFAULT_REPLICAS};
pub use error::Error;
pub use proxy::NodeProxy;
