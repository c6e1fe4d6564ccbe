//! Server-side replica selection.
//!
//! When a storage node is initialized it is handed the full address list
//! of its peers and picks a random subset to treat as its replica set.
//! This is deliberately not a ring-aware strategy: the storage server
//! doesn't have (or need) the ring, only the flat peer list the
//! coordinator sent it at `Init` time.

pub mod error;
pub mod sampler;

pub use error::ReplicationError;
pub use sampler::choose_replicas;
