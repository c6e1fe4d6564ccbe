//! Physical and virtual node descriptors for the consistent hash ring.

use std::fmt;
use std::time::SystemTime;

/// Compact identifier for a physical node, assigned once at registration
/// time and stable for the node's lifetime in the ring.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u128);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// A physical node registered with the ring.
///
/// Generic over `P`, the type of its RPC proxy, so that `corelib` does not
/// need to know about sockets or async runtimes — callers (the client
/// coordinator) supply whatever proxy type they construct.
#[derive(Debug)]
pub struct PhysicalNode<P> {
    pub id: NodeId,
    /// `host:port` address this node listens on.
    pub addr: String,
    pub created_at: SystemTime,
    pub weight: u32,
    pub proxy: P,
}

impl<P> PhysicalNode<P> {
    pub fn host(&self) -> &str {
        crate::hash::host_of(&self.addr)
    }
}
