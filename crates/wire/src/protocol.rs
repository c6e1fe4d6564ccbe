//! Request/response payloads carried over the framed transport.

use serde::{Deserialize, Serialize};

/// A single RPC call. Each variant corresponds to one storage-server
/// method (`Node.Init`, `Node.AddNode`, ... in the system this was ported
/// from).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Request {
    /// Tell a freshly joined node who its peers are and how many replicas
    /// to keep.
    Init {
        self_addr: String,
        other_nodes: Vec<String>,
        replicas: usize,
    },
    /// Inform a node that a peer joined the cluster.
    AddNode { address: String },
    /// Inform a node that a peer left the cluster.
    RemoveNode { address: String },
    Put { key: Vec<u8>, value: Vec<u8> },
    Get { key: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Reply to a `Request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Response {
    /// Acknowledges a mutation (`Init`/`AddNode`/`RemoveNode`/`Put`/`Delete`).
    Ok,
    /// Reply to `Get`; `None` if the key was absent.
    Value(Option<Vec<u8>>),
    /// The server rejected the request or hit a local error.
    Err(String),
}
