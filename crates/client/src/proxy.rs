//! Per-server RPC proxy.
//!
//! A `NodeProxy` holds only the address and identifier of the descriptor
//! it belongs to, plus a small synchronization primitive bounding how
//! many concurrent calls this process makes to one peer — it does not
//! keep a persistent connection. Every call opens a fresh framed
//! connection and closes it when the call completes.

use std::sync::Arc;
use std::time::Duration;

use corelib::NodeId;
use tokio::sync::{mpsc, Semaphore};
use wire::{Request, Response};

/// Upper bound on concurrent in-flight calls to a single peer.
const MAX_INFLIGHT: usize = 16;

pub struct NodeProxy {
    id: NodeId,
    addr: String,
    sem: Arc<Semaphore>,
}

impl NodeProxy {
    /// Probe `addr` for reachability with a bounded TCP connect, returning
    /// a proxy only on success. This is the only place the construction of
    /// a physical-node descriptor can fail.
    pub async fn probe(addr: &str, id: NodeId) -> Option<Self> {
        match tokio::time::timeout(wire::DIAL_DEADLINE, tokio::net::TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Some(Self {
                id,
                addr: addr.to_string(),
                sem: Arc::new(Semaphore::new(MAX_INFLIGHT)),
            }),
            _ => None,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn call(&self, req: Request, unreachable: Option<&mpsc::Sender<NodeId>>) -> Option<Response> {
        let _permit = match self.sem.acquire().await {
            Ok(p) => p,
            Err(_) => return None,
        };
        match self.try_call(req).await {
            Ok(resp) => Some(resp),
            Err(err) => {
                tracing::warn!(node = %self.addr, error = %err, "rpc call failed");
                if let Some(tx) = unreachable {
                    let _ = tx.try_send(self.id);
                }
                None
            }
        }
    }

    async fn try_call(&self, req: Request) -> Result<Response, wire::Error> {
        let mut t = wire::dial(&self.addr).await?;
        wire::codec::send(&mut t, &req).await?;
        wire::codec::recv(&mut t).await
    }

    pub async fn init(&self, other_nodes: Vec<String>, replicas: usize, unreachable: Option<&mpsc::Sender<NodeId>>) {
        self.call(
            Request::Init {
                self_addr: self.addr.clone(),
                other_nodes,
                replicas,
            },
            unreachable,
        )
        .await;
    }

    pub async fn add_node(&self, address: &str, unreachable: Option<&mpsc::Sender<NodeId>>) {
        self.call(
            Request::AddNode { address: address.to_string() },
            unreachable,
        )
        .await;
    }

    pub async fn remove_node(&self, address: &str, unreachable: Option<&mpsc::Sender<NodeId>>) {
        self.call(
            Request::RemoveNode { address: address.to_string() },
            unreachable,
        )
        .await;
    }

    pub async fn put(&self, key: Vec<u8>, value: Vec<u8>, unreachable: Option<&mpsc::Sender<NodeId>>) {
        self.call(Request::Put { key, value }, unreachable).await;
    }

    pub async fn get(&self, key: Vec<u8>, unreachable: Option<&mpsc::Sender<NodeId>>) -> Option<Vec<u8>> {
        match self.call(Request::Get { key }, unreachable).await {
            Some(Response::Value(v)) => v,
            _ => None,
        }
    }

    pub async fn delete(&self, key: Vec<u8>, unreachable: Option<&mpsc::Sender<NodeId>>) {
        self.call(Request::Delete { key }, unreachable).await;
    }
}

/// Wait kept small and explicit rather than inferred, so tests can assert
/// on it without hard-coding a magic duration elsewhere.
pub const PROBE_TIMEOUT: Duration = wire::DIAL_DEADLINE;
