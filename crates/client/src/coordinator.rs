//! Client coordinator: owns the ring, the membership table, and the
//! background reaper that evicts unreachable nodes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use corelib::{NodeId, PhysicalNode, Ring};
use parking_lot::Mutex as SyncMutex;
use tokio::sync::{mpsc, Mutex};

use crate::error::Error;
use crate::proxy::NodeProxy;

/// Capacity of the channel nodes use to report themselves unreachable.
const UNREACHABLE_CHANNEL_CAPACITY: usize = 1024;
/// Replica bounds, mirroring the system this was ported from: replicas
/// must be at least this many and fewer than the node count.
pub const DEFAULT_REPLICAS: usize = 1;

/// Ring and membership table, mutated together under one lock so a
/// concurrent reader never observes one without the other (R4).
struct State {
    ring: Ring<NodeProxy>,
    members: HashMap<NodeId, Arc<PhysicalNode<NodeProxy>>>,
}

struct Inner {
    state: Mutex<State>,
    unreachable_tx: SyncMutex<Option<mpsc::Sender<NodeId>>>,
    next_id: AtomicU64,
    replicas: usize,
}

/// Coordinates placement and RPC dispatch across the registered storage
/// nodes. Cheap to clone — internally `Arc`-backed.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Construct a coordinator over `addresses`, probing each for
    /// reachability and registering the reachable ones with the ring.
    /// `weights` defaults to 1 per node when absent.
    pub async fn new(
        addresses: Vec<String>,
        weights: Option<Vec<u32>>,
        replicas: usize,
    ) -> Result<Self, Error> {
        let node_count = addresses.len();
        if node_count < DEFAULT_REPLICAS + 1 {
            return Err(Error::Precondition(format!(
                "need at least {} nodes, got {}",
                DEFAULT_REPLICAS + 1,
                node_count
            )));
        }
        if replicas < DEFAULT_REPLICAS || replicas > node_count {
            return Err(Error::Precondition(format!(
                "replicas must be within [{}, {}], got {}",
                DEFAULT_REPLICAS, node_count, replicas
            )));
        }

        let weights = weights.unwrap_or_else(|| vec![1; node_count]);
        let average_weight = weights.iter().map(|w| *w as f64).sum::<f64>() / node_count as f64;

        let mut ring: Ring<NodeProxy> = Ring::new();
        ring.set_average_weight(average_weight);

        let next_id = AtomicU64::new(1);
        let mut members = HashMap::new();
        for (addr, weight) in addresses.iter().zip(weights.iter()) {
            let id = NodeId(next_id.fetch_add(1, Ordering::Relaxed) as u128);
            if let Some(proxy) = NodeProxy::probe(addr, id).await {
                if let Some(node) = ring.add(addr, *weight, id, proxy) {
                    members.insert(node.id, node);
                }
            }
        }

        let (tx, mut rx) = mpsc::channel(UNREACHABLE_CHANNEL_CAPACITY);
        let inner = Arc::new(Inner {
            state: Mutex::new(State { ring, members }),
            unreachable_tx: SyncMutex::new(Some(tx.clone())),
            next_id,
            replicas,
        });
        let client = Client { inner };

        {
            let state = client.inner.state.lock().await;
            for node in state.members.values() {
                let node = Arc::clone(node);
                let other: Vec<String> = state
                    .members
                    .values()
                    .filter(|n| n.id != node.id)
                    .map(|n| n.addr.clone())
                    .collect();
                let tx = tx.clone();
                let replicas = client.inner.replicas;
                tokio::spawn(async move {
                    node.proxy.init(other, replicas, Some(&tx)).await;
                });
            }
        }

        let reaper_client = client.clone();
        tokio::spawn(async move {
            while let Some(id) = rx.recv().await {
                reaper_client.remove_node(id).await;
            }
        });

        Ok(client)
    }

    fn tx_clone(&self) -> Option<mpsc::Sender<NodeId>> {
        self.inner.unreachable_tx.lock().clone()
    }

    /// Register a new node, probing reachability and notifying peers.
    pub async fn add_node(&self, address: &str, weight: u32) -> Option<NodeId> {
        let id = NodeId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) as u128);
        let proxy = NodeProxy::probe(address, id).await?;

        let (node, peers) = {
            let mut state = self.inner.state.lock().await;
            let node = state.ring.add(address, weight, id, proxy)?;
            state.members.insert(node.id, Arc::clone(&node));
            let peers: Vec<_> = state
                .members
                .values()
                .filter(|n| n.id != node.id)
                .map(Arc::clone)
                .collect();
            (node, peers)
        };

        let tx = self.tx_clone();
        for peer in peers {
            let addr = address.to_string();
            let tx = tx.clone();
            tokio::spawn(async move {
                peer.proxy.add_node(&addr, tx.as_ref()).await;
            });
        }
        Some(node.id)
    }

    /// Remove a node from the ring and membership table, and tell its
    /// peers it's gone. Safe to call more than once for the same id.
    pub async fn remove_node(&self, id: NodeId) {
        let (node, peers) = {
            let mut state = self.inner.state.lock().await;
            let Some(node) = state.members.remove(&id) else { return };
            state.ring.delete(&node.addr, node.weight);
            let peers: Vec<_> = state.members.values().map(Arc::clone).collect();
            (node, peers)
        };

        let tx = self.tx_clone();
        for peer in peers {
            let addr = node.addr.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                peer.proxy.remove_node(&addr, tx.as_ref()).await;
            });
        }
    }

    pub async fn put(&self, key: &[u8], value: &[u8]) {
        let Some(node) = self.route(key).await else { return };
        let tx = self.tx_clone();
        node.proxy.put(key.to_vec(), value.to_vec(), tx.as_ref()).await;
    }

    pub async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let node = self.route(key).await?;
        let tx = self.tx_clone();
        node.proxy.get(key.to_vec(), tx.as_ref()).await
    }

    pub async fn delete(&self, key: &[u8]) {
        let Some(node) = self.route(key).await else { return };
        let tx = self.tx_clone();
        node.proxy.delete(key.to_vec(), tx.as_ref()).await;
    }

    async fn route(&self, key: &[u8]) -> Option<Arc<PhysicalNode<NodeProxy>>> {
        let hash = corelib::hash::key_hash(key);
        let state = self.inner.state.lock().await;
        state.ring.find(hash).ok()
    }

    /// Shut down the unreachable channel, which in turn ends the reaper
    /// task once any in-flight RPCs holding their own sender clone finish.
    pub fn close(&self) {
        *self.inner.unreachable_tx.lock() = None;
    }

    /// Human-readable summary of ring/membership state, for diagnostics.
    pub async fn describe(&self) -> String {
        let state = self.inner.state.lock().await;
        let mut out = String::new();
        out.push_str("Ring Description:\n");
        out.push_str(&format!("  Nodes: {}\n", state.members.len()));
        out.push_str(&format!("  Virtual nodes: {}\n", state.ring.vnode_count()));
        out.push_str(&format!("  Average weight: {:.2}\n", state.ring.average_weight()));
        out.push_str(&format!("  Replicas: {}\n", self.inner.replicas));
        if !state.members.is_empty() {
            out.push_str("\nMembers:\n");
            let mut addrs: Vec<&str> = state.members.values().map(|n| n.addr.as_str()).collect();
            addrs.sort_unstable();
            for addr in addrs {
                out.push_str(&format!("  {addr}\n"));
            }
        }
        out
    }
}
