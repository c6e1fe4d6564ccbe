//! Storage server state machine.
//!
//! All mutable state — the peer list, the replica set, and (conservatively)
//! access to the local store — lives behind one `RwLock`. `Put`/`Delete`
//! take the write side; `Get` only needs to read, so it takes the read
//! side.

use std::sync::Arc;

use crate::error::ServerError;
use crate::store::LocalStore;

struct Inner {
    self_addr: String,
    other_nodes: Vec<String>,
    replica_nodes: Vec<String>,
}

pub struct Handler {
    state: tokio::sync::RwLock<Inner>,
    store: Arc<dyn LocalStore>,
}

impl Handler {
    pub fn new(self_addr: String, store: Arc<dyn LocalStore>) -> Self {
        Self {
            state: tokio::sync::RwLock::new(Inner {
                self_addr,
                other_nodes: Vec::new(),
                replica_nodes: Vec::new(),
            }),
            store,
        }
    }

    /// Record the cluster's membership and pick this node's replica set.
    /// Fails when `replicas` is out of range or `other_nodes` is empty —
    /// there is nothing to sample replicas from.
    pub async fn init(&self, self_addr: String, other_nodes: Vec<String>, replicas: usize) -> Result<(), ServerError> {
        let mut state = self.state.write().await;
        state.self_addr = self_addr.clone();
        state.other_nodes = other_nodes.clone();

        let mut replica_nodes = replication::choose_replicas(&other_nodes, replicas)?;
        replica_nodes.push(self_addr);
        state.replica_nodes = replica_nodes;
        Ok(())
    }

    pub async fn add_node(&self, address: String) {
        let mut state = self.state.write().await;
        if !state.other_nodes.contains(&address) {
            state.other_nodes.push(address);
        }
    }

    pub async fn remove_node(&self, address: &str) {
        let mut state = self.state.write().await;
        state.other_nodes.retain(|a| a != address);
    }

    pub async fn put(&self, key: &[u8], value: &[u8]) -> Result<(), ServerError> {
        let _state = self.state.write().await;
        Ok(self.store.put(key, value)?)
    }

    pub async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, ServerError> {
        let _state = self.state.read().await;
        Ok(self.store.get(key)?)
    }

    pub async fn delete(&self, key: &[u8]) -> Result<(), ServerError> {
        let _state = self.state.write().await;
        Ok(self.store.delete(key)?)
    }

    #[cfg(test)]
    async fn replica_nodes(&self) -> Vec<String> {
        self.state.read().await.replica_nodes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SledStore;

    fn store() -> Arc<dyn LocalStore> {
        let mut p = std::env::temp_dir();
        p.push(format!("pdb-handler-test-{}-{}", std::process::id(), rand_suffix()));
        Arc::new(SledStore::open(&p).unwrap())
    }

    fn rand_suffix() -> u64 {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    #[tokio::test]
    async fn init_includes_self_in_replica_set() {
        let h = Handler::new("10.0.0.1:4567".into(), store());
        h.init(
            "10.0.0.1:4567".into(),
            vec!["10.0.0.2:4567".into(), "10.0.0.3:4567".into()],
            1,
        )
        .await
        .unwrap();
        let replicas = h.replica_nodes().await;
        assert!(replicas.contains(&"10.0.0.1:4567".to_string()));
    }

    #[tokio::test]
    async fn init_with_no_peers_fails() {
        let h = Handler::new("10.0.0.1:4567".into(), store());
        assert!(h.init("10.0.0.1:4567".into(), vec![], 1).await.is_err());
    }

    #[tokio::test]
    async fn put_get_delete_do_not_consult_replica_set() {
        let h = Handler::new("10.0.0.1:4567".into(), store());
        h.put(b"k", b"v").await.unwrap();
        assert_eq!(h.get(b"k").await.unwrap(), Some(b"v".to_vec()));
        h.delete(b"k").await.unwrap();
        assert_eq!(h.get(b"k").await.unwrap(), None);
    }
}
