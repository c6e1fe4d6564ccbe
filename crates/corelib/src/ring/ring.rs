//! Skip-list backed consistent hash ring.
//!
//! Storage is an arena (`Vec<Option<Entry<P>>>`) with a free list for
//! reused slots; forward pointers are indices into the arena rather than
//! raw pointers, so the whole structure is safe and ordinary `Vec`-backed.
//! `None` as a predecessor means "the header" — the header's own forward
//! array is tracked separately from the arena.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::hash;
use crate::node::{NodeId, PhysicalNode};

/// Maximum number of skip-list levels.
pub const MAX_LEVEL: usize = 32;
/// Virtual nodes contributed per unit of weight at average weight.
pub const DEFAULT_FACTOR: u32 = 40;
/// Branching factor: each level is entered with probability `1/BRANCHING`.
const BRANCHING: u32 = 4;
/// Fixed seed so ring shape is reproducible across process restarts given
/// the same sequence of operations.
const RING_SEED: u64 = 0x70_65_6e_74_61_64_62_00;

struct Entry<P> {
    hash: u32,
    node: Arc<PhysicalNode<P>>,
    forward: Vec<Option<usize>>,
}

/// A consistent hash ring over physical nodes carrying proxy payload `P`.
pub struct Ring<P> {
    header: Vec<Option<usize>>,
    arena: Vec<Option<Entry<P>>>,
    free: Vec<usize>,
    level: usize,
    vnode_count: usize,
    host_filter: HashSet<String>,
    average_weight: f64,
    rng: StdRng,
}

impl<P> Ring<P> {
    pub fn new() -> Self {
        Self {
            header: vec![None; MAX_LEVEL],
            arena: Vec::new(),
            free: Vec::new(),
            level: 1,
            vnode_count: 0,
            host_filter: HashSet::new(),
            average_weight: 1.0,
            rng: StdRng::seed_from_u64(RING_SEED),
        }
    }

    /// Set the cluster's average weight, used by subsequent `add`/`delete`
    /// calls to compute a node's virtual-node count. Computed once from the
    /// full membership at startup; it is not recomputed as nodes come and
    /// go, matching the behavior this was ported from.
    pub fn set_average_weight(&mut self, average_weight: f64) {
        self.average_weight = average_weight;
    }

    pub fn average_weight(&self) -> f64 {
        self.average_weight
    }

    pub fn vnode_count(&self) -> usize {
        self.vnode_count
    }

    pub fn contains_host(&self, address: &str) -> bool {
        self.host_filter.contains(hash::host_of(address))
    }

    fn target_vnode_count(&self, weight: u32) -> usize {
        if self.average_weight <= 0.0 {
            return 0;
        }
        ((DEFAULT_FACTOR as f64 * weight as f64) / self.average_weight).floor() as usize
    }

    /// Register a new physical node. Returns `None` without mutating state
    /// if a node with the same host is already present.
    pub fn add(&mut self, address: &str, weight: u32, id: NodeId, proxy: P) -> Option<Arc<PhysicalNode<P>>> {
        let host = hash::host_of(address).to_string();
        if self.host_filter.contains(&host) {
            return None;
        }

        let node = Arc::new(PhysicalNode {
            id,
            addr: address.to_string(),
            created_at: SystemTime::now(),
            weight,
            proxy,
        });

        let groups = self.target_vnode_count(weight) / 4;
        for group in 0..groups {
            let digest = hash::group_digest(address, group);
            for i in 0..4 {
                let h = hash::place(&digest, i);
                self.insert(h, Arc::clone(&node));
            }
        }
        self.host_filter.insert(host);
        Some(node)
    }

    /// Remove a previously registered node's virtual nodes. Silent no-op
    /// if the host is not present.
    pub fn delete(&mut self, address: &str, weight: u32) {
        let host = hash::host_of(address).to_string();
        if !self.host_filter.remove(&host) {
            return;
        }

        let groups = self.target_vnode_count(weight) / 4;
        for group in 0..groups {
            let digest = hash::group_digest(address, group);
            for i in 0..4 {
                let h = hash::place(&digest, i);
                self.delete_hash(h);
            }
        }
    }

    /// Find the physical node owning `hash`, wrapping around to the
    /// smallest virtual node if `hash` is past the largest one.
    pub fn find(&self, hash: u32) -> Result<Arc<PhysicalNode<P>>, crate::Error> {
        if self.vnode_count == 0 {
            return Err(crate::Error::Placement("ring has no virtual nodes".into()));
        }
        let mut cur: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                match self.forward_at(cur, i) {
                    Some(idx) if self.entry(idx).hash < hash => cur = Some(idx),
                    _ => break,
                }
            }
        }
        let idx = match self.forward_at(cur, 0) {
            Some(idx) => idx,
            None => self
                .header[0]
                .expect("non-empty ring must have a level-0 entry"),
        };
        Ok(Arc::clone(&self.entry(idx).node))
    }

    fn entry(&self, idx: usize) -> &Entry<P> {
        self.arena[idx].as_ref().expect("dangling arena index")
    }

    fn forward_at(&self, pred: Option<usize>, level: usize) -> Option<usize> {
        match pred {
            None => self.header[level],
            Some(idx) => self.entry(idx).forward[level],
        }
    }

    fn set_forward(&mut self, pred: Option<usize>, level: usize, value: Option<usize>) {
        match pred {
            None => self.header[level] = value,
            Some(idx) => self.arena[idx].as_mut().expect("dangling arena index").forward[level] = value,
        }
    }

    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while level < MAX_LEVEL && self.rng.gen_range(0..BRANCHING) == 0 {
            level += 1;
        }
        level
    }

    fn alloc(&mut self, entry: Entry<P>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.arena[idx] = Some(entry);
            idx
        } else {
            self.arena.push(Some(entry));
            self.arena.len() - 1
        }
    }

    /// Insert a virtual node at `hash`. Rejects exact hash collisions (a
    /// new physical node would otherwise silently steal an existing
    /// virtual node's position).
    fn insert(&mut self, hash: u32, node: Arc<PhysicalNode<P>>) -> bool {
        let mut update: Vec<Option<usize>> = vec![None; MAX_LEVEL];
        let mut cur: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                match self.forward_at(cur, i) {
                    Some(idx) if self.entry(idx).hash < hash => cur = Some(idx),
                    _ => break,
                }
            }
            update[i] = cur;
        }

        if let Some(idx) = self.forward_at(update[0], 0) {
            if self.entry(idx).hash == hash {
                return false;
            }
        }

        let level = self.random_level();
        if level > self.level {
            for slot in update.iter_mut().take(level).skip(self.level) {
                *slot = None;
            }
            self.level = level;
        }

        let idx = self.alloc(Entry {
            hash,
            node,
            forward: vec![None; level],
        });
        for i in 0..level {
            let next = self.forward_at(update[i], i);
            self.set_forward(update[i], i, Some(idx));
            self.arena[idx].as_mut().unwrap().forward[i] = next;
        }
        self.vnode_count += 1;
        true
    }

    fn delete_hash(&mut self, hash: u32) {
        let mut update: Vec<Option<usize>> = vec![None; MAX_LEVEL];
        let mut cur: Option<usize> = None;
        for i in (0..self.level).rev() {
            loop {
                match self.forward_at(cur, i) {
                    Some(idx) if self.entry(idx).hash < hash => cur = Some(idx),
                    _ => break,
                }
            }
            update[i] = cur;
        }

        let target = match self.forward_at(update[0], 0) {
            Some(idx) if self.entry(idx).hash == hash => idx,
            _ => return,
        };

        let target_level = self.entry(target).forward.len();
        for i in 0..target_level {
            if self.forward_at(update[i], i) == Some(target) {
                let next = self.entry(target).forward[i];
                self.set_forward(update[i], i, next);
            }
        }

        self.arena[target] = None;
        self.free.push(target);
        self.vnode_count -= 1;

        while self.level > 1 && self.header[self.level - 1].is_none() {
            self.level -= 1;
        }
    }
}

impl<P> Default for Ring<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u128) -> NodeId {
        NodeId(n)
    }

    #[test]
    fn empty_ring_find_fails() {
        let ring: Ring<()> = Ring::new();
        assert!(ring.find(0).is_err());
    }

    #[test]
    fn single_node_owns_every_key() {
        let mut ring: Ring<()> = Ring::new();
        ring.set_average_weight(1.0);
        let node = ring.add("10.0.0.1:4567", 1, id(1), ()).unwrap();
        for h in [0u32, 1, u32::MAX / 2, u32::MAX] {
            assert_eq!(ring.find(h).unwrap().id, node.id);
        }
    }

    #[test]
    fn duplicate_host_rejected() {
        let mut ring: Ring<()> = Ring::new();
        ring.set_average_weight(1.0);
        assert!(ring.add("10.0.0.1:4567", 1, id(1), ()).is_some());
        assert!(ring.add("10.0.0.1:4567", 1, id(2), ()).is_none());
    }

    #[test]
    fn remove_then_find_changes_owner() {
        let mut ring: Ring<()> = Ring::new();
        ring.set_average_weight(1.0);
        let a = ring.add("10.0.0.1:4567", 1, id(1), ()).unwrap();
        let b = ring.add("10.0.0.2:4567", 1, id(2), ()).unwrap();
        assert_ne!(a.id, b.id);
        ring.delete("10.0.0.1:4567", 1);
        assert!(!ring.contains_host("10.0.0.1:4567"));
        for h in [0u32, u32::MAX / 3, u32::MAX] {
            assert_eq!(ring.find(h).unwrap().id, b.id);
        }
    }

    #[test]
    fn higher_weight_gets_more_vnodes() {
        let mut light: Ring<()> = Ring::new();
        light.set_average_weight(1.0);
        light.add("10.0.0.1:4567", 1, id(1), ());
        let light_count = light.vnode_count();

        let mut heavy: Ring<()> = Ring::new();
        heavy.set_average_weight(1.0);
        heavy.add("10.0.0.1:4567", 4, id(1), ());
        let heavy_count = heavy.vnode_count();

        assert!(heavy_count > light_count);
    }

    #[test]
    fn delete_of_absent_host_is_noop() {
        let mut ring: Ring<()> = Ring::new();
        ring.set_average_weight(1.0);
        ring.add("10.0.0.1:4567", 1, id(1), ());
        let before = ring.vnode_count();
        ring.delete("10.0.0.2:4567", 1);
        assert_eq!(ring.vnode_count(), before);
    }

    #[test]
    fn query_past_the_last_hash_wraps_to_the_smallest_entry() {
        let mut ring: Ring<()> = Ring::new();
        ring.set_average_weight(1.0);
        ring.add("10.0.0.1:4567", 1, id(1), ());
        ring.add("10.0.0.2:4567", 1, id(2), ());

        let smallest_idx = ring.header[0].expect("non-empty ring has a level-0 entry");
        let smallest_id = ring.entry(smallest_idx).node.id;

        assert_eq!(ring.find(u32::MAX).unwrap().id, smallest_id);
    }

    #[test]
    fn lookup_is_deterministic() {
        let mut ring: Ring<()> = Ring::new();
        ring.set_average_weight(1.0);
        ring.add("10.0.0.1:4567", 1, id(1), ());
        ring.add("10.0.0.2:4567", 1, id(2), ());
        ring.add("10.0.0.3:4567", 1, id(3), ());
        let h = hash::key_hash(b"some-key");
        let first = ring.find(h).unwrap().id;
        for _ in 0..10 {
            assert_eq!(ring.find(h).unwrap().id, first);
        }
    }
}
