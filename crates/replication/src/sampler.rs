//! Random replica sampling without replacement.

use rand::Rng;

use crate::error::ReplicationError;

/// Choose up to `replicas` addresses from `peers` without replacement.
///
/// This is a partial Fisher-Yates shuffle: it swaps a chosen element to
/// the back of a shrinking pool rather than fully shuffling, which is
/// enough to produce a uniform sample of size `replicas.min(peers.len())`.
/// `peers` itself is never mutated — the pool is a copy — so a read-like
/// operation never silently reorders the caller's list.
pub fn choose_replicas(peers: &[String], replicas: usize) -> Result<Vec<String>, ReplicationError> {
    if replicas == 0 {
        return Err(ReplicationError::InvalidCount(replicas));
    }
    if peers.is_empty() {
        return Err(ReplicationError::EmptyPeerSet);
    }

    let mut pool: Vec<String> = peers.to_vec();
    let p = pool.len();
    let k = replicas.min(p);

    let mut rng = rand::thread_rng();
    let mut chosen = Vec::with_capacity(k);
    for i in 0..k {
        let remaining = p - i;
        let j = rng.gen_range(0..remaining);
        chosen.push(pool[j].clone());
        pool[j] = pool[remaining - 1].clone();
    }
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peers(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("10.0.0.{i}:4567")).collect()
    }

    #[test]
    fn rejects_zero_replicas() {
        assert!(matches!(
            choose_replicas(&peers(3), 0),
            Err(ReplicationError::InvalidCount(0))
        ));
    }

    #[test]
    fn rejects_empty_peer_set() {
        assert!(matches!(
            choose_replicas(&[], 2),
            Err(ReplicationError::EmptyPeerSet)
        ));
    }

    #[test]
    fn caps_at_peer_count() {
        let p = peers(2);
        let chosen = choose_replicas(&p, 5).unwrap();
        assert_eq!(chosen.len(), 2);
    }

    #[test]
    fn chosen_entries_are_unique_and_from_the_pool() {
        let p = peers(10);
        let chosen = choose_replicas(&p, 4).unwrap();
        assert_eq!(chosen.len(), 4);
        let unique: std::collections::HashSet<_> = chosen.iter().collect();
        assert_eq!(unique.len(), 4);
        for c in &chosen {
            assert!(p.contains(c));
        }
    }

    #[test]
    fn input_slice_is_never_mutated() {
        let p = peers(5);
        let before = p.clone();
        let _ = choose_replicas(&p, 3).unwrap();
        assert_eq!(p, before);
    }
}
