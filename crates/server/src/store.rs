//! Local ordered key-value storage, abstracted behind a trait so the
//! handler doesn't need to know which embedded engine backs it.

use crate::error::StoreError;

pub trait LocalStore: Send + Sync {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
    /// `Ok(None)` when the key is absent — missing is not an error.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    /// Deleting an absent key is a no-op, not an error.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;
}

/// `sled`-backed implementation; the embedded ordered store analogue of
/// the system this was ported from (which used goleveldb).
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }
}

impl LocalStore for SledStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.db.remove(key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete_round_trip() {
        let dir = tempdir();
        let store = SledStore::open(&dir).unwrap();
        assert_eq!(store.get(b"k").unwrap(), None);
        store.put(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));
        store.delete(b"k").unwrap();
        assert_eq!(store.get(b"k").unwrap(), None);
    }

    #[test]
    fn delete_of_missing_key_is_not_an_error() {
        let dir = tempdir();
        let store = SledStore::open(&dir).unwrap();
        assert!(store.delete(b"missing").is_ok());
    }

    fn tempdir() -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("pdb-store-test-{}", std::process::id()));
        p.push(uniq());
        p
    }

    fn uniq() -> String {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        COUNTER.fetch_add(1, Ordering::SeqCst).to_string()
    }
}
