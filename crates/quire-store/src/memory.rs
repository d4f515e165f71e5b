use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::keys::is_valid_key;
use crate::traits::KvStore;

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Values are held behind a `RwLock` and
/// cloned on read. An optional byte quota emulates the size limit of browser
/// storage.
pub struct InMemoryKv {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    max_bytes: Option<u64>,
}

impl InMemoryKv {
    /// Create a new empty store without a quota.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_bytes: None,
        }
    }

    /// Create a new empty store that rejects writes beyond `max_bytes`.
    pub fn with_quota(max_bytes: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_bytes: Some(max_bytes),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;

        if let Some(max) = self.max_bytes {
            let used: u64 = map.values().map(|v| v.len() as u64).sum();
            let replaced = map.get(key).map(|v| v.len() as u64).unwrap_or(0);
            let available = max.saturating_sub(used - replaced);
            if value.len() as u64 > available {
                return Err(StoreError::QuotaExceeded {
                    requested: value.len() as u64,
                    available,
                });
            }
        }

        map.insert(key.to_string(), value.to_vec());
        debug!(key, len = value.len(), "kv put");
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn used_bytes(&self) -> StoreResult<u64> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.values().map(|v| v.len() as u64).sum())
    }
}

impl std::fmt::Debug for InMemoryKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKv")
            .field("key_count", &self.len())
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
