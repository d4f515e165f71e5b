use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::KvStore;

/// Append-only list of typed records serialized as one JSON array under a
/// single key.
///
/// Appends are read-modify-write cycles serialized by an internal mutex, so
/// interleaved appends from one session never drop records. Two `JsonList`s
/// over the same key do not coordinate with each other; a session owns
/// exactly one per key.
pub struct JsonList<T> {
    kv: Arc<dyn KvStore>,
    key: &'static str,
    append_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonList<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(kv: Arc<dyn KvStore>, key: &'static str) -> Self {
        Self {
            kv,
            key,
            append_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// The key this list is stored under.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load all records in storage order. A missing key is an empty list.
    ///
    /// Data that does not decode into `T` is reported as
    /// [`StoreError::Corrupt`].
    pub fn load(&self) -> StoreResult<Vec<T>> {
        match self.kv.get(self.key)? {
            None => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
                key: self.key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Append a record built from the current contents.
    ///
    /// `make` sees the records already stored and returns the new one (or an
    /// error, in which case nothing is written). The list is rewritten in one
    /// `put`; if that fails the stored list is unchanged.
    pub fn append_with<E, F>(&self, make: F) -> Result<T, E>
    where
        T: Clone,
        E: From<StoreError>,
        F: FnOnce(&[T]) -> Result<T, E>,
    {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| E::from(StoreError::LockPoisoned))?;

        let mut records = self.load()?;
        let record = make(&records)?;
        records.push(record.clone());

        let encoded =
            serde_json::to_vec(&records).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.kv.put(self.key, &encoded)?;

        debug!(key = self.key, len = records.len(), "list append");
        Ok(record)
    }
}

impl<T> std::fmt::Debug for JsonList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonList").field("key", &self.key).finish()
    }
}
