use quire_types::ContentId;

use crate::content::{ContentBase, ContentBlob, ContentUri};
use crate::error::{StoreError, StoreResult};

/// Flat key-value persistence backend.
///
/// All implementations must satisfy these invariants:
/// - A `put` either fully replaces the value or leaves the old one intact.
/// - Concurrent reads are always safe.
/// - Writes that would exceed a configured quota fail without storing.
/// - All I/O errors are propagated, never silently ignored.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Create or replace the value stored under `key`.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Total bytes across all stored values.
    fn used_bytes(&self) -> StoreResult<u64>;

    /// Check whether a key exists.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Store for immutable content blobs addressed by derived URIs.
pub trait ContentStore: Send + Sync {
    /// Persist `data` under a fresh content id and return its URI.
    ///
    /// `name` is the original file name; it becomes the last URI segment.
    fn store(&self, name: &str, data: &[u8]) -> StoreResult<ContentUri>;

    /// Read a blob by id. Returns `Ok(None)` if it was never stored.
    fn read_blob(&self, id: &ContentId) -> StoreResult<Option<ContentBlob>>;

    /// The `scheme://host` prefix of every URI this store derives.
    fn base(&self) -> &ContentBase;

    /// Resolve a URI produced by [`ContentStore::store`] to its bytes.
    fn retrieve(&self, uri: &ContentUri) -> StoreResult<Vec<u8>> {
        if uri.base() != self.base() {
            return Err(StoreError::InvalidUri {
                uri: uri.to_string(),
                reason: format!("not served by {}", self.base()),
            });
        }
        self.read_blob(uri.id())?
            .map(|blob| blob.bytes)
            .ok_or_else(|| StoreError::NotFound(uri.to_string()))
    }

    /// Check whether a blob with this id exists.
    fn exists(&self, id: &ContentId) -> StoreResult<bool> {
        Ok(self.read_blob(id)?.is_some())
    }
}
