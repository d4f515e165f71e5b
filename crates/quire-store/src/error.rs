/// Errors from key-value and content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested key or content was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would exceed the configured storage quota.
    #[error("storage quota exceeded: {requested} bytes requested, {available} available")]
    QuotaExceeded { requested: u64, available: u64 },

    /// Persisted data failed its checksum or could not be decoded.
    #[error("corrupt entry {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// The key contains characters the backend cannot store.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// A content URI could not be parsed or belongs to another store.
    #[error("invalid content uri {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// An uploaded file name cannot be embedded in a content URI.
    #[error("invalid content name {0:?}")]
    InvalidName(String),

    /// Serialization failure while encoding a value.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
