use quire_store::StoreError;

/// Errors produced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid {field}: {reason}")]
    InvalidMetadata { field: &'static str, reason: String },

    /// The durable append failed; nothing was published.
    #[error("storage error: {0}")]
    Storage(StoreError),

    /// Persisted catalog data is malformed and was not trusted.
    #[error("corrupt catalog: {0}")]
    Corrupt(String),
}

impl From<StoreError> for CatalogError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Corrupt { key, reason } => Self::Corrupt(format!("{key}: {reason}")),
            other => Self::Storage(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
