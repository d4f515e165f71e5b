use quire_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid transaction proof: {0:?}")]
    InvalidProof(String),

    /// The durable append failed; nothing was recorded.
    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error("corrupt ledger: {0}")]
    Corrupt(String),
}

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Corrupt { key, reason } => Self::Corrupt(format!("{key}: {reason}")),
            other => Self::Storage(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
