use std::time::Duration;

use quire_types::BookId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("book not found: {0}")]
    BookNotFound(BookId),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid input: {0}")]
    Type(#[from] quire_types::TypeError),

    #[error("store error: {0}")]
    Store(#[from] quire_store::StoreError),

    #[error("catalog error: {0}")]
    Catalog(#[from] quire_catalog::CatalogError),

    #[error("ledger error: {0}")]
    Ledger(#[from] quire_ledger::LedgerError),

    #[error("purchase error: {0}")]
    Purchase(#[from] quire_purchase::PurchaseError),

    #[error("wallet error: {0}")]
    Wallet(#[from] quire_purchase::WalletError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
