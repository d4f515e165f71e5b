use std::time::Duration;

use quire_types::{Address, BookId};

use crate::wallet::TransferReceipt;

/// Errors reported by a [`WalletProvider`](crate::WalletProvider).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("no account connected")]
    NotConnected,

    /// The user declined the prompt.
    #[error("request rejected by user")]
    Rejected,

    #[error("transfer {tx} failed: {reason}")]
    TransferFailed { tx: String, reason: String },

    #[error("wallet provider error: {0}")]
    Provider(String),
}

/// Why a purchase attempt did not produce an entitlement.
#[derive(Clone, Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("no wallet account connected")]
    NotConnected,

    #[error("{author} is the author of book {book} and cannot buy it")]
    SelfPurchase { book: BookId, author: Address },

    /// The buyer already holds an entitlement to the book.
    #[error("{buyer} already owns book {book}")]
    AlreadyOwned { book: BookId, buyer: Address },

    /// Existing entitlements could not be read, so no transfer was started.
    #[error("could not check existing purchases: {0}")]
    EntitlementCheck(String),

    #[error("transfer rejected by user")]
    UserRejected,

    #[error("no answer from wallet within {0:?}")]
    Timeout(Duration),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// The transfer confirmed but the entitlement could not be recorded.
    #[error(
        "transfer {} confirmed but purchase was not recorded ({reason}); manual reconciliation required",
        receipt.transaction_hash
    )]
    LedgerWrite {
        receipt: TransferReceipt,
        reason: String,
    },

    #[error("purchase abandoned")]
    Abandoned,

    /// The flow is not idle; call `reset` after a terminal state.
    #[error("purchase flow is {0}, not idle")]
    NotIdle(&'static str),

    #[error("wallet error: {0}")]
    Wallet(WalletError),
}

impl PurchaseError {
    /// Returns `true` if value may have moved without an entitlement.
    pub fn needs_reconciliation(&self) -> bool {
        matches!(self, Self::LedgerWrite { .. })
    }
}

pub type PurchaseResult<T> = Result<T, PurchaseError>;
