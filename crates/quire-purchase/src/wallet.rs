use async_trait::async_trait;
use quire_types::{Address, Price, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// A signed, submitted value transfer awaiting confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHandle {
    pub transaction_hash: String,
    pub from: Address,
    pub to: Address,
    pub amount: Price,
}

/// A confirmed value transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transaction_hash: String,
    pub from: Address,
    pub to: Address,
    pub amount: Price,
    pub confirmed_at: Timestamp,
}

/// Identity and session provider: supplies the connected account and moves
/// value on the user's behalf.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to connect and return the chosen account.
    async fn request_accounts(&self) -> Result<Address, WalletError>;

    /// The connected account, if any.
    async fn current_account(&self) -> Option<Address>;

    /// Prompt the user to sign a transfer of `amount` to `to`.
    async fn send_value_transfer(
        &self,
        to: &Address,
        amount: Price,
    ) -> Result<TransferHandle, WalletError>;

    /// Wait until the transfer is confirmed or definitively failed.
    async fn await_confirmation(
        &self,
        handle: &TransferHandle,
    ) -> Result<TransferReceipt, WalletError>;
}
