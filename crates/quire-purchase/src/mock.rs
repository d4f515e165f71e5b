use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use quire_types::{Address, Price, Timestamp};
use tracing::debug;
use uuid::Uuid;

use crate::error::WalletError;
use crate::wallet::{TransferHandle, TransferReceipt, WalletProvider};

/// How a [`MockWallet`] answers transfer requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MockBehavior {
    /// Sign and confirm every transfer.
    #[default]
    Approve,
    /// The user declines the signature prompt.
    Reject,
    /// Signing succeeds but the transfer never confirms.
    FailConfirmation,
    /// The signature prompt is never answered.
    HangSignature,
    /// Signing succeeds but confirmation is never reported.
    HangConfirmation,
}

/// In-process wallet with scripted answers.
///
/// Transaction hashes are `0x` plus the BLAKE3 digest of the transfer
/// fields and a fresh UUID, so every transfer gets a distinct hash. Amounts
/// are signed in the token's smallest unit; a price finer than that unit is
/// refused.
#[derive(Debug)]
pub struct MockWallet {
    account: Address,
    connected: Mutex<bool>,
    behavior: Mutex<MockBehavior>,
    transfers: Mutex<Vec<TransferHandle>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockWallet {
    /// A wallet holding `account` that must be connected before use.
    pub fn new(account: Address) -> Self {
        Self {
            account,
            connected: Mutex::new(false),
            behavior: Mutex::new(MockBehavior::Approve),
            transfers: Mutex::new(Vec::new()),
        }
    }

    /// A wallet already connected as `account`.
    pub fn connected(account: Address) -> Self {
        let wallet = Self::new(account);
        *lock(&wallet.connected) = true;
        wallet
    }

    pub fn with_behavior(self, behavior: MockBehavior) -> Self {
        self.set_behavior(behavior);
        self
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *lock(&self.behavior) = behavior;
    }

    pub fn disconnect(&self) {
        *lock(&self.connected) = false;
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    /// Transfers that were signed, in request order.
    pub fn transfers(&self) -> Vec<TransferHandle> {
        lock(&self.transfers).clone()
    }

    fn behavior(&self) -> MockBehavior {
        *lock(&self.behavior)
    }

    fn transaction_hash(&self, to: &Address, units: u128) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.account.as_str().as_bytes());
        hasher.update(to.as_str().as_bytes());
        hasher.update(&units.to_be_bytes());
        hasher.update(Uuid::now_v7().as_bytes());
        format!("0x{}", hex::encode(hasher.finalize().as_bytes()))
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Address, WalletError> {
        *lock(&self.connected) = true;
        Ok(self.account.clone())
    }

    async fn current_account(&self) -> Option<Address> {
        lock(&self.connected).then(|| self.account.clone())
    }

    async fn send_value_transfer(
        &self,
        to: &Address,
        amount: Price,
    ) -> Result<TransferHandle, WalletError> {
        if !*lock(&self.connected) {
            return Err(WalletError::NotConnected);
        }
        match self.behavior() {
            MockBehavior::Reject => return Err(WalletError::Rejected),
            MockBehavior::HangSignature => std::future::pending::<()>().await,
            _ => {}
        }
        let units = amount
            .to_base_units()
            .map_err(|e| WalletError::Provider(e.to_string()))?;
        let handle = TransferHandle {
            transaction_hash: self.transaction_hash(to, units),
            from: self.account.clone(),
            to: to.clone(),
            amount,
        };
        debug!(tx = %handle.transaction_hash, to = %to, units = %units, "mock transfer signed");
        lock(&self.transfers).push(handle.clone());
        Ok(handle)
    }

    async fn await_confirmation(
        &self,
        handle: &TransferHandle,
    ) -> Result<TransferReceipt, WalletError> {
        match self.behavior() {
            MockBehavior::FailConfirmation => Err(WalletError::TransferFailed {
                tx: handle.transaction_hash.clone(),
                reason: "reverted".into(),
            }),
            MockBehavior::HangConfirmation => {
                std::future::pending::<()>().await;
                Err(WalletError::Provider("confirmation stream closed".into()))
            }
            _ => Ok(TransferReceipt {
                transaction_hash: handle.transaction_hash.clone(),
                from: handle.from.clone(),
                to: handle.to.clone(),
                amount: handle.amount,
                confirmed_at: Timestamp::now(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    const BUYER: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const AUTHOR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    #[tokio::test]
    async fn connects_on_request() {
        let wallet = MockWallet::new(addr(BUYER));
        assert_eq!(wallet.current_account().await, None);
        assert_eq!(wallet.request_accounts().await.unwrap(), addr(BUYER));
        assert_eq!(wallet.current_account().await, Some(addr(BUYER)));
        wallet.disconnect();
        assert_eq!(wallet.current_account().await, None);
    }

    #[tokio::test]
    async fn approve_signs_and_confirms() {
        let wallet = MockWallet::connected(addr(BUYER));
        let price: Price = "0.1".parse().unwrap();
        let handle = wallet.send_value_transfer(&addr(AUTHOR), price).await.unwrap();
        assert!(handle.transaction_hash.starts_with("0x"));
        assert_eq!(handle.transaction_hash.len(), 66);
        let receipt = wallet.await_confirmation(&handle).await.unwrap();
        assert_eq!(receipt.transaction_hash, handle.transaction_hash);
        assert_eq!(receipt.to, addr(AUTHOR));
        assert_eq!(receipt.amount, price);
        assert_eq!(wallet.transfers(), vec![handle]);
    }

    #[tokio::test]
    async fn hashes_are_distinct() {
        let wallet = MockWallet::connected(addr(BUYER));
        let a = wallet.send_value_transfer(&addr(AUTHOR), Price::ZERO).await.unwrap();
        let b = wallet.send_value_transfer(&addr(AUTHOR), Price::ZERO).await.unwrap();
        assert_ne!(a.transaction_hash, b.transaction_hash);
    }

    #[tokio::test]
    async fn unrepresentable_amount_is_refused() {
        let wallet = MockWallet::connected(addr(BUYER));
        let dust: Price = "0.0000000000000000001".parse().unwrap();
        let err = wallet.send_value_transfer(&addr(AUTHOR), dust).await.unwrap_err();
        assert!(matches!(err, WalletError::Provider(_)));
        assert!(wallet.transfers().is_empty());

        let smallest: Price = "0.000000000000000001".parse().unwrap();
        assert!(wallet.send_value_transfer(&addr(AUTHOR), smallest).await.is_ok());
    }

    #[tokio::test]
    async fn reject_records_nothing() {
        let wallet = MockWallet::connected(addr(BUYER)).with_behavior(MockBehavior::Reject);
        let err = wallet.send_value_transfer(&addr(AUTHOR), Price::ZERO).await.unwrap_err();
        assert_eq!(err, WalletError::Rejected);
        assert!(wallet.transfers().is_empty());
    }

    #[tokio::test]
    async fn disconnected_wallet_cannot_transfer() {
        let wallet = MockWallet::new(addr(BUYER));
        let err = wallet.send_value_transfer(&addr(AUTHOR), Price::ZERO).await.unwrap_err();
        assert_eq!(err, WalletError::NotConnected);
    }

    #[tokio::test]
    async fn failed_confirmation() {
        let wallet =
            MockWallet::connected(addr(BUYER)).with_behavior(MockBehavior::FailConfirmation);
        let handle = wallet.send_value_transfer(&addr(AUTHOR), Price::ZERO).await.unwrap();
        let err = wallet.await_confirmation(&handle).await.unwrap_err();
        assert!(matches!(err, WalletError::TransferFailed { .. }));
    }
}
