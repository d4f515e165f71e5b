//! Purchase orchestration for Quire.
//!
//! A purchase is a value transfer from the buyer to the book's author,
//! followed by an entitlement record in the ledger. Each attempt runs through
//! a small state machine:
//!
//! ```text
//! Idle -> AwaitingSignature -> AwaitingConfirmation -> Recorded
//!              |                       |           \-> Failed(LedgerWrite)
//!              v                       v
//!   Failed(UserRejected|Timeout)  Failed(TransferFailed)
//! ```
//!
//! The wallet is an external collaborator reached through the async
//! [`WalletProvider`] trait; [`MockWallet`] stands in for it in tests and
//! the CLI.
//!
//! # Inconsistency window
//!
//! If the ledger write fails after the transfer confirmed, the flow ends in
//! [`PurchaseError::LedgerWrite`] carrying the transfer receipt. Value has
//! moved but the entitlement is not recorded; this needs manual
//! reconciliation and is never retried, since a retry could double-charge.

pub mod config;
pub mod error;
pub mod flow;
pub mod mock;
pub mod state;
pub mod wallet;

pub use config::FlowTimeouts;
pub use error::{PurchaseError, PurchaseResult, WalletError};
pub use flow::{AbandonHandle, PurchaseFlow};
pub use mock::{MockBehavior, MockWallet};
pub use state::PurchaseState;
pub use wallet::{TransferHandle, TransferReceipt, WalletProvider};
