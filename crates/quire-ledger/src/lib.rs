//! Entitlement ledger for Quire.
//!
//! The ledger records "address X purchased book Y at time T with proof P"
//! and answers ownership queries. It is a pure append-only log: it performs
//! no validation against the catalog and never deduplicates. Callers (the
//! purchase flow) enforce the preconditions before recording.

pub mod error;
pub mod record;
pub mod store;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use record::PurchaseRecord;
pub use store::KvLedger;
pub use traits::{EntitlementLedger, LedgerReader, LedgerWriter};
