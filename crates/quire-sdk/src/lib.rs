//! High-level marketplace API for Quire.
//!
//! [`Marketplace`] is the session object: constructed once, it owns the
//! content store, the catalog, and the entitlement ledger, and answers the
//! read-side queries the UI needs (all books, books by author, ownership of
//! `(book, address)` pairs). Purchases run through
//! [`quire_purchase::PurchaseFlow`] against the session's ledger.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod profile;
pub mod reader;

pub use config::{MarketConfig, TimeoutConfig};
pub use error::{SdkError, SdkResult};
pub use marketplace::Marketplace;
pub use profile::{AuthorProfile, ProfileDefaults};
pub use reader::{Access, ReaderView};
