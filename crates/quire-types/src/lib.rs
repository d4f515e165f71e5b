//! Foundation types for Quire.
//!
//! This crate provides the identity, identifier, and value types shared by
//! every other Quire crate.
//!
//! # Key Types
//!
//! - [`Address`]: Hex-encoded account address, compared case-insensitively
//! - [`BookId`]: Catalog-assigned book identifier
//! - [`ContentId`]: Opaque key of a stored content blob
//! - [`Price`]: Non-negative decimal amount of native token
//! - [`Timestamp`]: Milliseconds since the UNIX epoch

pub mod address;
pub mod error;
pub mod ids;
pub mod price;
pub mod temporal;

pub use address::Address;
pub use error::TypeError;
pub use ids::{BookId, ContentId};
pub use price::Price;
pub use temporal::Timestamp;
