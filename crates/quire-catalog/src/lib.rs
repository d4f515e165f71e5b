//! Book catalog for Quire.
//!
//! The catalog stands in for the marketplace contract's book registry. It
//! provides:
//! - [`Book`] and [`BookMetadata`] record types with boundary validation
//! - the [`Catalog`] trait (publish, list, list by author, get)
//! - [`KvCatalog`], an append-only implementation over any
//!   [`KvStore`](quire_store::KvStore)
//! - [`demo`] sample books for empty catalogs

pub mod book;
pub mod demo;
pub mod error;
pub mod store;
pub mod traits;

pub use book::{Book, BookMetadata};
pub use error::{CatalogError, CatalogResult};
pub use store::KvCatalog;
pub use traits::Catalog;
