//! Key-value persistence and content storage for Quire.
//!
//! Every piece of marketplace state lives in a flat key-value namespace:
//! the published-book list, the purchase list, and one entry per uploaded
//! content blob.
//!
//! # Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKv`] -- `HashMap`-based store for tests and embedding
//! - [`FileKv`] -- one checksummed file per key, atomically replaced on write
//!
//! # Content
//!
//! [`KvContentStore`] implements [`ContentStore`] on top of any backend:
//! blobs are stored under a random [`ContentId`](quire_types::ContentId) and
//! addressed by a derived [`ContentUri`] of the form
//! `scheme://host/{id}/{name}`.
//!
//! # Design Rules
//!
//! 1. Content blobs are immutable once written.
//! 2. Lists are append-only; appends are serialized by [`JsonList`].
//! 3. Persisted data is decoded into typed records and never trusted blindly.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod content;
pub mod error;
pub mod file;
pub mod keys;
pub mod list;
pub mod memory;
pub mod traits;

pub use content::{ContentBase, ContentBlob, ContentUri, KvContentStore};
pub use error::{StoreError, StoreResult};
pub use file::FileKv;
pub use list::JsonList;
pub use memory::InMemoryKv;
pub use traits::{ContentStore, KvStore};
