use quire_types::{Address, BookId};

use crate::book::{Book, BookMetadata};
use crate::error::CatalogResult;

/// Registry of published books.
///
/// Implementations are append-only: books are never removed and ids are
/// never reused.
pub trait Catalog: Send + Sync {
    /// Validate `metadata`, assign a fresh id, and durably append the book.
    ///
    /// On error nothing was appended.
    fn publish(&self, metadata: &BookMetadata, author: &Address) -> CatalogResult<Book>;

    /// All books in publish order.
    fn list(&self) -> CatalogResult<Vec<Book>>;

    /// Books by `author`, in publish order. Addresses compare
    /// case-insensitively.
    fn list_by_author(&self, author: &Address) -> CatalogResult<Vec<Book>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|book| book.is_authored_by(author))
            .collect())
    }

    /// Look up a single book.
    fn get(&self, id: BookId) -> CatalogResult<Option<Book>> {
        Ok(self.list()?.into_iter().find(|book| book.id == id))
    }

    /// Number of published books.
    fn len(&self) -> CatalogResult<usize> {
        Ok(self.list()?.len())
    }

    fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len()? == 0)
    }
}
