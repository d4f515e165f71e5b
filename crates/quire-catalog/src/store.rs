use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use quire_store::keys::BOOKS_KEY;
use quire_store::{JsonList, KvStore};
use quire_types::{Address, BookId};
use tracing::info;

use crate::book::{Book, BookMetadata};
use crate::error::{CatalogError, CatalogResult};
use crate::traits::Catalog;

/// Catalog persisted as one JSON array under `published-books`.
///
/// Ids are assigned as `max(existing) + 1` (starting at 1) while the append
/// lock is held, so concurrent publishes in one session never collide.
pub struct KvCatalog {
    books: JsonList<Book>,
}

impl KvCatalog {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            books: JsonList::new(kv, BOOKS_KEY),
        }
    }
}

/// Reject stored lists with duplicate ids or records that break the
/// publish-time rules.
fn check_records(books: &[Book]) -> CatalogResult<()> {
    let mut seen = HashSet::with_capacity(books.len());
    for book in books {
        book.validate_stored().map_err(CatalogError::Corrupt)?;
        if !seen.insert(book.id) {
            return Err(CatalogError::Corrupt(format!("duplicate book id {}", book.id)));
        }
    }
    Ok(())
}

fn next_id(books: &[Book]) -> BookId {
    books
        .iter()
        .map(|book| book.id)
        .max()
        .map_or(BookId(1), BookId::next)
}

impl Catalog for KvCatalog {
    fn publish(&self, metadata: &BookMetadata, author: &Address) -> CatalogResult<Book> {
        metadata.validate()?;
        let book = self.books.append_with(|existing: &[Book]| {
            check_records(existing)?;
            Ok::<_, CatalogError>(metadata.clone().into_book(next_id(existing), author.clone()))
        })?;
        info!(id = %book.id, author = %book.author, price = %book.price, "book published");
        Ok(book)
    }

    fn list(&self) -> CatalogResult<Vec<Book>> {
        let books = self.books.load()?;
        check_records(&books)?;
        Ok(books)
    }
}

impl fmt::Debug for KvCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvCatalog")
            .field("key", &self.books.key())
            .finish()
    }
}
