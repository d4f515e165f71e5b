//! Sample books for showing an otherwise empty marketplace.

use quire_types::{Address, Price, TypeError};
use tracing::info;

use crate::book::{Book, BookMetadata};
use crate::error::{CatalogError, CatalogResult};
use crate::traits::Catalog;

struct DemoBook {
    title: &'static str,
    description: &'static str,
    cover_uri: &'static str,
    content_uri: &'static str,
    author: &'static str,
    price: &'static str,
}

const DEMO_BOOKS: [DemoBook; 2] = [
    DemoBook {
        title: "The Blockchain Revolution",
        description: "A comprehensive guide to understanding blockchain technology and its implications for the future of digital transactions.",
        cover_uri: "https://images.unsplash.com/photo-1516414447565-b14be0adf13e?w=400&h=300&fit=crop",
        content_uri: "ipfs://QmExample1",
        author: "0x1234567890123456789012345678901234567890",
        price: "0.1",
    },
    DemoBook {
        title: "Web3 Development",
        description: "Learn how to build decentralized applications using modern web technologies and smart contracts.",
        cover_uri: "https://images.unsplash.com/photo-1526374965328-7f61d4dc18c5?w=400&h=300&fit=crop",
        content_uri: "ipfs://QmExample2",
        author: "0x2345678901234567890123456789012345678901",
        price: "0.15",
    },
];

/// The demo books as `(metadata, author)` pairs, in publish order.
pub fn demo_books() -> Result<Vec<(BookMetadata, Address)>, TypeError> {
    DEMO_BOOKS
        .iter()
        .map(|demo| {
            let price: Price = demo.price.parse()?;
            let author = Address::parse(demo.author)?;
            Ok((
                BookMetadata::new(demo.title, demo.description, demo.cover_uri, demo.content_uri, price),
                author,
            ))
        })
        .collect()
}

/// Publish the demo books if the catalog is empty.
///
/// Returns the books that were published; a non-empty catalog is left
/// untouched and yields an empty list.
pub fn seed_demo(catalog: &dyn Catalog) -> CatalogResult<Vec<Book>> {
    if !catalog.is_empty()? {
        return Ok(Vec::new());
    }
    let entries = demo_books().map_err(|e| CatalogError::InvalidMetadata {
        field: "demo",
        reason: e.to_string(),
    })?;
    let mut published = Vec::with_capacity(entries.len());
    for (metadata, author) in &entries {
        published.push(catalog.publish(metadata, author)?);
    }
    info!(count = published.len(), "demo books seeded");
    Ok(published)
}
