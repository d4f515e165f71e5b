use quire_types::{Address, BookId, Price};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// A published book.
///
/// Immutable once created, except for `published`, which no operation
/// currently clears.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub cover_uri: String,
    pub content_uri: String,
    pub author: Address,
    pub price: Price,
    pub published: bool,
}

impl Book {
    /// Returns `true` if `address` authored this book.
    pub fn is_authored_by(&self, address: &Address) -> bool {
        &self.author == address
    }

    /// Check the invariants of a record read back from storage.
    pub(crate) fn validate_stored(&self) -> Result<(), String> {
        if self.id.get() == 0 {
            return Err("book id 0 is reserved".into());
        }
        if self.title.trim().is_empty() {
            return Err(format!("book {} has an empty title", self.id));
        }
        if self.description.trim().is_empty() {
            return Err(format!("book {} has an empty description", self.id));
        }
        if !is_well_formed_uri(&self.cover_uri) || !is_well_formed_uri(&self.content_uri) {
            return Err(format!("book {} has a malformed uri", self.id));
        }
        Ok(())
    }
}

/// Author-supplied fields of a book, validated before publishing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookMetadata {
    pub title: String,
    pub description: String,
    pub cover_uri: String,
    pub content_uri: String,
    pub price: Price,
}

impl BookMetadata {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        cover_uri: impl Into<String>,
        content_uri: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            cover_uri: cover_uri.into(),
            content_uri: content_uri.into(),
            price,
        }
    }

    /// Reject empty text fields and malformed URIs.
    ///
    /// Price non-negativity is already guaranteed by [`Price`].
    pub fn validate(&self) -> CatalogResult<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidMetadata {
                field: "title",
                reason: "must not be empty".into(),
            });
        }
        if self.description.trim().is_empty() {
            return Err(CatalogError::InvalidMetadata {
                field: "description",
                reason: "must not be empty".into(),
            });
        }
        if !is_well_formed_uri(&self.cover_uri) {
            return Err(CatalogError::InvalidMetadata {
                field: "coverUri",
                reason: format!("malformed uri {:?}", self.cover_uri),
            });
        }
        if !is_well_formed_uri(&self.content_uri) {
            return Err(CatalogError::InvalidMetadata {
                field: "contentUri",
                reason: format!("malformed uri {:?}", self.content_uri),
            });
        }
        Ok(())
    }

    pub(crate) fn into_book(self, id: BookId, author: Address) -> Book {
        Book {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            cover_uri: self.cover_uri,
            content_uri: self.content_uri,
            author,
            price: self.price,
            published: true,
        }
    }
}

/// `scheme://rest` with an RFC 3986 scheme, a non-empty remainder, and no
/// whitespace.
pub fn is_well_formed_uri(uri: &str) -> bool {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && !rest.is_empty() && !uri.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> BookMetadata {
        BookMetadata::new(
            "T",
            "D",
            "https://mock-ipfs.local/abc/cover.png",
            "ipfs://QmExample1",
            "1.5".parse().unwrap(),
        )
    }

    #[test]
    fn valid_metadata_passes() {
        metadata().validate().unwrap();
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut m = metadata();
        m.title = "   ".into();
        assert!(matches!(
            m.validate().unwrap_err(),
            CatalogError::InvalidMetadata { field: "title", .. }
        ));
    }

    #[test]
    fn empty_description_is_rejected() {
        let mut m = metadata();
        m.description = String::new();
        assert!(matches!(
            m.validate().unwrap_err(),
            CatalogError::InvalidMetadata {
                field: "description",
                ..
            }
        ));
    }

    #[test]
    fn malformed_uris_are_rejected() {
        let mut m = metadata();
        m.cover_uri = "cover.png".into();
        assert!(matches!(
            m.validate().unwrap_err(),
            CatalogError::InvalidMetadata {
                field: "coverUri",
                ..
            }
        ));

        let mut m = metadata();
        m.content_uri = "https://".into();
        assert!(matches!(
            m.validate().unwrap_err(),
            CatalogError::InvalidMetadata {
                field: "contentUri",
                ..
            }
        ));
    }

    #[test]
    fn uri_shapes() {
        assert!(is_well_formed_uri("https://images.example/photo.jpg?w=400"));
        assert!(is_well_formed_uri("ipfs://QmExample2"));
        assert!(!is_well_formed_uri("://host"));
        assert!(!is_well_formed_uri("1http://host"));
        assert!(!is_well_formed_uri("https://host/with space"));
    }

    #[test]
    fn into_book_trims_and_publishes() {
        let mut m = metadata();
        m.title = "  Padded  ".into();
        let author = Address::parse("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
        let book = m.into_book(BookId(1), author.clone());
        assert_eq!(book.title, "Padded");
        assert!(book.published);
        assert!(book.is_authored_by(&author));
    }

    #[test]
    fn book_json_uses_camel_case() {
        let author = Address::parse("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").unwrap();
        let book = metadata().into_book(BookId(7), author);
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["coverUri"], "https://mock-ipfs.local/abc/cover.png");
        assert_eq!(value["price"], "1.5");
        assert_eq!(value["published"], true);
    }
}
