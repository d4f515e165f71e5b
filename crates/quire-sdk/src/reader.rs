use std::fmt;

use quire_catalog::Book;
use serde::{Deserialize, Serialize};

/// What a viewer may do with a book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// The viewer wrote it.
    Owner,
    Purchased,
    Locked,
}

impl Access {
    pub fn can_read(self) -> bool {
        !matches!(self, Self::Locked)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owner => "owner",
            Self::Purchased => "purchased",
            Self::Locked => "locked",
        })
    }
}

/// A book as presented to one viewer. The content URI is only revealed
/// when access is granted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderView {
    pub book: Book,
    pub access: Access,
    pub author_display: String,
    pub content_uri: Option<String>,
}

impl ReaderView {
    pub fn new(book: Book, access: Access) -> Self {
        let content_uri = access.can_read().then(|| book.content_uri.clone());
        Self {
            author_display: book.author.short(),
            book,
            access,
            content_uri,
        }
    }
}
