use quire_types::{Address, BookId};
use serde::{Deserialize, Serialize};

/// Display fields used for every author until per-author profiles exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    pub name: String,
    pub bio: String,
    pub profile_image_uri: String,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            name: "John Doe".into(),
            bio: "Blockchain enthusiast and technical author with a passion for decentralized technologies.".into(),
            profile_image_uri: "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop".into(),
        }
    }
}

/// An author as shown on a profile page. Built on demand, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub address: Address,
    pub name: String,
    pub bio: String,
    pub profile_image_uri: String,
    pub published_books: Vec<BookId>,
    /// An author counts as registered once they have published a book.
    pub is_registered: bool,
}

impl AuthorProfile {
    pub fn build(address: Address, defaults: &ProfileDefaults, published_books: Vec<BookId>) -> Self {
        Self {
            address,
            name: defaults.name.clone(),
            bio: defaults.bio.clone(),
            profile_image_uri: defaults.profile_image_uri.clone(),
            is_registered: !published_books.is_empty(),
            published_books,
        }
    }
}
