//! Well-known keys of the persisted layout.

use quire_types::ContentId;

/// JSON array of published books, in publish order.
pub const BOOKS_KEY: &str = "published-books";

/// JSON array of purchase records, in record order.
pub const PURCHASES_KEY: &str = "purchased-books";

/// Prefix of every content blob key.
pub const CONTENT_PREFIX: &str = "content-";

/// Key under which the blob with the given id is stored.
pub fn content_key(id: &ContentId) -> String {
    format!("{CONTENT_PREFIX}{id}")
}

/// Returns `true` if `key` is safe for every backend: non-empty ASCII
/// alphanumerics plus `-`, `_` and `.`, not starting with `.`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_key_has_prefix() {
        let id = ContentId::parse("abc123").unwrap();
        assert_eq!(content_key(&id), "content-abc123");
    }

    #[test]
    fn key_validation() {
        assert!(is_valid_key(BOOKS_KEY));
        assert!(is_valid_key(PURCHASES_KEY));
        assert!(is_valid_key("content-0f0f"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key(".hidden"));
        assert!(!is_valid_key("../escape"));
        assert!(!is_valid_key("a/b"));
    }
}
