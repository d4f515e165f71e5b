use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use quire_types::ContentId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::keys::content_key;
use crate::traits::{ContentStore, KvStore};

/// Default base of derived content URIs.
pub const DEFAULT_CONTENT_BASE: &str = "https://mock-ipfs.local";

/// The `scheme://host` prefix shared by all URIs of one content store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentBase {
    scheme: String,
    host: String,
}

impl ContentBase {
    pub fn parse(s: &str) -> StoreResult<Self> {
        let invalid = |reason: &str| StoreError::InvalidUri {
            uri: s.to_string(),
            reason: reason.to_string(),
        };
        let (scheme, host) = s
            .trim_end_matches('/')
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme"))?;
        let scheme_ok = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !scheme_ok {
            return Err(invalid("bad scheme"));
        }
        if host.is_empty() || host.contains('/') {
            return Err(invalid("bad host"));
        }
        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Default for ContentBase {
    fn default() -> Self {
        Self {
            scheme: "https".into(),
            host: "mock-ipfs.local".into(),
        }
    }
}

impl fmt::Display for ContentBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

impl TryFrom<String> for ContentBase {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentBase> for String {
    fn from(base: ContentBase) -> Self {
        base.to_string()
    }
}

/// Returns `true` if `name` can be embedded as the last URI segment.
fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains('/') && !name.chars().any(char::is_control)
}

/// Retrieval URI of a stored blob: `scheme://host/{id}/{name}`.
///
/// Derivable from the base, the content id, and the original file name
/// alone, and parseable back into those parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentUri {
    base: ContentBase,
    id: ContentId,
    name: String,
}

impl ContentUri {
    pub fn new(base: ContentBase, id: ContentId, name: &str) -> StoreResult<Self> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(Self {
            base,
            id,
            name: name.to_string(),
        })
    }

    pub fn parse(s: &str) -> StoreResult<Self> {
        let invalid = |reason: &str| StoreError::InvalidUri {
            uri: s.to_string(),
            reason: reason.to_string(),
        };
        let (scheme, rest) = s.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
        let mut parts = rest.splitn(3, '/');
        let host = parts.next().unwrap_or_default();
        let id = parts.next().ok_or_else(|| invalid("missing content id"))?;
        let name = parts.next().ok_or_else(|| invalid("missing file name"))?;

        let base = ContentBase::parse(&format!("{scheme}://{host}"))?;
        let id = ContentId::parse(id).map_err(|e| invalid(&e.to_string()))?;
        if !is_valid_name(name) {
            return Err(invalid("bad file name"));
        }
        Ok(Self {
            base,
            id,
            name: name.to_string(),
        })
    }

    pub fn base(&self) -> &ContentBase {
        &self.base
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ContentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.base, self.id, self.name)
    }
}

impl FromStr for ContentUri {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentUri {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentUri> for String {
    fn from(uri: ContentUri) -> Self {
        uri.to_string()
    }
}

/// A stored content blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentBlob {
    pub id: ContentId,
    pub bytes: Vec<u8>,
}

/// Content store on top of any [`KvStore`].
///
/// Each blob is stored raw under `content-{id}`.
pub struct KvContentStore {
    kv: Arc<dyn KvStore>,
    base: ContentBase,
}

impl KvContentStore {
    pub fn new(kv: Arc<dyn KvStore>, base: ContentBase) -> Self {
        Self { kv, base }
    }
}

impl ContentStore for KvContentStore {
    fn store(&self, name: &str, data: &[u8]) -> StoreResult<ContentUri> {
        let id = ContentId::generate();
        let uri = ContentUri::new(self.base.clone(), id, name)?;
        self.kv.put(&content_key(uri.id()), data)?;
        debug!(id = %uri.id(), len = data.len(), "content stored");
        Ok(uri)
    }

    fn read_blob(&self, id: &ContentId) -> StoreResult<Option<ContentBlob>> {
        Ok(self.kv.get(&content_key(id))?.map(|bytes| ContentBlob {
            id: id.clone(),
            bytes,
        }))
    }

    fn base(&self) -> &ContentBase {
        &self.base
    }
}

impl fmt::Debug for KvContentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvContentStore")
            .field("base", &self.base.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileKv;
    use crate::memory::InMemoryKv;

    fn memory_store() -> KvContentStore {
        KvContentStore::new(Arc::new(InMemoryKv::new()), ContentBase::default())
    }

    #[test]
    fn store_and_retrieve_roundtrip() {
        let store = memory_store();
        let data = b"\x00\x01binary\xffcontent".to_vec();
        let uri = store.store("cover.png", &data).unwrap();
        assert_eq!(store.retrieve(&uri).unwrap(), data);
    }

    #[test]
    fn uri_has_expected_shape() {
        let store = memory_store();
        let uri = store.store("book.pdf", b"pdf").unwrap();
        let rendered = uri.to_string();
        assert!(rendered.starts_with("https://mock-ipfs.local/"));
        assert!(rendered.ends_with("/book.pdf"));
        assert_eq!(rendered, format!("{DEFAULT_CONTENT_BASE}/{}/book.pdf", uri.id()));
    }

    #[test]
    fn uri_is_rederivable_from_parts() {
        let store = memory_store();
        let uri = store.store("a.txt", b"a").unwrap();
        let derived = ContentUri::new(ContentBase::default(), uri.id().clone(), "a.txt").unwrap();
        assert_eq!(derived, uri);

        let parsed: ContentUri = uri.to_string().parse().unwrap();
        assert_eq!(parsed, uri);
        assert_eq!(store.retrieve(&parsed).unwrap(), b"a");
    }

    #[test]
    fn each_store_gets_a_fresh_id() {
        let store = memory_store();
        let a = store.store("same.txt", b"same").unwrap();
        let b = store.store("same.txt", b"same").unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn missing_blob_is_not_found() {
        let store = memory_store();
        let uri = ContentUri::parse("https://mock-ipfs.local/deadbeef/x.txt").unwrap();
        assert!(matches!(store.retrieve(&uri).unwrap_err(), StoreError::NotFound(_)));
        assert!(!store.exists(uri.id()).unwrap());
    }

    #[test]
    fn foreign_base_is_rejected() {
        let store = memory_store();
        let uri = ContentUri::parse("ipfs://gateway/abc/x.txt").unwrap();
        assert!(matches!(
            store.retrieve(&uri).unwrap_err(),
            StoreError::InvalidUri { .. }
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let store = memory_store();
        assert!(matches!(store.store("", b"x").unwrap_err(), StoreError::InvalidName(_)));
        assert!(matches!(
            store.store("dir/file.txt", b"x").unwrap_err(),
            StoreError::InvalidName(_)
        ));
    }

    #[test]
    fn quota_failure_propagates() {
        let store = KvContentStore::new(Arc::new(InMemoryKv::with_quota(4)), ContentBase::default());
        let err = store.store("big.bin", b"too large").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
    }

    #[test]
    fn file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let kv = Arc::new(FileKv::open(dir.path(), None).unwrap());
        let store = KvContentStore::new(kv, ContentBase::default());
        let uri = store.store("chapter one.txt", b"It was a dark night.").unwrap();
        assert_eq!(store.retrieve(&uri).unwrap(), b"It was a dark night.");
    }

    #[test]
    fn parse_rejects_malformed_uris() {
        assert!(ContentUri::parse("no-scheme/abc/x").is_err());
        assert!(ContentUri::parse("https://host").is_err());
        assert!(ContentUri::parse("https://host/abc").is_err());
        assert!(ContentUri::parse("https://host/ab-c/x.txt").is_err());
        assert!(ContentUri::parse("https://host/abc/").is_err());
    }

    #[test]
    fn base_parse_and_display() {
        let base = ContentBase::parse("HTTPS://files.example/").unwrap();
        assert_eq!(base.scheme(), "https");
        assert_eq!(base.host(), "files.example");
        assert_eq!(base.to_string(), "https://files.example");
        assert!(ContentBase::parse("files.example").is_err());
        assert!(ContentBase::parse("https://a/b").is_err());
    }

    #[test]
    fn uri_serde_as_string() {
        let uri = ContentUri::parse("https://mock-ipfs.local/abc123/x.png").unwrap();
        let json = serde_json::to_string(&uri).unwrap();
        assert_eq!(json, "\"https://mock-ipfs.local/abc123/x.png\"");
        let parsed: ContentUri = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, uri);
    }
}
