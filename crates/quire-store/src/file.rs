use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::keys::is_valid_key;
use crate::traits::KvStore;

/// File extension of value files.
const EXTENSION: &str = "kv";

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// File-backed key-value store: one file per key under a root directory.
///
/// On-disk format of each value file:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload]
/// ```
///
/// Writes go to a temporary file in the root directory which is then renamed
/// over the target, so readers see either the old or the new value, never a
/// torn one. Reads verify length and checksum.
pub struct FileKv {
    root: PathBuf,
    max_bytes: Option<u64>,
    /// Total payload bytes on disk; the mutex also serializes writers.
    used: Mutex<u64>,
}

impl FileKv {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: &Path, max_bytes: Option<u64>) -> StoreResult<Self> {
        fs::create_dir_all(root)?;

        let mut used = 0u64;
        for entry in fs::read_dir(root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match read_payload_len(&path) {
                Ok(len) => used += len,
                Err(e) => warn!(path = %path.display(), error = %e, "unreadable value file"),
            }
        }

        info!(root = %root.display(), used_bytes = used, "file kv opened");
        Ok(Self {
            root: root.to_path_buf(),
            max_bytes,
            used: Mutex::new(used),
        })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(key, raw).map(Some)
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let length = u32::try_from(value.len()).map_err(|_| StoreError::QuotaExceeded {
            requested: value.len() as u64,
            available: u32::MAX as u64,
        })?;

        let mut used = self.used.lock().map_err(|_| StoreError::LockPoisoned)?;
        let replaced = match read_payload_len(&path) {
            Ok(len) => len,
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e),
        };

        if let Some(max) = self.max_bytes {
            let available = max.saturating_sub(used.saturating_sub(replaced));
            if value.len() as u64 > available {
                return Err(StoreError::QuotaExceeded {
                    requested: value.len() as u64,
                    available,
                });
            }
        }

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&length.to_le_bytes())?;
        tmp.write_all(&crc32fast::hash(value).to_le_bytes())?;
        tmp.write_all(value)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        *used = used.saturating_sub(replaced) + value.len() as u64;
        debug!(key, len = value.len(), "file kv put");
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn used_bytes(&self) -> StoreResult<u64> {
        self.used
            .lock()
            .map(|used| *used)
            .map_err(|_| StoreError::LockPoisoned)
    }
}

impl std::fmt::Debug for FileKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKv")
            .field("root", &self.root)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

/// Validate the header of a raw value file and return its payload.
fn decode(key: &str, mut raw: Vec<u8>) -> StoreResult<Vec<u8>> {
    if raw.len() < HEADER_SIZE {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: "truncated header".into(),
        });
    }
    let length = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
    let expected_crc = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);

    if raw.len() - HEADER_SIZE != length {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: format!(
                "length mismatch: header says {length}, found {}",
                raw.len() - HEADER_SIZE
            ),
        });
    }

    let payload = raw.split_off(HEADER_SIZE);
    let actual_crc = crc32fast::hash(&payload);
    if actual_crc != expected_crc {
        return Err(StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"),
        });
    }
    Ok(payload)
}

/// Payload length recorded in a value file's header.
fn read_payload_len(path: &Path) -> StoreResult<u64> {
    use std::io::Read;

    let mut header = [0u8; 4];
    fs::File::open(path)?.read_exact(&mut header)?;
    Ok(u32::from_le_bytes(header) as u64)
}
