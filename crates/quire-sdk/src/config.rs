use std::path::{Path, PathBuf};
use std::time::Duration;

use quire_purchase::FlowTimeouts;
use quire_store::content::DEFAULT_CONTENT_BASE;
use quire_store::ContentBase;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};
use crate::profile::ProfileDefaults;

/// Session configuration, usually read from `quire.toml`.
///
/// Every field has a default, so a partial file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Root of the file-backed store.
    pub data_dir: PathBuf,
    /// `scheme://host` prefix of derived content URIs.
    pub content_base_uri: String,
    /// Byte quota across all stored values; `None` is unlimited.
    pub storage_quota_bytes: Option<u64>,
    /// Unit shown next to prices.
    pub currency_symbol: String,
    /// Publish the sample books when the catalog is empty.
    pub seed_demo_books: bool,
    pub timeouts: TimeoutConfig,
    pub default_profile: ProfileDefaults,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".quire"),
            content_base_uri: DEFAULT_CONTENT_BASE.to_string(),
            storage_quota_bytes: None,
            currency_symbol: "MATIC".to_string(),
            seed_demo_books: false,
            timeouts: TimeoutConfig::default(),
            default_profile: ProfileDefaults::default(),
        }
    }
}

impl MarketConfig {
    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> SdkResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> SdkResult<Self> {
        toml::from_str(content).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn content_base(&self) -> SdkResult<ContentBase> {
        ContentBase::parse(&self.content_base_uri)
            .map_err(|e| SdkError::Config(format!("content_base_uri: {e}")))
    }
}

/// Phase timeouts in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub signature_ms: u64,
    pub confirmation_ms: u64,
    pub ledger_write_ms: u64,
    pub content_write_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            signature_ms: 120_000,
            confirmation_ms: 300_000,
            ledger_write_ms: 10_000,
            content_write_ms: 30_000,
        }
    }
}

impl TimeoutConfig {
    pub fn flow(&self) -> FlowTimeouts {
        FlowTimeouts::from_millis(self.signature_ms, self.confirmation_ms, self.ledger_write_ms)
    }

    pub fn content_write(&self) -> Duration {
        Duration::from_millis(self.content_write_ms)
    }
}
