use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of raw bytes in an account address.
const ADDRESS_LEN: usize = 20;

/// Hex-encoded account address (`0x` followed by 40 hex digits).
///
/// Addresses arrive from wallets in mixed (checksummed) case. They are
/// normalized to lowercase on construction, so `==` on `Address` is the
/// case-insensitive comparison every lookup needs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and normalize an address.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| TypeError::InvalidAddress {
                input: input.to_string(),
                reason: "missing 0x prefix".into(),
            })?;

        let bytes = hex::decode(digits).map_err(|e| TypeError::InvalidAddress {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        if bytes.len() != ADDRESS_LEN {
            return Err(TypeError::InvalidAddress {
                input: input.to_string(),
                reason: format!("expected {ADDRESS_LEN} bytes, got {}", bytes.len()),
            });
        }

        Ok(Self(format!("0x{}", hex::encode(bytes))))
    }

    /// The normalized (lowercase) form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display: `0x1234...7890`.
    pub fn short(&self) -> String {
        let s = &self.0;
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    }

    /// Case-insensitive comparison against an unparsed identity string.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
