use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bounds on each phase of a purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTimeouts {
    /// How long the wallet may take to approve or reject the transfer.
    pub signature: Duration,
    /// How long the transfer may take to confirm once signed.
    pub confirmation: Duration,
    /// How long the entitlement write may take after confirmation.
    pub ledger_write: Duration,
}

impl Default for FlowTimeouts {
    fn default() -> Self {
        Self {
            signature: Duration::from_secs(120),
            confirmation: Duration::from_secs(300),
            ledger_write: Duration::from_secs(10),
        }
    }
}

impl FlowTimeouts {
    /// Build from millisecond values as they appear in configuration files.
    pub fn from_millis(signature: u64, confirmation: u64, ledger_write: u64) -> Self {
        Self {
            signature: Duration::from_millis(signature),
            confirmation: Duration::from_millis(confirmation),
            ledger_write: Duration::from_millis(ledger_write),
        }
    }
}
