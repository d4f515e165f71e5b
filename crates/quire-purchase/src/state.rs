use std::fmt;

use quire_ledger::PurchaseRecord;
use quire_types::BookId;

use crate::error::PurchaseError;
use crate::wallet::TransferHandle;

/// Where a purchase attempt currently stands.
#[derive(Clone, Debug)]
pub enum PurchaseState {
    Idle,
    AwaitingSignature { book: BookId },
    AwaitingConfirmation { book: BookId, handle: TransferHandle },
    Recorded(PurchaseRecord),
    Failed(PurchaseError),
}

impl PurchaseState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingSignature { .. } => "awaiting-signature",
            Self::AwaitingConfirmation { .. } => "awaiting-confirmation",
            Self::Recorded(_) => "recorded",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Recorded(_) | Self::Failed(_))
    }

    /// Returns `true` from the signature request until the outcome is settled.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::AwaitingSignature { .. } | Self::AwaitingConfirmation { .. }
        )
    }
}

impl fmt::Display for PurchaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
