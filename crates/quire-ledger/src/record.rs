use quire_types::{Address, BookId, Timestamp};
use serde::{Deserialize, Serialize};

/// Proof that `buyer` paid for `book_id`.
///
/// `transaction_proof` is the hash of the confirmed value transfer. It is
/// stored as evidence for reconciliation, not verified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub book_id: BookId,
    pub buyer: Address,
    pub transaction_proof: String,
    pub timestamp: Timestamp,
}

impl PurchaseRecord {
    pub fn new(book_id: BookId, buyer: Address, transaction_proof: impl Into<String>) -> Self {
        Self {
            book_id,
            buyer,
            transaction_proof: transaction_proof.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Returns `true` if this record entitles `buyer` to `book_id`.
    pub fn grants(&self, book_id: BookId, buyer: &Address) -> bool {
        self.book_id == book_id && &self.buyer == buyer
    }
}
