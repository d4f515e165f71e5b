use quire_types::{Address, BookId};

use crate::error::LedgerResult;
use crate::record::PurchaseRecord;

/// Write boundary for the entitlement ledger.
pub trait LedgerWriter: Send + Sync {
    /// Append a purchase record stamped with the current time.
    ///
    /// Performs no catalog validation and no deduplication.
    fn record(
        &self,
        book_id: BookId,
        buyer: &Address,
        transaction_proof: &str,
    ) -> LedgerResult<PurchaseRecord>;
}

/// Read boundary for ownership queries.
pub trait LedgerReader: Send + Sync {
    /// All records in append order.
    fn records(&self) -> LedgerResult<Vec<PurchaseRecord>>;

    /// True iff any record matches `book_id` and `buyer`.
    fn has_purchased(&self, book_id: BookId, buyer: &Address) -> LedgerResult<bool> {
        Ok(self
            .records()?
            .iter()
            .any(|record| record.grants(book_id, buyer)))
    }

    /// Records of `buyer`, in append order.
    fn purchases_by(&self, buyer: &Address) -> LedgerResult<Vec<PurchaseRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|record| &record.buyer == buyer)
            .collect())
    }
}

/// A ledger that can both record and answer queries.
pub trait EntitlementLedger: LedgerWriter + LedgerReader {}

impl<T: LedgerWriter + LedgerReader> EntitlementLedger for T {}
