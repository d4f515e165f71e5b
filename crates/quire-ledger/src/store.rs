use std::fmt;
use std::sync::Arc;

use quire_store::keys::PURCHASES_KEY;
use quire_store::{JsonList, KvStore};
use quire_types::{Address, BookId};
use tracing::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::record::PurchaseRecord;
use crate::traits::{LedgerReader, LedgerWriter};

/// Ledger persisted as one JSON array under `purchased-books`.
pub struct KvLedger {
    records: JsonList<PurchaseRecord>,
}

impl KvLedger {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            records: JsonList::new(kv, PURCHASES_KEY),
        }
    }
}

fn check_records(records: &[PurchaseRecord]) -> LedgerResult<()> {
    for (index, record) in records.iter().enumerate() {
        if record.transaction_proof.trim().is_empty() {
            return Err(LedgerError::Corrupt(format!(
                "record {index} has an empty transaction proof"
            )));
        }
    }
    Ok(())
}

impl LedgerWriter for KvLedger {
    fn record(
        &self,
        book_id: BookId,
        buyer: &Address,
        transaction_proof: &str,
    ) -> LedgerResult<PurchaseRecord> {
        if transaction_proof.trim().is_empty() {
            return Err(LedgerError::InvalidProof(transaction_proof.to_string()));
        }
        let record = self.records.append_with(|existing: &[PurchaseRecord]| {
            check_records(existing)?;
            if existing.iter().any(|r| r.grants(book_id, buyer)) {
                debug!(book = %book_id, buyer = %buyer, "appending duplicate purchase record");
            }
            Ok::<_, LedgerError>(PurchaseRecord::new(book_id, buyer.clone(), transaction_proof))
        })?;
        info!(book = %record.book_id, buyer = %record.buyer, proof = %record.transaction_proof, "purchase recorded");
        Ok(record)
    }
}

impl LedgerReader for KvLedger {
    fn records(&self) -> LedgerResult<Vec<PurchaseRecord>> {
        let records = self.records.load()?;
        check_records(&records)?;
        Ok(records)
    }
}

impl fmt::Debug for KvLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvLedger")
            .field("key", &self.records.key())
            .finish()
    }
}
