use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use quire_catalog::Book;
use quire_ledger::{EntitlementLedger, PurchaseRecord};
use quire_types::{Address, BookId};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::FlowTimeouts;
use crate::error::{PurchaseError, PurchaseResult, WalletError};
use crate::state::PurchaseState;
use crate::wallet::{TransferReceipt, WalletProvider};

/// Gives up on a purchase while it waits on the wallet.
///
/// Once the transfer has confirmed the entitlement write always runs, so
/// abandoning at that point has no effect.
#[derive(Clone, Debug)]
pub struct AbandonHandle {
    signal: Arc<watch::Sender<bool>>,
}

impl AbandonHandle {
    pub fn abandon(&self) {
        self.signal.send_replace(true);
    }
}

/// One purchase attempt at a time, driven through [`PurchaseState`].
///
/// Several flows may run concurrently against the same ledger; the ledger
/// serializes their appends.
pub struct PurchaseFlow {
    ledger: Arc<dyn EntitlementLedger>,
    timeouts: FlowTimeouts,
    state: Arc<Mutex<PurchaseState>>,
    running: tokio::sync::Mutex<()>,
    abandon: Arc<watch::Sender<bool>>,
}

fn lock(state: &Mutex<PurchaseState>) -> MutexGuard<'_, PurchaseState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_state(state: &Mutex<PurchaseState>, next: PurchaseState) {
    let mut state = lock(state);
    info!(from = state.name(), to = next.name(), "purchase state");
    *state = next;
}

fn fail_state(state: &Mutex<PurchaseState>, error: PurchaseError) -> PurchaseError {
    warn!(error = %error, "purchase failed");
    set_state(state, PurchaseState::Failed(error.clone()));
    error
}

/// Returns an in-progress flow to `Idle` if the run future is dropped
/// before the transfer confirms.
struct InProgressGuard {
    state: Arc<Mutex<PurchaseState>>,
    armed: bool,
}

impl InProgressGuard {
    /// Past this point the recording task owns the state.
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InProgressGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = lock(&self.state);
        if state.is_in_progress() {
            *state = PurchaseState::Idle;
        }
    }
}

/// Resolves once the abandon flag is raised.
async fn abandoned(mut signal: watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

enum Phase<T> {
    Done(T),
    TimedOut,
    Abandoned,
}

impl PurchaseFlow {
    pub fn new(ledger: Arc<dyn EntitlementLedger>, timeouts: FlowTimeouts) -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            ledger,
            timeouts,
            state: Arc::new(Mutex::new(PurchaseState::Idle)),
            running: tokio::sync::Mutex::new(()),
            abandon: Arc::new(signal),
        }
    }

    pub fn state(&self) -> PurchaseState {
        lock(&self.state).clone()
    }

    pub fn timeouts(&self) -> &FlowTimeouts {
        &self.timeouts
    }

    pub fn abandon_handle(&self) -> AbandonHandle {
        AbandonHandle {
            signal: Arc::clone(&self.abandon),
        }
    }

    /// Return a terminal flow to `Idle`. Returns `false` (and changes
    /// nothing) while a purchase is in progress.
    pub fn reset(&self) -> bool {
        let mut state = lock(&self.state);
        if state.is_in_progress() {
            return false;
        }
        *state = PurchaseState::Idle;
        true
    }

    fn transition(&self, next: PurchaseState) {
        set_state(&self.state, next);
    }

    fn fail(&self, error: PurchaseError) -> PurchaseError {
        fail_state(&self.state, error)
    }

    async fn wallet_phase<T, F>(&self, limit: Duration, fut: F) -> Phase<T>
    where
        F: Future<Output = T>,
    {
        let signal = self.abandon.subscribe();
        tokio::select! {
            biased;
            () = abandoned(signal) => Phase::Abandoned,
            result = timeout(limit, fut) => match result {
                Ok(value) => Phase::Done(value),
                Err(_) => Phase::TimedOut,
            },
        }
    }

    fn abandon_to_idle(&self) -> PurchaseError {
        info!("purchase abandoned");
        self.transition(PurchaseState::Idle);
        PurchaseError::Abandoned
    }

    /// Buy `book` with the wallet's connected account.
    ///
    /// Sends `book.price` to `book.author`, waits for confirmation, and
    /// records the entitlement with the transaction hash as proof. The flow
    /// must be `Idle`; after a terminal state call [`PurchaseFlow::reset`].
    /// A buyer who already holds the book is refused before any transfer.
    ///
    /// Once the transfer confirms, the entitlement write runs to completion
    /// on its own task: dropping this future then leaves the flow in
    /// `AwaitingConfirmation` until it settles as `Recorded` or
    /// `Failed(LedgerWrite)`.
    pub async fn purchase(
        &self,
        book: &Book,
        wallet: &dyn WalletProvider,
    ) -> PurchaseResult<PurchaseRecord> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| PurchaseError::NotIdle("running"))?;
        {
            let state = lock(&self.state);
            if !matches!(*state, PurchaseState::Idle) {
                return Err(PurchaseError::NotIdle(state.name()));
            }
        }
        self.abandon.send_replace(false);

        let buyer = match timeout(self.timeouts.signature, wallet.current_account()).await {
            Ok(Some(buyer)) => buyer,
            Ok(None) => return Err(self.fail(PurchaseError::NotConnected)),
            Err(_) => return Err(self.fail(PurchaseError::Timeout(self.timeouts.signature))),
        };
        if buyer == book.author {
            return Err(self.fail(PurchaseError::SelfPurchase {
                book: book.id,
                author: book.author.clone(),
            }));
        }
        match self.owns(book.id, &buyer).await {
            Ok(false) => {}
            Ok(true) => {
                return Err(self.fail(PurchaseError::AlreadyOwned {
                    book: book.id,
                    buyer,
                }))
            }
            Err(reason) => return Err(self.fail(PurchaseError::EntitlementCheck(reason))),
        }

        let mut guard = InProgressGuard {
            state: Arc::clone(&self.state),
            armed: true,
        };
        self.transition(PurchaseState::AwaitingSignature { book: book.id });
        let handle = match self
            .wallet_phase(
                self.timeouts.signature,
                wallet.send_value_transfer(&book.author, book.price),
            )
            .await
        {
            Phase::Done(Ok(handle)) => handle,
            Phase::Done(Err(WalletError::Rejected)) => {
                return Err(self.fail(PurchaseError::UserRejected))
            }
            Phase::Done(Err(WalletError::NotConnected)) => {
                return Err(self.fail(PurchaseError::NotConnected))
            }
            Phase::Done(Err(other)) => return Err(self.fail(PurchaseError::Wallet(other))),
            Phase::TimedOut => {
                return Err(self.fail(PurchaseError::Timeout(self.timeouts.signature)))
            }
            Phase::Abandoned => return Err(self.abandon_to_idle()),
        };

        self.transition(PurchaseState::AwaitingConfirmation {
            book: book.id,
            handle: handle.clone(),
        });
        let receipt = match self
            .wallet_phase(self.timeouts.confirmation, wallet.await_confirmation(&handle))
            .await
        {
            Phase::Done(Ok(receipt)) => receipt,
            Phase::Done(Err(e)) => {
                return Err(self.fail(PurchaseError::TransferFailed(e.to_string())))
            }
            Phase::TimedOut => {
                return Err(self.fail(PurchaseError::TransferFailed(format!(
                    "transfer {} not confirmed within {:?}",
                    handle.transaction_hash, self.timeouts.confirmation
                ))))
            }
            Phase::Abandoned => return Err(self.abandon_to_idle()),
        };

        info!(book = %book.id, buyer = %buyer, tx = %receipt.transaction_hash, "transfer confirmed");
        guard.disarm();
        let recording = tokio::spawn(record_entitlement(
            Arc::clone(&self.ledger),
            Arc::clone(&self.state),
            self.timeouts.ledger_write,
            book.id,
            buyer,
            receipt.clone(),
        ));
        match recording.await {
            Ok(result) => result,
            Err(join) => Err(self.fail(PurchaseError::LedgerWrite {
                receipt,
                reason: format!("ledger task failed: {join}"),
            })),
        }
    }

    /// Whether `buyer` already holds `book`, read on the blocking pool.
    async fn owns(&self, book: BookId, buyer: &Address) -> Result<bool, String> {
        let ledger = Arc::clone(&self.ledger);
        let buyer = buyer.clone();
        let read = tokio::task::spawn_blocking(move || ledger.has_purchased(book, &buyer));
        match timeout(self.timeouts.ledger_write, read).await {
            Ok(Ok(result)) => result.map_err(|e| e.to_string()),
            Ok(Err(join)) => Err(format!("ledger task failed: {join}")),
            Err(_) => Err(format!(
                "ledger read timed out after {:?}",
                self.timeouts.ledger_write
            )),
        }
    }
}

/// Write the entitlement for a confirmed transfer and settle the flow state.
///
/// The write runs on the blocking pool, bounded by `limit`. A timed-out
/// write may still land later.
async fn record_entitlement(
    ledger: Arc<dyn EntitlementLedger>,
    state: Arc<Mutex<PurchaseState>>,
    limit: Duration,
    book: BookId,
    buyer: Address,
    receipt: TransferReceipt,
) -> PurchaseResult<PurchaseRecord> {
    let proof = receipt.transaction_hash.clone();
    let write = tokio::task::spawn_blocking(move || ledger.record(book, &buyer, &proof));
    let outcome = match timeout(limit, write).await {
        Ok(Ok(Ok(record))) => Ok(record),
        Ok(Ok(Err(e))) => Err(e.to_string()),
        Ok(Err(join)) => Err(format!("ledger task failed: {join}")),
        Err(_) => Err(format!("ledger write timed out after {limit:?}")),
    };
    match outcome {
        Ok(record) => {
            set_state(&state, PurchaseState::Recorded(record.clone()));
            Ok(record)
        }
        Err(reason) => Err(fail_state(&state, PurchaseError::LedgerWrite { receipt, reason })),
    }
}

impl std::fmt::Debug for PurchaseFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseFlow")
            .field("state", &self.state().name())
            .field("timeouts", &self.timeouts)
            .finish()
    }
}
