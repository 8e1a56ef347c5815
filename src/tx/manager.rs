// Transaction Manager - Submits contract writes and tracks their confirmation
//
// Lifecycle of the tracked record:
//   Idle -> Submitting -> AwaitingConfirmation -> Confirmed | Failed
// A signing-phase failure returns the record to Idle with the error attached.
// Only one record is tracked; a newer submission supersedes the old one and
// the superseded watcher's outcome is dropped.

use super::status::{TransactionRecord, TxError, TxEvent, TxStatus};
use super::validation::{IntentValidator, ValidationError};
use super::wallet::{ReceiptProvider, ReceiptStatus, TransactionSigner, TxHash, TxReceipt};
use crate::ledger::{CallKind, ContractCall, PostId};
use crate::media::ContentId;
use crate::notify::{surface, Notice, Notifier};
use crate::session::SessionContext;
use ethers_core::types::U256;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

// ============================================================================
// TRACKER
// ============================================================================

#[derive(Default)]
struct Tracked {
    /// Bumped on every submission; watchers compare against it
    generation: u64,
    record: Option<TransactionRecord>,
}

/// Shared between the manager and its confirmation watchers
struct Tracker {
    state: Mutex<Tracked>,
    events: broadcast::Sender<TxEvent>,
}

impl Tracker {
    fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Mutex::new(Tracked::default()),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: TxEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Start tracking a new submission, superseding whatever was tracked
    fn begin(&self, call: CallKind) -> u64 {
        let mut state = self.lock();
        if let Some(previous) = &state.record {
            if previous.status().is_pending() {
                warn!(
                    superseded = %previous.call(),
                    hash = ?previous.hash().map(|h| h.to_hex()),
                    "new submission supersedes an in-flight transaction"
                );
            }
        }
        state.generation += 1;
        state.record = Some(TransactionRecord::submitting(call));
        state.generation
    }

    /// Apply `update` to the record if `generation` is still current
    fn update<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut TransactionRecord),
    {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        match state.record.as_mut() {
            Some(record) => {
                update(record);
                true
            }
            None => false,
        }
    }

    fn record(&self) -> Option<TransactionRecord> {
        self.lock().record.clone()
    }
}

// ============================================================================
// TRANSACTION MANAGER
// ============================================================================

/// Submits writes to the social contract and tracks one record at a time
pub struct TransactionManager {
    context: SessionContext,
    signer: Arc<dyn TransactionSigner>,
    receipts: Arc<dyn ReceiptProvider>,
    notifier: Arc<dyn Notifier>,
    validator: IntentValidator,
    balance: Option<watch::Receiver<Option<U256>>>,
    tracker: Arc<Tracker>,
}

impl TransactionManager {
    pub fn new(
        context: SessionContext,
        signer: Arc<dyn TransactionSigner>,
        receipts: Arc<dyn ReceiptProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let config = context.config();
        let validator = IntentValidator::new(config.max_content_chars);
        let tracker = Arc::new(Tracker::new(config.event_capacity));

        Self {
            context,
            signer,
            receipts,
            notifier,
            validator,
            balance: None,
            tracker,
        }
    }

    /// Use a published contract balance as the cache for the withdraw guard
    pub fn with_balance_cache(mut self, balance: watch::Receiver<Option<U256>>) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn validator(&self) -> &IntentValidator {
        &self.validator
    }

    /// Receive submission, confirmation, and failure events
    pub fn subscribe(&self) -> broadcast::Receiver<TxEvent> {
        self.tracker.events.subscribe()
    }

    /// Status of the tracked record, `Idle` if nothing was ever submitted
    pub fn status(&self) -> TxStatus {
        self.tracker
            .record()
            .map(|r| r.status())
            .unwrap_or(TxStatus::Idle)
    }

    /// Snapshot of the tracked record
    pub fn record(&self) -> Option<TransactionRecord> {
        self.tracker.record()
    }

    pub fn last_error(&self) -> Option<TxError> {
        self.tracker.record().and_then(|r| r.last_error().cloned())
    }

    /// Whether a submission is still in flight; hosts disable re-submission on this
    pub fn is_busy(&self) -> bool {
        self.status().is_pending()
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    /// Create a post, attaching the configured fee
    pub async fn submit_create_post(
        &self,
        content: &str,
        media: Option<ContentId>,
    ) -> Result<TxHash, TxError> {
        self.validator
            .check_content(content, media.is_some())
            .map_err(|e| self.blocked(e))?;

        let fee = self.context.config().post_fee;
        self.submit(ContractCall::create_post(content, media, fee))
            .await
    }

    /// Like a post
    pub async fn submit_like(&self, post_id: PostId) -> Result<TxHash, TxError> {
        self.submit(ContractCall::like(post_id)).await
    }

    /// Comment on a post
    pub async fn submit_comment(
        &self,
        post_id: PostId,
        content: &str,
        media: Option<ContentId>,
    ) -> Result<TxHash, TxError> {
        self.validator
            .check_content(content, media.is_some())
            .map_err(|e| self.blocked(e))?;

        self.submit(ContractCall::comment(post_id, content, media))
            .await
    }

    /// Withdraw the contract balance; the ledger enforces who may call it
    pub async fn submit_withdraw(&self) -> Result<TxHash, TxError> {
        let cached = self.balance.as_ref().and_then(|rx| *rx.borrow());
        self.validator
            .check_withdraw(cached)
            .map_err(|e| self.blocked(e))?;

        self.notifier.notify(Notice::pending("Initiating withdrawal..."));
        self.submit(ContractCall::withdraw()).await
    }

    /// Surface a locally blocked intent
    fn blocked(&self, err: ValidationError) -> TxError {
        let err = TxError::from(err);
        debug!(error = %err, "intent blocked locally");
        surface(self.notifier.as_ref(), &err);
        err
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    #[instrument(skip(self, call), fields(call = %call.kind(), account = %self.context.account_checksum()))]
    async fn submit(&self, call: ContractCall) -> Result<TxHash, TxError> {
        let kind = call.kind();
        let generation = self.tracker.begin(kind);
        debug!(value = %call.value(), "awaiting wallet approval");

        let hash = match self.signer.send(self.context.contract(), &call).await {
            Ok(hash) => hash,
            Err(err) => {
                let err = TxError::from(err);
                if err.is_user_rejection() {
                    info!("user rejected the request");
                } else {
                    warn!(error = %err, "signing failed");
                }

                let current = self.tracker.update(generation, |r| r.abandon(err.clone()));
                if current {
                    self.tracker.emit(TxEvent::Failed {
                        call: kind,
                        hash: None,
                        error: err.clone(),
                    });
                }
                surface(self.notifier.as_ref(), &err);
                return Err(err);
            }
        };

        if self.tracker.update(generation, |r| r.broadcast(hash)) {
            info!(hash = %hash.to_hex(), "transaction broadcast");
            self.tracker.emit(TxEvent::Submitted { call: kind, hash });
        } else {
            warn!(hash = %hash.to_hex(), "broadcast after being superseded, not tracking");
            return Ok(hash);
        }

        self.spawn_watcher(generation, kind, hash);
        Ok(hash)
    }

    /// Watch for inclusion off the caller's path; the ledger transaction is never cancelled
    fn spawn_watcher(&self, generation: u64, call: CallKind, hash: TxHash) {
        let tracker = Arc::clone(&self.tracker);
        let receipts = Arc::clone(&self.receipts);
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.context.config().confirmation_timeout();

        tokio::spawn(async move {
            let outcome = await_confirmation(receipts.as_ref(), hash, timeout).await;
            settle(&tracker, notifier.as_ref(), generation, call, hash, outcome);
        });
    }
}

async fn await_confirmation(
    receipts: &dyn ReceiptProvider,
    hash: TxHash,
    timeout: Option<Duration>,
) -> Result<TxReceipt, TxError> {
    let wait = receipts.wait_for_receipt(hash);
    let receipt = match timeout {
        Some(limit) => tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| TxError::Timeout(limit))??,
        None => wait.await?,
    };

    match &receipt.status {
        ReceiptStatus::Success => Ok(receipt),
        ReceiptStatus::Reverted { reason } => Err(TxError::LedgerRejected {
            reason: reason.clone(),
        }),
    }
}

fn settle(
    tracker: &Tracker,
    notifier: &dyn Notifier,
    generation: u64,
    call: CallKind,
    hash: TxHash,
    outcome: Result<TxReceipt, TxError>,
) {
    match outcome {
        Ok(receipt) => {
            if !tracker.update(generation, |r| r.confirm()) {
                warn!(hash = %hash.to_hex(), %call, "superseded transaction confirmed, dropping outcome");
                return;
            }
            info!(hash = %hash.to_hex(), block = receipt.block_number, %call, "transaction confirmed");
            notifier.notify(Notice::success("Transaction confirmed!"));
            tracker.emit(TxEvent::Confirmed { call, hash });
        }
        Err(err) => {
            if !tracker.update(generation, |r| r.fail(err.clone())) {
                warn!(hash = %hash.to_hex(), %call, error = %err, "superseded transaction failed, dropping outcome");
                return;
            }
            warn!(hash = %hash.to_hex(), %call, error = %err, "transaction failed");
            surface(notifier, &err);
            tracker.emit(TxEvent::Failed {
                call,
                hash: Some(hash),
                error: err,
            });
        }
    }
}
