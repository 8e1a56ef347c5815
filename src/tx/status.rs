// Transaction Status - Lifecycle states, failure taxonomy, and tracked records

use super::validation::ValidationError;
use super::wallet::{SignerError, TxHash};
use crate::ledger::{CallKind, LedgerError};
use crate::media::UploadError;
use crate::notify::Reportable;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

// ============================================================================
// TX STATUS
// ============================================================================

/// Lifecycle of the tracked submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Nothing in flight (initial state and after a signing-phase failure)
    Idle,
    /// Waiting for the user to approve in the wallet
    Submitting,
    /// Broadcast; waiting for inclusion
    AwaitingConfirmation,
    /// Included successfully
    Confirmed,
    /// Reverted, timed out, or the confirmation transport failed
    Failed,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Failed)
    }

    /// Whether a submission is still in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, TxStatus::Submitting | TxStatus::AwaitingConfirmation)
    }
}

// ============================================================================
// TX ERROR
// ============================================================================

/// Every way a write intent can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to upload image: {0}")]
    Upload(#[from] UploadError),

    #[error("User rejected the request")]
    UserRejected,

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction failed: {}", .reason.as_deref().unwrap_or("reverted by the ledger"))]
    LedgerRejected { reason: Option<String> },

    #[error("Confirmation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Lost contact with the ledger: {0}")]
    Transport(String),
}

impl TxError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, TxError::UserRejected)
    }
}

impl Reportable for TxError {
    fn is_user_visible(&self) -> bool {
        !self.is_user_rejection()
    }
}

impl From<SignerError> for TxError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::UserRejected => TxError::UserRejected,
            SignerError::Failed(msg) => TxError::Signing(msg),
        }
    }
}

impl From<LedgerError> for TxError {
    fn from(err: LedgerError) -> Self {
        TxError::Transport(err.to_string())
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

/// The single submission a manager is tracking
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    call: CallKind,
    hash: Option<TxHash>,
    status: TxStatus,
    last_error: Option<TxError>,
    submitted_at: u64,
}

impl TransactionRecord {
    pub(crate) fn submitting(call: CallKind) -> Self {
        let submitted_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            call,
            hash: None,
            status: TxStatus::Submitting,
            last_error: None,
            submitted_at,
        }
    }

    pub(crate) fn broadcast(&mut self, hash: TxHash) {
        self.hash = Some(hash);
        self.status = TxStatus::AwaitingConfirmation;
    }

    pub(crate) fn abandon(&mut self, error: TxError) {
        self.status = TxStatus::Idle;
        self.last_error = Some(error);
    }

    pub(crate) fn confirm(&mut self) {
        self.status = TxStatus::Confirmed;
    }

    pub(crate) fn fail(&mut self, error: TxError) {
        self.status = TxStatus::Failed;
        self.last_error = Some(error);
    }

    /// The call being tracked
    pub fn call(&self) -> CallKind {
        self.call
    }

    /// Hash once broadcast
    pub fn hash(&self) -> Option<TxHash> {
        self.hash
    }

    pub fn status(&self) -> TxStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&TxError> {
        self.last_error.as_ref()
    }

    /// Wall-clock seconds when the submission started
    pub fn submitted_at(&self) -> u64 {
        self.submitted_at
    }
}

// ============================================================================
// TX EVENTS
// ============================================================================

/// Events broadcast to subscribers of a manager
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxEvent {
    /// Wallet approved and the transaction was broadcast
    Submitted { call: CallKind, hash: TxHash },
    /// The tracked transaction was included successfully
    Confirmed { call: CallKind, hash: TxHash },
    /// The tracked submission ended without confirmation
    Failed {
        call: CallKind,
        hash: Option<TxHash>,
        error: TxError,
    },
}

impl TxEvent {
    pub fn call(&self) -> CallKind {
        match self {
            TxEvent::Submitted { call, .. }
            | TxEvent::Confirmed { call, .. }
            | TxEvent::Failed { call, .. } => *call,
        }
    }

    /// The call, if this event is a confirmation
    pub fn confirmed_call(&self) -> Option<CallKind> {
        match self {
            TxEvent::Confirmed { call, .. } => Some(*call),
            _ => None,
        }
    }
}
