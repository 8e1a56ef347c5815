// Wallet Interfaces - Signing layer and confirmation source used by the manager

use crate::ledger::{ContractCall, LedgerError};
use async_trait::async_trait;
use ethers_core::types::{Address, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// TX HASH
// ============================================================================

/// Submission handle returned once a transaction has been broadcast
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(pub H256);

impl TxHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(H256::from(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Full `0x`-prefixed hex form
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.as_bytes()))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx:{}", hex::encode(&self.0.as_bytes()[..8]))
    }
}

// ============================================================================
// RECEIPT
// ============================================================================

/// Outcome of an included transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted { reason: Option<String> },
}

/// Receipt reported by the ledger once a transaction is included
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub block_number: u64,
    pub status: ReceiptStatus,
}

impl TxReceipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}

// ============================================================================
// SIGNER
// ============================================================================

/// Errors raised before a transaction reaches the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Signing failed: {0}")]
    Failed(String),
}

/// The wallet: asks the user to approve a call and broadcasts it
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Account the wallet signs for
    fn account(&self) -> Address;

    /// Request approval for `call` against `contract` and broadcast it
    async fn send(&self, contract: Address, call: &ContractCall) -> Result<TxHash, SignerError>;
}

/// Source of inclusion receipts for broadcast transactions
#[async_trait]
pub trait ReceiptProvider: Send + Sync {
    /// Suspend until `hash` is included, or the transport fails
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, LedgerError>;
}
