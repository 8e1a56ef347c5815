// Ledger Reader - Stateless queries against current contract state

use super::model::{Comment, Post, PostId};
use crate::notify::Reportable;
use async_trait::async_trait;
use ethers_core::types::{Address, U256};
use thiserror::Error;

/// Errors from read queries; callers treat these as "state unknown", not "empty"
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger unreachable: {0}")]
    Transport(String),

    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    #[error("Ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl Reportable for LedgerError {}

/// Read-only access to the social contract
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Every post slot, including zero-address placeholders
    async fn get_all_posts(&self) -> Result<Vec<Post>, LedgerError>;

    /// Comments of one post in append order
    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, LedgerError>;

    /// Privileged account allowed to withdraw
    async fn get_owner(&self) -> Result<Address, LedgerError>;

    /// Native balance of `address`
    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError>;
}
