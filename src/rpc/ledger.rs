// RPC Ledger - Contract reads, wallet sends and receipt polling over JSON-RPC

use super::client::{JsonRpcClient, RpcClientError};
use super::codec::{self, RpcReceipt};
use crate::ledger::{
    get_all_posts_calldata, get_comments_calldata, owner_calldata, Comment, ContractCall,
    LedgerError, LedgerReader, Post, PostId,
};
use crate::session::SessionContext;
use crate::tx::{ReceiptProvider, SignerError, TransactionSigner, TxHash, TxReceipt};
use async_trait::async_trait;
use ethers_core::types::{Address, H256, U256};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

// ============================================================================
// LEDGER
// ============================================================================

/// Social contract reached through a JSON-RPC node
#[derive(Clone, Debug)]
pub struct RpcLedger {
    client: Arc<JsonRpcClient>,
    contract: Address,
    poll_interval: Duration,
}

impl RpcLedger {
    pub fn new(url: impl Into<String>, context: &SessionContext) -> Self {
        Self {
            client: Arc::new(JsonRpcClient::new(url)),
            contract: context.contract(),
            poll_interval: context.config().receipt_poll_interval(),
        }
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn url(&self) -> &str {
        self.client.url()
    }

    /// Wallet sending from `account` through the node's `eth_sendTransaction`
    pub fn wallet(&self, account: Address) -> RpcWallet {
        RpcWallet {
            client: Arc::clone(&self.client),
            account,
        }
    }

    async fn eth_call(&self, data: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let params = json!([
            { "to": self.contract, "data": codec::encode_hex(&data) },
            "latest"
        ]);
        let raw: String = self.client.call("eth_call", params).await?;
        codec::decode_hex(&raw)
    }
}

#[async_trait]
impl LedgerReader for RpcLedger {
    async fn get_all_posts(&self) -> Result<Vec<Post>, LedgerError> {
        let data = self.eth_call(get_all_posts_calldata()).await?;
        let posts = codec::decode_posts(&data)?;
        debug!(count = posts.len(), "fetched post slots");
        Ok(posts)
    }

    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, LedgerError> {
        let data = self.eth_call(get_comments_calldata(post_id)).await?;
        codec::decode_comments(&data)
    }

    async fn get_owner(&self) -> Result<Address, LedgerError> {
        let data = self.eth_call(owner_calldata()).await?;
        codec::decode_address(&data)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError> {
        let balance: U256 = self
            .client
            .call("eth_getBalance", json!([address, "latest"]))
            .await?;
        Ok(balance)
    }
}

#[async_trait]
impl ReceiptProvider for RpcLedger {
    #[instrument(skip_all, fields(tx = %hash))]
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, LedgerError> {
        loop {
            let receipt: Option<RpcReceipt> = self
                .client
                .call("eth_getTransactionReceipt", json!([hash.to_hex()]))
                .await?;

            match receipt {
                Some(receipt) => return receipt.into_receipt(hash),
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

// ============================================================================
// WALLET
// ============================================================================

/// Signer backed by an unlocked node account or an injected provider
#[derive(Clone, Debug)]
pub struct RpcWallet {
    client: Arc<JsonRpcClient>,
    account: Address,
}

#[async_trait]
impl TransactionSigner for RpcWallet {
    fn account(&self) -> Address {
        self.account
    }

    async fn send(&self, contract: Address, call: &ContractCall) -> Result<TxHash, SignerError> {
        let params = json!([{
            "from": self.account,
            "to": contract,
            "data": codec::encode_hex(&call.calldata()),
            "value": format!("{:#x}", call.value()),
        }]);

        let hash: H256 = self
            .client
            .call("eth_sendTransaction", params)
            .await
            .map_err(|err| match err {
                RpcClientError::Rpc { code, message } if codec::is_user_rejection(code, &message) => {
                    SignerError::UserRejected
                }
                other => SignerError::Failed(other.to_string()),
            })?;

        let hash = TxHash(hash);
        info!(tx = %hash, call = %call.kind(), "transaction broadcast");
        Ok(hash)
    }
}
