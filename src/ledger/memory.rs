// In-Memory Ledger - A simulated social contract for tests and the simulator
//
// Mirrors the contract's observable behavior: post ids start at 1 and slot 0
// stays an empty zero-address placeholder, fees accrue to the contract balance,
// likes/comments on unknown posts revert, and only the owner may withdraw.

use super::call::ContractCall;
use super::model::{Comment, Post, PostId};
use super::reader::{LedgerError, LedgerReader};
use crate::session::DEFAULT_POST_FEE_WEI;
use crate::tx::{
    ReceiptProvider, ReceiptStatus, SignerError, TransactionSigner, TxHash, TxReceipt,
};
use async_trait::async_trait;
use ethers_core::types::{Address, U256};
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Notify;
use tracing::debug;

/// Counters of traffic the ledger has served
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Read queries received, failed ones included
    pub reads: u64,
    /// Transactions the wallet broadcast
    pub writes_dispatched: u64,
    /// Transactions included successfully
    pub writes_mined: u64,
    /// Transactions included but reverted
    pub writes_reverted: u64,
}

struct PendingTx {
    hash: TxHash,
    from: Address,
    call: ContractCall,
}

struct LedgerState {
    owner: Address,
    contract: Address,
    post_fee: U256,
    posts: Vec<Post>,
    comments: HashMap<PostId, Vec<Comment>>,
    balances: HashMap<Address, U256>,
    block_time: u64,
    block_number: u64,
    nonce: u64,
    auto_mine: bool,
    pending: Vec<PendingTx>,
    receipts: HashMap<TxHash, TxReceipt>,
    scripted_rejections: usize,
    signing_failure: Option<String>,
    read_outage: Option<String>,
    receipt_outage: Option<String>,
    stats: LedgerStats,
}

impl LedgerState {
    fn balance_of(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn credit(&mut self, address: Address, amount: U256) {
        let balance = self.balances.entry(address).or_default();
        *balance = balance.saturating_add(amount);
    }

    fn live_post_mut(&mut self, post_id: PostId) -> Option<&mut Post> {
        self.posts
            .iter_mut()
            .find(|p| p.id() == post_id && !p.is_placeholder())
    }

    fn next_post_id(&self) -> PostId {
        let max = self.posts.iter().map(|p| p.id().0).max().unwrap_or(0);
        PostId(max + 1)
    }

    /// Execute one call as the contract would; `Err` carries the revert reason
    fn execute(&mut self, from: Address, call: &ContractCall) -> Result<(), String> {
        match call {
            ContractCall::CreatePost {
                content,
                media,
                fee,
            } => {
                if *fee < self.post_fee {
                    return Err("Insufficient fee".to_string());
                }
                let id = self.next_post_id();
                let post = Post::new(id, from, content, media.clone(), self.block_time, 0);
                self.posts.push(post);
                let contract = self.contract;
                self.credit(contract, *fee);
            }
            ContractCall::LikePost { post_id } => {
                let post = self
                    .live_post_mut(*post_id)
                    .ok_or_else(|| "Post does not exist".to_string())?;
                post.record_like();
            }
            ContractCall::CommentOnPost {
                post_id,
                content,
                media,
            } => {
                if self.live_post_mut(*post_id).is_none() {
                    return Err("Post does not exist".to_string());
                }
                let comment = Comment::new(from, content, media.clone(), self.block_time);
                self.comments.entry(*post_id).or_default().push(comment);
            }
            ContractCall::Withdraw => {
                if from != self.owner {
                    return Err("Only owner can withdraw".to_string());
                }
                let contract = self.contract;
                let amount = self.balance_of(&contract);
                self.balances.insert(contract, U256::zero());
                let owner = self.owner;
                self.credit(owner, amount);
            }
        }
        Ok(())
    }

    /// Include every pending transaction in one block
    fn mine_block(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        self.block_number += 1;

        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for tx in pending {
            let status = match self.execute(tx.from, &tx.call) {
                Ok(()) => {
                    self.stats.writes_mined += 1;
                    ReceiptStatus::Success
                }
                Err(reason) => {
                    self.stats.writes_reverted += 1;
                    ReceiptStatus::Reverted {
                        reason: Some(reason),
                    }
                }
            };
            debug!(hash = %tx.hash.to_hex(), block = self.block_number, ?status, "mined");
            self.receipts.insert(
                tx.hash,
                TxReceipt {
                    hash: tx.hash,
                    block_number: self.block_number,
                    status,
                },
            );
        }
        count
    }
}

struct Shared {
    state: Mutex<LedgerState>,
    mined: Notify,
}

// ============================================================================
// IN-MEMORY LEDGER
// ============================================================================

/// Simulated contract, wallet network, and receipt source
#[derive(Clone)]
pub struct InMemoryLedger {
    shared: Arc<Shared>,
}

impl InMemoryLedger {
    /// Create a ledger owned by `owner`, deployed at `contract`, mining on every send
    pub fn new(owner: Address, contract: Address) -> Self {
        let block_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let placeholder = Post::new(PostId(0), Address::zero(), "", None, 0, 0);

        let state = LedgerState {
            owner,
            contract,
            post_fee: U256::from(DEFAULT_POST_FEE_WEI),
            posts: vec![placeholder],
            comments: HashMap::new(),
            balances: HashMap::new(),
            block_time,
            block_number: 0,
            nonce: 0,
            auto_mine: true,
            pending: Vec::new(),
            receipts: HashMap::new(),
            scripted_rejections: 0,
            signing_failure: None,
            read_outage: None,
            receipt_outage: None,
            stats: LedgerStats::default(),
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                mined: Notify::new(),
            }),
        }
    }

    /// Leave broadcast transactions pending until `mine` is called
    pub fn with_manual_mining(self) -> Self {
        self.lock().auto_mine = false;
        self
    }

    /// Require a different `createPost` fee
    pub fn with_post_fee(self, fee: U256) -> Self {
        self.lock().post_fee = fee;
        self
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.shared.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A wallet that signs as `account`
    pub fn wallet(&self, account: Address) -> InMemoryWallet {
        InMemoryWallet {
            ledger: self.clone(),
            account,
        }
    }

    pub fn owner(&self) -> Address {
        self.lock().owner
    }

    pub fn contract(&self) -> Address {
        self.lock().contract
    }

    /// Include all pending transactions in a new block
    pub fn mine(&self) -> usize {
        let mined = self.lock().mine_block();
        self.shared.mined.notify_waiters();
        mined
    }

    /// Transactions broadcast but not yet included
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Set the timestamp used for the next blocks
    pub fn set_block_time(&self, timestamp: u64) {
        self.lock().block_time = timestamp;
    }

    pub fn advance_time(&self, secs: u64) {
        let mut state = self.lock();
        state.block_time = state.block_time.saturating_add(secs);
    }

    /// The next `count` signature requests are declined by the user
    pub fn reject_next_signatures(&self, count: usize) {
        self.lock().scripted_rejections = count;
    }

    /// Make every signature request fail with `message`, or clear with `None`
    pub fn set_signing_failure(&self, message: Option<&str>) {
        self.lock().signing_failure = message.map(str::to_string);
    }

    /// Fail every read query with a transport error, or clear with `None`
    pub fn set_read_outage(&self, message: Option<&str>) {
        self.lock().read_outage = message.map(str::to_string);
    }

    /// Fail receipt waits with a transport error, or clear with `None`
    pub fn set_receipt_outage(&self, message: Option<&str>) {
        self.lock().receipt_outage = message.map(str::to_string);
        self.shared.mined.notify_waiters();
    }

    /// Store a raw post slot exactly as given
    pub fn seed_post(&self, post: Post) {
        self.lock().posts.push(post);
    }

    /// Append a raw comment to `post_id`
    pub fn seed_comment(&self, post_id: PostId, comment: Comment) {
        self.lock().comments.entry(post_id).or_default().push(comment);
    }

    /// Overwrite the native balance of `address`
    pub fn set_balance(&self, address: Address, amount: U256) {
        self.lock().balances.insert(address, amount);
    }

    pub fn stats(&self) -> LedgerStats {
        self.lock().stats.clone()
    }

    /// Count one read query, failing it during an outage
    fn begin_read(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        let mut state = self.lock();
        state.stats.reads += 1;
        if let Some(message) = state.read_outage.clone() {
            return Err(LedgerError::Transport(message));
        }
        Ok(state)
    }

    fn broadcast(&self, from: Address, contract: Address, call: &ContractCall) -> Result<TxHash, SignerError> {
        let hash = {
            let mut state = self.lock();
            if state.scripted_rejections > 0 {
                state.scripted_rejections -= 1;
                return Err(SignerError::UserRejected);
            }
            if let Some(message) = &state.signing_failure {
                return Err(SignerError::Failed(message.clone()));
            }
            if contract != state.contract {
                return Err(SignerError::Failed(format!(
                    "no contract deployed at {:?}",
                    contract
                )));
            }

            state.nonce += 1;
            let mut hasher = Keccak256::new();
            hasher.update(from.as_bytes());
            hasher.update(state.nonce.to_be_bytes());
            hasher.update(call.calldata());
            let hash = TxHash::from_bytes(hasher.finalize().into());

            state.stats.writes_dispatched += 1;
            state.pending.push(PendingTx {
                hash,
                from,
                call: call.clone(),
            });
            if state.auto_mine {
                state.mine_block();
            }
            hash
        };
        self.shared.mined.notify_waiters();
        Ok(hash)
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn get_all_posts(&self) -> Result<Vec<Post>, LedgerError> {
        Ok(self.begin_read()?.posts.clone())
    }

    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, LedgerError> {
        Ok(self
            .begin_read()?
            .comments
            .get(&post_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_owner(&self) -> Result<Address, LedgerError> {
        Ok(self.begin_read()?.owner)
    }

    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError> {
        Ok(self.begin_read()?.balance_of(&address))
    }
}

#[async_trait]
impl ReceiptProvider for InMemoryLedger {
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, LedgerError> {
        loop {
            // Register before checking so a block mined in between still wakes us
            let mined = self.shared.mined.notified();
            {
                let state = self.lock();
                if let Some(message) = &state.receipt_outage {
                    return Err(LedgerError::Transport(message.clone()));
                }
                if let Some(receipt) = state.receipts.get(&hash) {
                    return Ok(receipt.clone());
                }
                if !state.pending.iter().any(|tx| tx.hash == hash) {
                    return Err(LedgerError::Transport(format!(
                        "unknown transaction {}",
                        hash.to_hex()
                    )));
                }
            }
            mined.await;
        }
    }
}

// ============================================================================
// IN-MEMORY WALLET
// ============================================================================

/// Wallet bound to one account of an in-memory ledger
#[derive(Clone)]
pub struct InMemoryWallet {
    ledger: InMemoryLedger,
    account: Address,
}

#[async_trait]
impl TransactionSigner for InMemoryWallet {
    fn account(&self) -> Address {
        self.account
    }

    async fn send(&self, contract: Address, call: &ContractCall) -> Result<TxHash, SignerError> {
        self.ledger.broadcast(self.account, contract, call)
    }
}
