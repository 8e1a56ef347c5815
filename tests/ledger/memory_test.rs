// In-Memory Ledger Tests
// Tests for the simulated contract: writes, reverts, mining, and failure injection

use ethers_core::types::{Address, U256};
use somfeed::ledger::{
    Comment, ContractCall, InMemoryLedger, LedgerError, LedgerReader, Post, PostId,
};
use somfeed::tx::{ReceiptProvider, ReceiptStatus, SignerError, TransactionSigner};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn owner() -> Address {
    Address::from_low_u64_be(1)
}

fn contract() -> Address {
    Address::from_low_u64_be(0xC0FFEE)
}

fn alice() -> Address {
    Address::from_low_u64_be(0xA)
}

fn fee() -> U256 {
    U256::from(10_000_000_000_000_000u64)
}

fn create(content: &str) -> ContractCall {
    ContractCall::create_post(content, None, fee())
}

// ============================================================================
// INITIAL STATE
// ============================================================================

#[tokio::test]
async fn test_new_ledger_has_placeholder_slot() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let posts = ledger.get_all_posts().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert!(posts[0].is_placeholder());
    assert_eq!(ledger.get_owner().await.unwrap(), owner());
}

// ============================================================================
// WRITES
// ============================================================================

#[tokio::test]
async fn test_create_post_assigns_ids_from_one() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let wallet = ledger.wallet(alice());

    wallet.send(contract(), &create("first")).await.unwrap();
    wallet.send(contract(), &create("second")).await.unwrap();

    let posts = ledger.get_all_posts().await.unwrap();
    let live: Vec<_> = posts.iter().filter(|p| !p.is_placeholder()).collect();
    assert_eq!(live.len(), 2);
    assert_eq!(live[0].id(), PostId(1));
    assert_eq!(live[1].id(), PostId(2));
    assert_eq!(live[0].author(), alice());
}

#[tokio::test]
async fn test_create_post_fee_accrues_to_contract() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.wallet(alice()).send(contract(), &create("paid")).await.unwrap();

    assert_eq!(ledger.get_balance(contract()).await.unwrap(), fee());
}

#[tokio::test]
async fn test_insufficient_fee_reverts() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let call = ContractCall::create_post("cheap", None, U256::from(1));
    let hash = ledger.wallet(alice()).send(contract(), &call).await.unwrap();

    let receipt = ledger.wait_for_receipt(hash).await.unwrap();
    assert_eq!(
        receipt.status,
        ReceiptStatus::Reverted {
            reason: Some("Insufficient fee".to_string())
        }
    );
    assert_eq!(ledger.stats().writes_reverted, 1);
}

#[tokio::test]
async fn test_like_increments_count() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let wallet = ledger.wallet(alice());
    wallet.send(contract(), &create("likeable")).await.unwrap();
    wallet.send(contract(), &ContractCall::like(PostId(1))).await.unwrap();
    wallet.send(contract(), &ContractCall::like(PostId(1))).await.unwrap();

    let posts = ledger.get_all_posts().await.unwrap();
    let post = posts.iter().find(|p| p.id() == PostId(1)).unwrap();
    assert_eq!(post.likes(), 2);
}

#[tokio::test]
async fn test_like_on_missing_post_reverts() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let hash = ledger
        .wallet(alice())
        .send(contract(), &ContractCall::like(PostId(99)))
        .await
        .unwrap();

    let receipt = ledger.wait_for_receipt(hash).await.unwrap();
    assert!(!receipt.is_success());
}

#[tokio::test]
async fn test_comments_keep_append_order() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let wallet = ledger.wallet(alice());
    wallet.send(contract(), &create("thread")).await.unwrap();
    wallet
        .send(contract(), &ContractCall::comment(PostId(1), "one", None))
        .await
        .unwrap();
    wallet
        .send(contract(), &ContractCall::comment(PostId(1), "two", None))
        .await
        .unwrap();

    let comments = ledger.get_comments(PostId(1)).await.unwrap();
    let texts: Vec<_> = comments.iter().map(Comment::content).collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert!(ledger.get_comments(PostId(2)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_withdraw_only_owner() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.wallet(alice()).send(contract(), &create("fee")).await.unwrap();

    let hash = ledger
        .wallet(alice())
        .send(contract(), &ContractCall::withdraw())
        .await
        .unwrap();
    let receipt = ledger.wait_for_receipt(hash).await.unwrap();
    assert_eq!(
        receipt.status,
        ReceiptStatus::Reverted {
            reason: Some("Only owner can withdraw".to_string())
        }
    );

    let hash = ledger
        .wallet(owner())
        .send(contract(), &ContractCall::withdraw())
        .await
        .unwrap();
    assert!(ledger.wait_for_receipt(hash).await.unwrap().is_success());
    assert!(ledger.get_balance(contract()).await.unwrap().is_zero());
    assert_eq!(ledger.get_balance(owner()).await.unwrap(), fee());
}

#[tokio::test]
async fn test_wrong_contract_address_fails_signing() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let result = ledger
        .wallet(alice())
        .send(Address::from_low_u64_be(0xBAD), &create("lost"))
        .await;

    assert!(matches!(result, Err(SignerError::Failed(_))));
    assert_eq!(ledger.stats().writes_dispatched, 0);
}

// ============================================================================
// MINING
// ============================================================================

#[tokio::test]
async fn test_manual_mining_holds_transactions() {
    let ledger = InMemoryLedger::new(owner(), contract()).with_manual_mining();
    let hash = ledger.wallet(alice()).send(contract(), &create("held")).await.unwrap();

    assert_eq!(ledger.pending_count(), 1);
    assert_eq!(ledger.get_all_posts().await.unwrap().len(), 1);

    let waiter = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.wait_for_receipt(hash).await })
    };
    tokio::task::yield_now().await;

    assert_eq!(ledger.mine(), 1);
    let receipt = waiter.await.unwrap().unwrap();
    assert!(receipt.is_success());
    assert_eq!(receipt.block_number, 1);
    assert_eq!(ledger.pending_count(), 0);
}

#[tokio::test]
async fn test_block_time_stamps_posts() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.set_block_time(1_000);
    ledger.wallet(alice()).send(contract(), &create("a")).await.unwrap();
    ledger.advance_time(60);
    ledger.wallet(alice()).send(contract(), &create("b")).await.unwrap();

    let posts = ledger.get_all_posts().await.unwrap();
    let stamps: Vec<_> = posts.iter().skip(1).map(Post::timestamp).collect();
    assert_eq!(stamps, vec![1_000, 1_060]);
}

#[tokio::test]
async fn test_unknown_receipt_is_transport_error() {
    let ledger = InMemoryLedger::new(owner(), contract());
    let other = InMemoryLedger::new(owner(), contract());
    let hash = other.wallet(alice()).send(contract(), &create("elsewhere")).await.unwrap();

    assert!(matches!(
        ledger.wait_for_receipt(hash).await,
        Err(LedgerError::Transport(_))
    ));
}

// ============================================================================
// FAILURE INJECTION
// ============================================================================

#[tokio::test]
async fn test_scripted_rejections() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.reject_next_signatures(1);
    let wallet = ledger.wallet(alice());

    assert_eq!(
        wallet.send(contract(), &create("no")).await,
        Err(SignerError::UserRejected)
    );
    assert!(wallet.send(contract(), &create("yes")).await.is_ok());
    assert_eq!(ledger.stats().writes_dispatched, 1);
}

#[tokio::test]
async fn test_signing_failure() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.set_signing_failure(Some("insufficient funds for gas"));

    let result = ledger.wallet(alice()).send(contract(), &create("x")).await;
    assert_eq!(
        result,
        Err(SignerError::Failed("insufficient funds for gas".to_string()))
    );

    ledger.set_signing_failure(None);
    assert!(ledger.wallet(alice()).send(contract(), &create("x")).await.is_ok());
}

#[tokio::test]
async fn test_read_outage_counts_reads() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.set_read_outage(Some("node down"));

    assert!(matches!(
        ledger.get_all_posts().await,
        Err(LedgerError::Transport(_))
    ));
    assert_eq!(ledger.stats().reads, 1);

    ledger.set_read_outage(None);
    assert!(ledger.get_all_posts().await.is_ok());
    assert_eq!(ledger.stats().reads, 2);
}

#[tokio::test]
async fn test_receipt_outage_wakes_waiters() {
    let ledger = InMemoryLedger::new(owner(), contract()).with_manual_mining();
    let hash = ledger.wallet(alice()).send(contract(), &create("x")).await.unwrap();

    let waiter = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.wait_for_receipt(hash).await })
    };
    tokio::task::yield_now().await;
    ledger.set_receipt_outage(Some("socket closed"));

    assert!(matches!(
        waiter.await.unwrap(),
        Err(LedgerError::Transport(_))
    ));
}

#[tokio::test]
async fn test_seeded_state_is_returned_raw() {
    let ledger = InMemoryLedger::new(owner(), contract());
    ledger.seed_post(Post::new(PostId(5), alice(), "seeded", None, 10, 3));
    ledger.seed_comment(PostId(5), Comment::new(alice(), "c", None, 11));
    ledger.set_balance(contract(), U256::from(7));

    let posts = ledger.get_all_posts().await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].likes(), 3);
    assert_eq!(ledger.get_comments(PostId(5)).await.unwrap().len(), 1);
    assert_eq!(ledger.get_balance(contract()).await.unwrap(), U256::from(7));

    // Next id continues after the highest seeded one
    ledger.wallet(alice()).send(contract(), &create("next")).await.unwrap();
    let posts = ledger.get_all_posts().await.unwrap();
    assert_eq!(posts.last().unwrap().id(), PostId(6));
}
