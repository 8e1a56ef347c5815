// Comment Accessor Tests
// Tests for per-post comment snapshots and their refresh scope

use ethers_core::types::Address;
use somfeed::ledger::{Comment, InMemoryLedger, Post, PostId};
use somfeed::notify::RecordingNotifier;
use somfeed::session::SessionContext;
use somfeed::sync::{CommentAccessor, ViewState};
use somfeed::tx::{TransactionManager, TxEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn contract() -> Address {
    Address::from_low_u64_be(0xC0FFEE)
}

fn alice() -> Address {
    Address::from_low_u64_be(0xA)
}

fn ledger_with_posts(count: u64) -> InMemoryLedger {
    let ledger = InMemoryLedger::new(Address::from_low_u64_be(1), contract());
    for id in 1..=count {
        ledger.seed_post(Post::new(PostId(id), alice(), "post", None, 100 + id, 0));
    }
    ledger
}

fn accessor(ledger: &InMemoryLedger, post_id: u64) -> (Arc<CommentAccessor>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let accessor = Arc::new(CommentAccessor::new(
        PostId(post_id),
        Arc::new(ledger.clone()),
        notifier.clone(),
    ));
    (accessor, notifier)
}

fn manager(ledger: &InMemoryLedger) -> TransactionManager {
    TransactionManager::new(
        SessionContext::new(alice(), contract()),
        Arc::new(ledger.wallet(alice())),
        Arc::new(ledger.clone()),
        Arc::new(RecordingNotifier::new()),
    )
}

async fn settled(events: &mut broadcast::Receiver<TxEvent>) -> TxEvent {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await.unwrap() {
                TxEvent::Submitted { .. } => continue,
                event => return event,
            }
        }
    })
    .await
    .expect("transaction never settled")
}

async fn eventually<F: Fn() -> bool>(check: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never held");
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

#[tokio::test]
async fn test_comments_in_ledger_order() {
    let ledger = ledger_with_posts(1);
    ledger.seed_comment(PostId(1), Comment::new(alice(), "later", None, 500));
    ledger.seed_comment(PostId(1), Comment::new(alice(), "earlier", None, 100));
    let (accessor, _) = accessor(&ledger, 1);

    let comments = accessor.mount().await.unwrap();
    let texts: Vec<_> = comments.iter().map(Comment::content).collect();
    // Append order is kept, timestamps are not used to reorder
    assert_eq!(texts, vec!["later", "earlier"]);
    assert_eq!(accessor.count(), 2);
}

#[tokio::test]
async fn test_post_without_comments_is_ready_and_empty() {
    let ledger = ledger_with_posts(1);
    let (accessor, _) = accessor(&ledger, 1);

    assert_eq!(accessor.count(), 0);
    assert!(accessor.snapshot().is_loading());

    accessor.mount().await.unwrap();
    assert!(accessor.snapshot().is_ready());
    assert_eq!(accessor.comments().unwrap().len(), 0);
    assert_eq!(accessor.post_id(), PostId(1));
}

#[tokio::test]
async fn test_read_failure_is_unknown() {
    let ledger = ledger_with_posts(1);
    ledger.set_read_outage(Some("timeout"));
    let (accessor, notifier) = accessor(&ledger, 1);

    assert!(accessor.mount().await.is_err());
    assert!(matches!(accessor.snapshot(), ViewState::Unknown(_)));
    assert!(accessor.comments().is_none());
    assert_eq!(notifier.errors().len(), 1);
}

// ============================================================================
// FOLLOWING CONFIRMATIONS
// ============================================================================

#[tokio::test]
async fn test_confirmed_comment_refreshes_its_post() {
    let ledger = ledger_with_posts(2);
    let (accessor, _) = accessor(&ledger, 1);
    accessor.mount().await.unwrap();
    let manager = manager(&ledger);
    let _handle = accessor.follow(&manager);
    let mut events = manager.subscribe();

    manager.submit_comment(PostId(1), "first!", None).await.unwrap();
    assert!(matches!(settled(&mut events).await, TxEvent::Confirmed { .. }));

    let watched = Arc::clone(&accessor);
    eventually(move || watched.count() == 1).await;
    assert_eq!(accessor.fetch_count(), 2);
    assert_eq!(accessor.comments().unwrap()[0].content(), "first!");
}

#[tokio::test]
async fn test_comment_on_other_post_is_ignored() {
    let ledger = ledger_with_posts(2);
    let (accessor, _) = accessor(&ledger, 1);
    accessor.mount().await.unwrap();
    let manager = manager(&ledger);
    let _handle = accessor.follow(&manager);
    let mut events = manager.subscribe();

    manager.submit_comment(PostId(2), "elsewhere", None).await.unwrap();
    settled(&mut events).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(accessor.fetch_count(), 1);
    assert_eq!(accessor.count(), 0);
}

#[tokio::test]
async fn test_confirmed_like_refreshes_its_post_once() {
    let ledger = ledger_with_posts(2);
    let (accessor, _) = accessor(&ledger, 1);
    accessor.mount().await.unwrap();
    let manager = manager(&ledger);
    let _handle = accessor.follow(&manager);
    let mut events = manager.subscribe();

    manager.submit_like(PostId(1)).await.unwrap();
    assert!(matches!(settled(&mut events).await, TxEvent::Confirmed { .. }));

    let watched = Arc::clone(&accessor);
    eventually(move || watched.fetch_count() == 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(accessor.fetch_count(), 2);
}

#[tokio::test]
async fn test_like_on_other_post_is_ignored() {
    let ledger = ledger_with_posts(2);
    let (accessor, _) = accessor(&ledger, 1);
    accessor.mount().await.unwrap();
    let manager = manager(&ledger);
    let _handle = accessor.follow(&manager);
    let mut events = manager.subscribe();

    manager.submit_like(PostId(2)).await.unwrap();
    assert!(matches!(settled(&mut events).await, TxEvent::Confirmed { .. }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(accessor.fetch_count(), 1);
}

#[tokio::test]
async fn test_dropped_handle_stops_refresh() {
    let ledger = ledger_with_posts(1);
    let (accessor, _) = accessor(&ledger, 1);
    accessor.mount().await.unwrap();
    let manager = manager(&ledger);
    drop(accessor.follow(&manager));
    let mut events = manager.subscribe();

    manager.submit_comment(PostId(1), "unseen", None).await.unwrap();
    settled(&mut events).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(accessor.fetch_count(), 1);
}
