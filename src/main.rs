// feedsim - Scripted social feed session against an in-memory ledger

use chrono::Utc;
use clap::Parser;
use ethers_core::types::Address;
use somfeed::compose::Composer;
use somfeed::ledger::{InMemoryLedger, PostId};
use somfeed::logging::{self, DEFAULT_FILTER};
use somfeed::media::{MediaBlob, MockContentUploader};
use somfeed::notify::LogNotifier;
use somfeed::session::{ClientConfig, SessionContext};
use somfeed::sync::{CommentAccessor, FeedSynchronizer, TreasuryMonitor};
use somfeed::tx::{TransactionManager, TxEvent};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "feedsim", about = "Drive a simulated on-chain social feed")]
struct Args {
    /// Number of posting accounts besides the owner
    #[arg(long, default_value_t = 3)]
    accounts: u64,

    /// Posts created by each account
    #[arg(long, default_value_t = 2)]
    posts: u64,

    /// Attach an image to every other post
    #[arg(long)]
    with_media: bool,

    /// Decline the first wallet prompt of every account
    #[arg(long)]
    reject_first: bool,

    /// Confirmation timeout in milliseconds
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,

    /// Tracing filter used when RUST_LOG is unset
    #[arg(long)]
    log: Option<String>,
}

/// Wait until the manager's tracked transaction settles
async fn settled(events: &mut broadcast::Receiver<TxEvent>) -> Option<TxEvent> {
    loop {
        match events.recv().await {
            Ok(TxEvent::Submitted { .. }) => continue,
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.log.as_deref().unwrap_or(DEFAULT_FILTER));

    let owner = Address::from_low_u64_be(1);
    let contract = Address::from_low_u64_be(0xC0FFEE);
    let ledger = InMemoryLedger::new(owner, contract);
    let notifier = Arc::new(LogNotifier);
    let config = ClientConfig::default().with_confirmation_timeout(Duration::from_millis(args.timeout_ms));

    let feed = Arc::new(FeedSynchronizer::new(Arc::new(ledger.clone()), notifier.clone()));
    feed.mount().await?;

    for n in 0..args.accounts {
        let account = Address::from_low_u64_be(100 + n);
        let context = SessionContext::new(account, contract).with_config(config.clone())?;
        let manager = Arc::new(TransactionManager::new(
            context,
            Arc::new(ledger.wallet(account)),
            Arc::new(ledger.clone()),
            notifier.clone(),
        ));
        let composer = Composer::new(
            Arc::clone(&manager),
            Arc::new(MockContentUploader::new()),
            notifier.clone(),
        );
        let _feed_sync = feed.follow(&manager);

        if args.reject_first {
            ledger.reject_next_signatures(1);
        }

        for i in 0..args.posts {
            let text = format!("post {} from account {}", i + 1, n + 1);
            let attachment = (args.with_media && i % 2 == 0)
                .then(|| MediaBlob::new(text.clone().into_bytes(), "image/png"));

            let mut events = manager.subscribe();
            let mut result = composer.publish_post(&text, attachment.clone()).await;
            if matches!(&result, Err(err) if err.is_user_rejection()) {
                info!(account = n + 1, "declined, retrying");
                events = manager.subscribe();
                result = composer.publish_post(&text, attachment).await;
            }
            if let Err(err) = result {
                warn!(error = %err, "post not submitted");
                continue;
            }
            settled(&mut events).await;
            ledger.advance_time(15);
        }

        if let Some(first) = feed.posts().and_then(|p| p.last().map(|p| p.id())) {
            let mut events = manager.subscribe();
            if manager.submit_like(first).await.is_ok() {
                settled(&mut events).await;
            }
        }
    }

    let post_id = feed
        .posts()
        .and_then(|posts| posts.first().map(|p| p.id()))
        .unwrap_or(PostId(1));
    let owner_context = SessionContext::new(owner, contract).with_config(config)?;
    let treasury = Arc::new(TreasuryMonitor::new(&owner_context, Arc::new(ledger.clone()), notifier.clone()));
    treasury.refresh().await?;

    let owner_manager = Arc::new(
        TransactionManager::new(
            owner_context,
            Arc::new(ledger.wallet(owner)),
            Arc::new(ledger.clone()),
            notifier.clone(),
        )
        .with_balance_cache(treasury.balance_cache()),
    );
    let comments = Arc::new(CommentAccessor::new(post_id, Arc::new(ledger.clone()), notifier.clone()));
    comments.mount().await?;
    let _comment_sync = comments.follow(&owner_manager);
    let _treasury_sync = treasury.follow(&owner_manager);

    let mut events = owner_manager.subscribe();
    if owner_manager.submit_comment(post_id, "thanks for posting", None).await.is_ok() {
        settled(&mut events).await;
    }
    println!(
        "treasury: {} ETH",
        treasury.formatted_balance().unwrap_or_else(|| "unknown".into())
    );
    let mut events = owner_manager.subscribe();
    if owner_manager.submit_withdraw().await.is_ok() {
        settled(&mut events).await;
    }

    // Followers refresh on their own tasks
    tokio::time::sleep(Duration::from_millis(50)).await;
    feed.refresh().await?;

    println!("feed:");
    let now = Utc::now();
    for post in feed.posts().unwrap_or_default().iter() {
        println!(
            "  {} {:?} ({}) likes={} {}{}",
            post.id(),
            post.author(),
            post.time_ago(now),
            post.likes(),
            post.content(),
            post.media_url(&owner_manager.context().config().media_gateway)
                .map(|url| format!(" [{}]", url))
                .unwrap_or_default()
        );
    }
    println!("comments on {}: {}", post_id, comments.count());
    println!(
        "treasury after withdraw: {} ETH",
        treasury.formatted_balance().unwrap_or_else(|| "unknown".into())
    );
    println!("ledger: {:?}", ledger.stats());

    Ok(())
}
