// Feed Synchronizer - Ordered view model of all posts
//
// Every refresh runs the same pipeline over the raw ledger snapshot:
//   1. drop zero-address placeholder slots
//   2. drop repeated ids (first occurrence wins)
//   3. newest first; equal timestamps by descending id
// and replaces the published snapshot wholesale. Overlapping refreshes
// publish in the order they started.

use super::view::{follow, RefreshOrder, Refreshable, SyncHandle, ViewState};
use crate::ledger::{CallKind, LedgerError, LedgerReader, Post};
use crate::notify::{surface, Notifier};
use crate::tx::TransactionManager;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Apply the feed pipeline to a raw `getAllPosts` snapshot
pub fn arrange_feed(raw: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::new();
    let mut posts: Vec<Post> = raw
        .into_iter()
        .filter(|p| !p.is_placeholder())
        .filter(|p| seen.insert(p.id()))
        .collect();

    posts.sort_by(|a, b| {
        b.timestamp()
            .cmp(&a.timestamp())
            .then_with(|| b.id().cmp(&a.id()))
    });
    posts
}

/// Keeps the ordered post list in sync with confirmed ledger state
pub struct FeedSynchronizer {
    reader: Arc<dyn LedgerReader>,
    notifier: Arc<dyn Notifier>,
    view: watch::Sender<ViewState<Post>>,
    order: RefreshOrder,
}

impl FeedSynchronizer {
    pub fn new(reader: Arc<dyn LedgerReader>, notifier: Arc<dyn Notifier>) -> Self {
        let (view, _) = watch::channel(ViewState::Loading);
        Self {
            reader,
            notifier,
            view,
            order: RefreshOrder::default(),
        }
    }

    /// Initial fetch when the feed is first shown
    pub async fn mount(&self) -> Result<Arc<Vec<Post>>, LedgerError> {
        self.refresh().await
    }

    /// Re-read all posts and publish the arranged result
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Arc<Vec<Post>>, LedgerError> {
        let ticket = self.order.begin();

        match self.reader.get_all_posts().await {
            Ok(raw) => {
                let slots = raw.len();
                let posts = Arc::new(arrange_feed(raw));
                let published = self.order.publish_if_newer(ticket, || {
                    self.view.send_replace(ViewState::Ready(Arc::clone(&posts)));
                });
                debug!(slots, visible = posts.len(), published, "feed refreshed");
                Ok(posts)
            }
            Err(err) => {
                let published = self.order.publish_if_newer(ticket, || {
                    self.view.send_replace(ViewState::Unknown(err.to_string()));
                });
                if published {
                    warn!(error = %err, "feed refresh failed, state unknown");
                    surface(self.notifier.as_ref(), &err);
                }
                Err(err)
            }
        }
    }

    /// Current view model
    pub fn snapshot(&self) -> ViewState<Post> {
        self.view.borrow().clone()
    }

    /// Posts of the current snapshot, if one is ready
    pub fn posts(&self) -> Option<Arc<Vec<Post>>> {
        match &*self.view.borrow() {
            ViewState::Ready(posts) => Some(Arc::clone(posts)),
            _ => None,
        }
    }

    /// Receiver that observes every swapped-in snapshot
    pub fn watch(&self) -> watch::Receiver<ViewState<Post>> {
        self.view.subscribe()
    }

    /// Number of ledger fetches performed so far
    pub fn fetch_count(&self) -> u64 {
        self.order.issued()
    }

    /// Refresh on every confirmed create-post or like from `manager`
    pub fn follow(self: &Arc<Self>, manager: &TransactionManager) -> SyncHandle {
        follow(Arc::clone(self), manager)
    }
}

#[async_trait]
impl Refreshable for FeedSynchronizer {
    fn is_affected_by(&self, call: &CallKind) -> bool {
        call.touches_feed()
    }

    async fn refresh_view(&self) {
        // Failure is already published as Unknown and surfaced
        let _ = self.refresh().await;
    }
}
