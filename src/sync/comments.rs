// Comment Accessor - One post's comments in ledger append order

use super::view::{follow, RefreshOrder, Refreshable, SyncHandle, ViewState};
use crate::ledger::{CallKind, Comment, LedgerError, LedgerReader, PostId};
use crate::notify::{surface, Notifier};
use crate::tx::TransactionManager;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

/// Keeps the comment list of a single post in sync with the ledger
///
/// The list is published exactly as returned, oldest first.
pub struct CommentAccessor {
    post_id: PostId,
    reader: Arc<dyn LedgerReader>,
    notifier: Arc<dyn Notifier>,
    view: watch::Sender<ViewState<Comment>>,
    order: RefreshOrder,
}

impl CommentAccessor {
    pub fn new(post_id: PostId, reader: Arc<dyn LedgerReader>, notifier: Arc<dyn Notifier>) -> Self {
        let (view, _) = watch::channel(ViewState::Loading);
        Self {
            post_id,
            reader,
            notifier,
            view,
            order: RefreshOrder::default(),
        }
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub async fn mount(&self) -> Result<Arc<Vec<Comment>>, LedgerError> {
        self.refresh().await
    }

    #[instrument(skip(self), fields(post = %self.post_id))]
    pub async fn refresh(&self) -> Result<Arc<Vec<Comment>>, LedgerError> {
        let ticket = self.order.begin();

        match self.reader.get_comments(self.post_id).await {
            Ok(comments) => {
                let comments = Arc::new(comments);
                let published = self.order.publish_if_newer(ticket, || {
                    self.view
                        .send_replace(ViewState::Ready(Arc::clone(&comments)));
                });
                debug!(count = comments.len(), published, "comments refreshed");
                Ok(comments)
            }
            Err(err) => {
                if self.order.publish_if_newer(ticket, || {
                    self.view.send_replace(ViewState::Unknown(err.to_string()));
                }) {
                    warn!(error = %err, "comment refresh failed, state unknown");
                    surface(self.notifier.as_ref(), &err);
                }
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> ViewState<Comment> {
        self.view.borrow().clone()
    }

    pub fn comments(&self) -> Option<Arc<Vec<Comment>>> {
        match &*self.view.borrow() {
            ViewState::Ready(comments) => Some(Arc::clone(comments)),
            _ => None,
        }
    }

    /// Comment count of the current snapshot (0 until one is ready)
    pub fn count(&self) -> usize {
        self.view.borrow().items().map(|c| c.len()).unwrap_or(0)
    }

    pub fn watch(&self) -> watch::Receiver<ViewState<Comment>> {
        self.view.subscribe()
    }

    pub fn fetch_count(&self) -> u64 {
        self.order.issued()
    }

    /// Refresh on confirmed comments or likes targeting this post
    pub fn follow(self: &Arc<Self>, manager: &TransactionManager) -> SyncHandle {
        follow(Arc::clone(self), manager)
    }
}

#[async_trait]
impl Refreshable for CommentAccessor {
    fn is_affected_by(&self, call: &CallKind) -> bool {
        call.touches_post(self.post_id)
    }

    async fn refresh_view(&self) {
        let _ = self.refresh().await;
    }
}
