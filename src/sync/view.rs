// View State - Snapshots shared with presentation, and confirmation-driven refresh

use crate::ledger::CallKind;
use crate::tx::{TransactionManager, TxEvent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// ============================================================================
// VIEW STATE
// ============================================================================

/// What a view currently knows about ledger state
///
/// A failed read is `Unknown`, never an empty `Ready`.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    /// Nothing fetched yet
    Loading,
    /// Last successful snapshot, swapped in whole on every refresh
    Ready(Arc<Vec<T>>),
    /// The last read failed; the ledger state is unknown
    Unknown(String),
}

impl<T> ViewState<T> {
    /// Items of a ready snapshot
    pub fn items(&self) -> Option<&[T]> {
        match self {
            ViewState::Ready(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ViewState::Unknown(_))
    }
}

// ============================================================================
// REFRESH ORDERING
// ============================================================================

/// Tickets for overlapping refreshes of one view
///
/// A read publishes only if no later-started read has published already,
/// so a slow read never replaces a newer snapshot.
#[derive(Debug, Default)]
pub(crate) struct RefreshOrder {
    issued: AtomicU64,
    published: Mutex<u64>,
}

impl RefreshOrder {
    /// Take the ticket for a read about to start
    pub(crate) fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of reads started so far
    pub(crate) fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Run `publish` if `ticket` is newer than the last published one
    pub(crate) fn publish_if_newer(&self, ticket: u64, publish: impl FnOnce()) -> bool {
        let mut last = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket <= *last {
            debug!(ticket, last = *last, "stale read discarded");
            return false;
        }
        *last = ticket;
        publish();
        true
    }
}

// ============================================================================
// FOLLOWING A MANAGER
// ============================================================================

/// A view that re-reads the ledger when a relevant transaction confirms
#[async_trait]
pub trait Refreshable: Send + Sync + 'static {
    /// Whether a confirmed call changes what this view shows
    fn is_affected_by(&self, call: &CallKind) -> bool;

    /// Re-query and publish a new snapshot; failures are published, not returned
    async fn refresh_view(&self);
}

/// Subscription of a mounted view to one manager's events
///
/// Dropping the handle (or calling `unmount`) stops notifications to the view.
/// Transactions already broadcast are not affected.
#[derive(Debug)]
pub struct SyncHandle {
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop following
    pub fn unmount(self) {
        // Drop aborts the task
    }

    /// Whether the follower task is still running
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Refresh `view` once for every confirmed event that affects it
pub fn follow<V: Refreshable>(view: Arc<V>, manager: &TransactionManager) -> SyncHandle {
    let events = manager.subscribe();
    SyncHandle {
        task: tokio::spawn(run_follower(view, events)),
    }
}

async fn run_follower<V: Refreshable>(view: Arc<V>, mut events: broadcast::Receiver<TxEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(call) = event.confirmed_call() else {
                    continue;
                };
                if view.is_affected_by(&call) {
                    debug!(%call, "confirmation affects view, refreshing");
                    view.refresh_view().await;
                }
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "fell behind transaction events, refreshing");
                view.refresh_view().await;
            }
            Err(RecvError::Closed) => break,
        }
    }
}
