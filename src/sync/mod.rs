// Sync module - THE READ SIDE
// View models rebuilt from ledger reads and refreshed after confirmations

mod comments;
mod feed;
mod treasury;
mod view;

pub use comments::CommentAccessor;
pub use feed::{arrange_feed, FeedSynchronizer};
pub use treasury::{format_ether, TreasuryMonitor};
pub use view::{follow, Refreshable, SyncHandle, ViewState};
