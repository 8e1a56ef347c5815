// Ledger module - THE CONTRACT SURFACE
// Post/comment model, typed contract calls, the read interface, and an in-memory ledger

mod age;
mod call;
mod memory;
mod model;
mod reader;

pub use age::format_time_ago;
pub use call::{
    get_all_posts_calldata, get_comments_calldata, owner_calldata, CallKind, ContractCall,
};
pub use memory::{InMemoryLedger, InMemoryWallet, LedgerStats};
pub use model::{is_zero_address, Comment, Post, PostId};
pub use reader::{LedgerError, LedgerReader};
