// somfeed - On-chain social feed client
//
// Reads posts and comments from a ledger contract, submits writes through a
// wallet, tracks confirmation, and keeps ordered view models in sync with
// confirmed ledger state.

pub mod compose;
pub mod ledger;
pub mod logging;
pub mod media;
pub mod notify;
pub mod rpc;
pub mod session;
pub mod sync;
pub mod tx;
