// RPC module - JSON-RPC backend for a deployed social contract

mod client;
pub mod codec;
mod ledger;

pub use client::{JsonRpcClient, RpcClientError};
pub use codec::{RpcReceipt, USER_REJECTED_CODE};
pub use ledger::{RpcLedger, RpcWallet};
