// Session module - Explicit per-session context
// Wallet account, contract address and client configuration passed into constructors

mod config;
mod context;

pub use config::{ClientConfig, ConfigError, DEFAULT_MAX_CONTENT_CHARS, DEFAULT_POST_FEE_WEI};
pub use context::SessionContext;
