// Client Config - Tunables for validation, fees and confirmation tracking

use crate::media::DEFAULT_GATEWAY;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Character limit applied to post and comment text
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 280;

/// Fee attached to `createPost`: 0.01 native units in wei
pub const DEFAULT_POST_FEE_WEI: u64 = 10_000_000_000_000_000;

/// Errors raised by configuration validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration shared by the transaction manager, views and RPC backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum characters accepted in post/comment text
    pub max_content_chars: usize,
    /// Value attached to `createPost`, in wei
    pub post_fee: U256,
    /// Soft timeout for confirmation in milliseconds; `None` waits for the transport
    pub confirmation_timeout_ms: Option<u64>,
    /// Receipt polling interval for RPC backends
    pub receipt_poll_interval_ms: u64,
    /// Gateway prefix used to resolve media identifiers
    pub media_gateway: String,
    /// Buffer size of the transaction event channel
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            post_fee: U256::from(DEFAULT_POST_FEE_WEI),
            confirmation_timeout_ms: None,
            receipt_poll_interval_ms: 2_000,
            media_gateway: DEFAULT_GATEWAY.to_string(),
            event_capacity: 64,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }

    pub fn with_post_fee(mut self, fee: U256) -> Self {
        self.post_fee = fee;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_receipt_poll_interval_ms(mut self, ms: u64) -> Self {
        self.receipt_poll_interval_ms = ms;
        self
    }

    pub fn with_media_gateway(mut self, gateway: &str) -> Self {
        self.media_gateway = gateway.to_string();
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Soft confirmation timeout as a duration
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_ms.map(Duration::from_millis)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_content_chars == 0 {
            return Err(ConfigError::Invalid(
                "max_content_chars must be > 0".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid(
                "event_capacity must be > 0".to_string(),
            ));
        }
        if self.receipt_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "receipt_poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.confirmation_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "confirmation_timeout_ms must be > 0 when set".to_string(),
            ));
        }
        if !self.media_gateway.starts_with("http://") && !self.media_gateway.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "media_gateway must be an http(s) URL, got {}",
                self.media_gateway
            )));
        }
        Ok(())
    }
}
