// Intent Validation - Local preconditions checked before any network call

use crate::session::DEFAULT_MAX_CONTENT_CHARS;
use ethers_core::types::U256;
use thiserror::Error;

/// Errors for intents blocked locally
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Content cannot be empty without an attachment")]
    EmptyContent,

    #[error("Content is {length} characters, over the {limit} character limit")]
    ContentTooLong { length: usize, limit: usize },

    #[error("Balance is zero, nothing to withdraw")]
    ZeroBalance,
}

/// Validator for write intents
///
/// The character limit is a client policy; the contract accepts any length.
/// Text is never truncated, only rejected.
///
/// Length is counted in Unicode scalar values, not UTF-16 code units. A web
/// form limiting `String.length` counts astral characters (most emoji) twice,
/// so 150 emoji pass here but are blocked there.
#[derive(Clone, Copy, Debug)]
pub struct IntentValidator {
    max_chars: usize,
}

impl IntentValidator {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Check post/comment text given whether media is attached
    pub fn check_content(&self, content: &str, has_media: bool) -> Result<(), ValidationError> {
        if content.trim().is_empty() && !has_media {
            return Err(ValidationError::EmptyContent);
        }

        let length = content.chars().count();
        if length > self.max_chars {
            return Err(ValidationError::ContentTooLong {
                length,
                limit: self.max_chars,
            });
        }

        Ok(())
    }

    /// Block a withdrawal only when the cached balance is known to be zero
    pub fn check_withdraw(&self, cached_balance: Option<U256>) -> Result<(), ValidationError> {
        match cached_balance {
            Some(balance) if balance.is_zero() => Err(ValidationError::ZeroBalance),
            _ => Ok(()),
        }
    }
}

impl Default for IntentValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONTENT_CHARS)
    }
}
