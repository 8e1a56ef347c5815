// Content Identifier - Opaque name of an immutable blob in IPFS

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Public gateway used to resolve content identifiers into URLs
pub const DEFAULT_GATEWAY: &str = "https://ipfs.io/ipfs";

/// Multihash prefix for a 32-byte sha2-256 digest
const SHA256_MULTIHASH_PREFIX: [u8; 2] = [0x12, 0x20];

/// Errors raised when parsing a content identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentIdError {
    #[error("Content identifier is empty")]
    Empty,

    #[error("Content identifier contains invalid character {0:?}")]
    InvalidCharacter(char),
}

// ============================================================================
// CONTENT ID
// ============================================================================

/// A non-empty content identifier returned by the uploader
///
/// The ledger stores identifiers as plain strings and uses `""` for "no media";
/// that empty form never becomes a `ContentId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Parse an identifier, rejecting empty strings and path/whitespace characters
    pub fn parse(value: &str) -> Result<Self, ContentIdError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ContentIdError::Empty);
        }
        if let Some(c) = value.chars().find(|c| c.is_whitespace() || *c == '/' || *c == '?') {
            return Err(ContentIdError::InvalidCharacter(c));
        }
        Ok(Self(value.to_string()))
    }

    /// Read the ledger's string form, where `""` means no media attached
    pub fn from_ledger(value: &str) -> Option<Self> {
        Self::parse(value).ok()
    }

    /// Compute the CIDv0 (base58 sha2-256 multihash) of raw bytes
    pub fn v0_from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut multihash = Vec::with_capacity(34);
        multihash.extend_from_slice(&SHA256_MULTIHASH_PREFIX);
        multihash.extend_from_slice(&digest);
        Self(bs58::encode(multihash).into_string())
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether this is a CIDv0 (`Qm...`, 46 characters)
    pub fn is_v0(&self) -> bool {
        self.0.len() == 46
            && self.0.starts_with("Qm")
            && bs58::decode(&self.0)
                .into_vec()
                .map(|raw| raw.len() == 34 && raw[..2] == SHA256_MULTIHASH_PREFIX)
                .unwrap_or(false)
    }

    /// Resolve through the default public gateway
    pub fn url(&self) -> String {
        gateway_url(DEFAULT_GATEWAY, self)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = ContentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(cid: ContentId) -> Self {
        cid.0
    }
}

/// Build the retrievable URL `{gateway}/{cid}`
pub fn gateway_url(gateway: &str, cid: &ContentId) -> String {
    format!("{}/{}", gateway.trim_end_matches('/'), cid.as_str())
}
