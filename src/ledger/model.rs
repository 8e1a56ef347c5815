// Ledger Model - Read-only snapshots of posts and comments as stored on chain

use super::age::format_time_ago;
use crate::media::{gateway_url, ContentId};
use chrono::{DateTime, Utc};
use ethers_core::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Check for the zero address the contract uses for empty slots
pub fn is_zero_address(address: &Address) -> bool {
    address.is_zero()
}

fn timestamp_to_datetime(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

// ============================================================================
// POST ID
// ============================================================================

/// Ledger-assigned, monotonically increasing post identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl PostId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post#{}", self.0)
    }
}

// ============================================================================
// POST
// ============================================================================

/// A post as returned by `getAllPosts`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    id: PostId,
    author: Address,
    content: String,
    media: Option<ContentId>,
    timestamp: u64,
    likes: u64,
}

impl Post {
    pub fn new(
        id: PostId,
        author: Address,
        content: &str,
        media: Option<ContentId>,
        timestamp: u64,
        likes: u64,
    ) -> Self {
        Self {
            id,
            author,
            content: content.to_string(),
            media,
            timestamp,
            likes,
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn author(&self) -> Address {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn media(&self) -> Option<&ContentId> {
        self.media.as_ref()
    }

    /// Creation time in seconds since the epoch
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn likes(&self) -> u64 {
        self.likes
    }

    /// True for an empty or never-initialized slot (zero-address author)
    pub fn is_placeholder(&self) -> bool {
        is_zero_address(&self.author)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.timestamp)
    }

    /// Attached media resolved through `gateway`
    pub fn media_url(&self, gateway: &str) -> Option<String> {
        self.media.as_ref().map(|cid| gateway_url(gateway, cid))
    }

    /// Relative age label such as "about 5 hours ago"
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        format_time_ago(self.timestamp, now)
    }

    /// Only the in-memory ledger mutates a post, when a like is mined
    pub(crate) fn record_like(&mut self) {
        self.likes = self.likes.saturating_add(1);
    }
}

// ============================================================================
// COMMENT
// ============================================================================

/// A comment as returned by `getComments`, addressed only by position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    author: Address,
    content: String,
    media: Option<ContentId>,
    timestamp: u64,
}

impl Comment {
    pub fn new(author: Address, content: &str, media: Option<ContentId>, timestamp: u64) -> Self {
        Self {
            author,
            content: content.to_string(),
            media,
            timestamp,
        }
    }

    pub fn author(&self) -> Address {
        self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn media(&self) -> Option<&ContentId> {
        self.media.as_ref()
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.timestamp)
    }

    pub fn media_url(&self, gateway: &str) -> Option<String> {
        self.media.as_ref().map(|cid| gateway_url(gateway, cid))
    }

    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        format_time_ago(self.timestamp, now)
    }
}
