// Contract Calls - Typed descriptors for every state-changing contract function
// Each variant has a fixed argument shape; ABI encoding is derived from it

use super::model::PostId;
use crate::media::ContentId;
use ethers_core::abi::{self, ParamType, Token};
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lightweight description of what a call touches, shared with views
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    CreatePost,
    Like(PostId),
    Comment(PostId),
    Withdraw,
}

impl CallKind {
    /// Whether confirmation changes the post collection (new post or like count)
    pub fn touches_feed(&self) -> bool {
        matches!(self, CallKind::CreatePost | CallKind::Like(_))
    }

    /// Whether confirmation changes what is shown for `post_id`
    pub fn touches_post(&self, post_id: PostId) -> bool {
        match self {
            CallKind::Like(id) | CallKind::Comment(id) => *id == post_id,
            _ => false,
        }
    }

    /// Whether confirmation changes the contract balance
    pub fn touches_treasury(&self) -> bool {
        matches!(self, CallKind::CreatePost | CallKind::Withdraw)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::CreatePost => write!(f, "createPost"),
            CallKind::Like(id) => write!(f, "likePost({})", id.0),
            CallKind::Comment(id) => write!(f, "commentOnPost({})", id.0),
            CallKind::Withdraw => write!(f, "withdraw"),
        }
    }
}

// ============================================================================
// CONTRACT CALL
// ============================================================================

/// A state-changing call against the social contract
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractCall {
    /// `createPost(string content, string imageCID)`, payable
    CreatePost {
        content: String,
        media: Option<ContentId>,
        fee: U256,
    },
    /// `likePost(uint256 postId)`
    LikePost { post_id: PostId },
    /// `commentOnPost(uint256 postId, string content, string imageCID)`
    CommentOnPost {
        post_id: PostId,
        content: String,
        media: Option<ContentId>,
    },
    /// `withdraw()`, owner only
    Withdraw,
}

fn media_token(media: &Option<ContentId>) -> Token {
    Token::String(
        media
            .as_ref()
            .map(|cid| cid.as_str().to_string())
            .unwrap_or_default(),
    )
}

impl ContractCall {
    pub fn create_post(content: &str, media: Option<ContentId>, fee: U256) -> Self {
        ContractCall::CreatePost {
            content: content.to_string(),
            media,
            fee,
        }
    }

    pub fn like(post_id: PostId) -> Self {
        ContractCall::LikePost { post_id }
    }

    pub fn comment(post_id: PostId, content: &str, media: Option<ContentId>) -> Self {
        ContractCall::CommentOnPost {
            post_id,
            content: content.to_string(),
            media,
        }
    }

    pub fn withdraw() -> Self {
        ContractCall::Withdraw
    }

    /// Solidity function name
    pub fn function_name(&self) -> &'static str {
        match self {
            ContractCall::CreatePost { .. } => "createPost",
            ContractCall::LikePost { .. } => "likePost",
            ContractCall::CommentOnPost { .. } => "commentOnPost",
            ContractCall::Withdraw => "withdraw",
        }
    }

    fn param_types(&self) -> Vec<ParamType> {
        match self {
            ContractCall::CreatePost { .. } => vec![ParamType::String, ParamType::String],
            ContractCall::LikePost { .. } => vec![ParamType::Uint(256)],
            ContractCall::CommentOnPost { .. } => {
                vec![ParamType::Uint(256), ParamType::String, ParamType::String]
            }
            ContractCall::Withdraw => Vec::new(),
        }
    }

    /// Positional ABI arguments; absent media is encoded as `""`
    pub fn tokens(&self) -> Vec<Token> {
        match self {
            ContractCall::CreatePost { content, media, .. } => {
                vec![Token::String(content.clone()), media_token(media)]
            }
            ContractCall::LikePost { post_id } => vec![Token::Uint(U256::from(post_id.0))],
            ContractCall::CommentOnPost {
                post_id,
                content,
                media,
            } => vec![
                Token::Uint(U256::from(post_id.0)),
                Token::String(content.clone()),
                media_token(media),
            ],
            ContractCall::Withdraw => Vec::new(),
        }
    }

    /// Four-byte function selector
    pub fn selector(&self) -> [u8; 4] {
        abi::short_signature(self.function_name(), &self.param_types())
    }

    /// Selector followed by ABI-encoded arguments
    pub fn calldata(&self) -> Vec<u8> {
        let mut data = self.selector().to_vec();
        data.extend(abi::encode(&self.tokens()));
        data
    }

    /// Native value attached to the call
    pub fn value(&self) -> U256 {
        match self {
            ContractCall::CreatePost { fee, .. } => *fee,
            _ => U256::zero(),
        }
    }

    pub fn kind(&self) -> CallKind {
        match self {
            ContractCall::CreatePost { .. } => CallKind::CreatePost,
            ContractCall::LikePost { post_id } => CallKind::Like(*post_id),
            ContractCall::CommentOnPost { post_id, .. } => CallKind::Comment(*post_id),
            ContractCall::Withdraw => CallKind::Withdraw,
        }
    }
}

// ============================================================================
// READ CALLS
// ============================================================================

/// Calldata for `getAllPosts()`
pub fn get_all_posts_calldata() -> Vec<u8> {
    abi::short_signature("getAllPosts", &[]).to_vec()
}

/// Calldata for `getComments(uint256)`
pub fn get_comments_calldata(post_id: PostId) -> Vec<u8> {
    let mut data = abi::short_signature("getComments", &[ParamType::Uint(256)]).to_vec();
    data.extend(abi::encode(&[Token::Uint(U256::from(post_id.0))]));
    data
}

/// Calldata for `owner()`
pub fn owner_calldata() -> Vec<u8> {
    abi::short_signature("owner", &[]).to_vec()
}
