// RPC Codec - ABI decoding of contract return data and JSON-RPC value helpers

use crate::ledger::{Comment, LedgerError, Post, PostId};
use crate::media::ContentId;
use crate::tx::{ReceiptStatus, TxHash, TxReceipt};
use ethers_core::abi::{self, ParamType, Token};
use ethers_core::types::{Address, U256, U64};
use serde::Deserialize;

/// EIP-1193 "user rejected request" error code
pub const USER_REJECTED_CODE: i64 = 4001;

fn post_tuple() -> ParamType {
    ParamType::Tuple(vec![
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::String,
        ParamType::String,
        ParamType::Uint(256),
        ParamType::Uint(256),
    ])
}

fn comment_tuple() -> ParamType {
    ParamType::Tuple(vec![
        ParamType::Address,
        ParamType::String,
        ParamType::String,
        ParamType::Uint(256),
    ])
}

fn malformed(what: &str) -> LedgerError {
    LedgerError::MalformedResponse(what.to_string())
}

fn to_u64(value: U256, field: &str) -> Result<u64, LedgerError> {
    if value > U256::from(u64::MAX) {
        return Err(LedgerError::MalformedResponse(format!(
            "{} does not fit in 64 bits",
            field
        )));
    }
    Ok(value.low_u64())
}

/// Take the fields of a tuple token, checking arity
fn tuple_fields(token: Token, arity: usize) -> Result<Vec<Token>, LedgerError> {
    let fields = token.into_tuple().ok_or_else(|| malformed("expected tuple"))?;
    if fields.len() != arity {
        return Err(malformed("unexpected tuple arity"));
    }
    Ok(fields)
}

/// Decode a single dynamic array return value
fn decode_array(item: ParamType, data: &[u8]) -> Result<Vec<Token>, LedgerError> {
    let mut tokens = abi::decode(&[ParamType::Array(Box::new(item))], data)
        .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
    tokens
        .pop()
        .and_then(Token::into_array)
        .ok_or_else(|| malformed("expected array"))
}

/// Decode `getAllPosts()` return data
pub fn decode_posts(data: &[u8]) -> Result<Vec<Post>, LedgerError> {
    decode_array(post_tuple(), data)?
        .into_iter()
        .map(|token| -> Result<Post, LedgerError> {
            let mut fields = tuple_fields(token, 6)?.into_iter();
            let mut next = || fields.next().ok_or_else(|| malformed("missing field"));

            let id = next()?.into_uint().ok_or_else(|| malformed("id"))?;
            let author = next()?.into_address().ok_or_else(|| malformed("author"))?;
            let content = next()?.into_string().ok_or_else(|| malformed("content"))?;
            let media = next()?.into_string().ok_or_else(|| malformed("imageCID"))?;
            let timestamp = next()?.into_uint().ok_or_else(|| malformed("timestamp"))?;
            let likes = next()?.into_uint().ok_or_else(|| malformed("likes"))?;

            Ok(Post::new(
                PostId(to_u64(id, "id")?),
                author,
                &content,
                ContentId::from_ledger(&media),
                to_u64(timestamp, "timestamp")?,
                to_u64(likes, "likes")?,
            ))
        })
        .collect()
}

/// Decode `getComments(uint256)` return data
pub fn decode_comments(data: &[u8]) -> Result<Vec<Comment>, LedgerError> {
    decode_array(comment_tuple(), data)?
        .into_iter()
        .map(|token| -> Result<Comment, LedgerError> {
            let mut fields = tuple_fields(token, 4)?.into_iter();
            let mut next = || fields.next().ok_or_else(|| malformed("missing field"));

            let author = next()?.into_address().ok_or_else(|| malformed("author"))?;
            let content = next()?.into_string().ok_or_else(|| malformed("content"))?;
            let media = next()?.into_string().ok_or_else(|| malformed("imageCID"))?;
            let timestamp = next()?.into_uint().ok_or_else(|| malformed("timestamp"))?;

            Ok(Comment::new(
                author,
                &content,
                ContentId::from_ledger(&media),
                to_u64(timestamp, "timestamp")?,
            ))
        })
        .collect()
}

/// Decode `owner()` return data
pub fn decode_address(data: &[u8]) -> Result<Address, LedgerError> {
    abi::decode(&[ParamType::Address], data)
        .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?
        .pop()
        .and_then(Token::into_address)
        .ok_or_else(|| malformed("expected address"))
}

/// `0x`-prefixed hex of raw bytes
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Bytes of a `0x`-prefixed (or bare) hex string
pub fn decode_hex(value: &str) -> Result<Vec<u8>, LedgerError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(digits).map_err(|e| LedgerError::MalformedResponse(e.to_string()))
}

/// Whether a wallet error means the user declined
pub fn is_user_rejection(code: i64, message: &str) -> bool {
    code == USER_REJECTED_CODE || message.contains("User rejected the request")
}

/// Receipt as returned by `eth_getTransactionReceipt`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub status: Option<U64>,
    pub block_number: Option<U64>,
}

impl RpcReceipt {
    /// Convert to a receipt; a status of 0 means reverted
    pub fn into_receipt(self, hash: TxHash) -> Result<TxReceipt, LedgerError> {
        let status = match self.status.map(|s| s.as_u64()) {
            Some(1) => ReceiptStatus::Success,
            Some(0) => ReceiptStatus::Reverted { reason: None },
            Some(other) => {
                return Err(LedgerError::MalformedResponse(format!(
                    "unknown receipt status {}",
                    other
                )))
            }
            None => return Err(malformed("receipt without status")),
        };

        Ok(TxReceipt {
            hash,
            block_number: self.block_number.map(|n| n.as_u64()).unwrap_or(0),
            status,
        })
    }
}
