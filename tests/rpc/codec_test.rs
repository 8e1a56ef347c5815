// RPC Codec Tests
// Tests for decoding contract return data and node receipts

use ethers_core::abi::{self, Token};
use ethers_core::types::{Address, U256};
use somfeed::ledger::{LedgerError, PostId};
use somfeed::rpc::codec::{
    decode_address, decode_comments, decode_hex, decode_posts, encode_hex, is_user_rejection,
};
use somfeed::rpc::{RpcReceipt, USER_REJECTED_CODE};
use somfeed::tx::{ReceiptStatus, TxHash};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn post_token(id: u64, author: Address, content: &str, cid: &str, ts: u64, likes: u64) -> Token {
    Token::Tuple(vec![
        Token::Uint(U256::from(id)),
        Token::Address(author),
        Token::String(content.into()),
        Token::String(cid.into()),
        Token::Uint(U256::from(ts)),
        Token::Uint(U256::from(likes)),
    ])
}

fn comment_token(author: Address, content: &str, cid: &str, ts: u64) -> Token {
    Token::Tuple(vec![
        Token::Address(author),
        Token::String(content.into()),
        Token::String(cid.into()),
        Token::Uint(U256::from(ts)),
    ])
}

fn alice() -> Address {
    Address::from_low_u64_be(0xA)
}

// ============================================================================
// POSTS
// ============================================================================

#[test]
fn test_decode_posts_keeps_raw_slots() {
    let data = abi::encode(&[Token::Array(vec![
        post_token(0, Address::zero(), "", "", 0, 0),
        post_token(1, alice(), "gm", "QmAbc", 1_700_000_000, 3),
    ])]);

    let posts = decode_posts(&data).unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts[0].is_placeholder());
    assert_eq!(posts[1].id(), PostId(1));
    assert_eq!(posts[1].author(), alice());
    assert_eq!(posts[1].content(), "gm");
    assert_eq!(posts[1].media().unwrap().as_str(), "QmAbc");
    assert_eq!(posts[1].timestamp(), 1_700_000_000);
    assert_eq!(posts[1].likes(), 3);
}

#[test]
fn test_decode_posts_empty_cid_is_none() {
    let data = abi::encode(&[Token::Array(vec![post_token(1, alice(), "text", "", 1, 0)])]);
    assert!(decode_posts(&data).unwrap()[0].media().is_none());
}

#[test]
fn test_decode_posts_empty_array() {
    let data = abi::encode(&[Token::Array(vec![])]);
    assert!(decode_posts(&data).unwrap().is_empty());
}

#[test]
fn test_decode_posts_rejects_oversized_timestamp() {
    let token = Token::Tuple(vec![
        Token::Uint(U256::from(1)),
        Token::Address(alice()),
        Token::String("x".into()),
        Token::String(String::new()),
        Token::Uint(U256::MAX),
        Token::Uint(U256::zero()),
    ]);
    let data = abi::encode(&[Token::Array(vec![token])]);

    assert!(matches!(
        decode_posts(&data),
        Err(LedgerError::MalformedResponse(_))
    ));
}

#[test]
fn test_decode_posts_rejects_garbage() {
    assert!(matches!(
        decode_posts(&[0xde, 0xad]),
        Err(LedgerError::MalformedResponse(_))
    ));
}

// ============================================================================
// COMMENTS AND OWNER
// ============================================================================

#[test]
fn test_decode_comments_in_order() {
    let data = abi::encode(&[Token::Array(vec![
        comment_token(alice(), "first", "", 10),
        comment_token(Address::from_low_u64_be(0xB), "second", "QmImg", 20),
    ])]);

    let comments = decode_comments(&data).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].content(), "first");
    assert!(comments[0].media().is_none());
    assert_eq!(comments[1].media().unwrap().as_str(), "QmImg");
    assert_eq!(comments[1].timestamp(), 20);
}

#[test]
fn test_decode_address() {
    let data = abi::encode(&[Token::Address(alice())]);
    assert_eq!(decode_address(&data).unwrap(), alice());
}

// ============================================================================
// HEX
// ============================================================================

#[test]
fn test_hex_helpers() {
    assert_eq!(encode_hex(&[0xab, 0x01]), "0xab01");
    assert_eq!(decode_hex("0xab01").unwrap(), vec![0xab, 0x01]);
    assert_eq!(decode_hex("ab01").unwrap(), vec![0xab, 0x01]);
    assert!(decode_hex("0xzz").is_err());
}

// ============================================================================
// WALLET ERRORS AND RECEIPTS
// ============================================================================

#[test]
fn test_user_rejection_detection() {
    assert!(is_user_rejection(USER_REJECTED_CODE, "anything"));
    assert!(is_user_rejection(-32000, "MetaMask: User rejected the request."));
    assert!(!is_user_rejection(-32000, "insufficient funds"));
}

#[test]
fn test_receipt_status_mapping() {
    let hash = TxHash::from_bytes([7u8; 32]);

    let ok: RpcReceipt =
        serde_json::from_str(r#"{"status":"0x1","blockNumber":"0x10"}"#).unwrap();
    let receipt = ok.into_receipt(hash).unwrap();
    assert_eq!(receipt.status, ReceiptStatus::Success);
    assert_eq!(receipt.block_number, 16);

    let reverted: RpcReceipt =
        serde_json::from_str(r#"{"status":"0x0","blockNumber":"0x11"}"#).unwrap();
    assert_eq!(
        reverted.into_receipt(hash).unwrap().status,
        ReceiptStatus::Reverted { reason: None }
    );
}

#[test]
fn test_receipt_without_status_is_malformed() {
    let receipt: RpcReceipt = serde_json::from_str(r#"{"blockNumber":"0x1"}"#).unwrap();
    assert!(matches!(
        receipt.into_receipt(TxHash::from_bytes([1u8; 32])),
        Err(LedgerError::MalformedResponse(_))
    ));
}
