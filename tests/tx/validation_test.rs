// Intent Validation Tests
// Tests for local content and withdrawal preconditions

use ethers_core::types::U256;
use somfeed::tx::{IntentValidator, ValidationError};

// ============================================================================
// CONTENT
// ============================================================================

#[test]
fn test_default_limit_is_280() {
    assert_eq!(IntentValidator::default().max_chars(), 280);
}

#[test]
fn test_empty_without_media_rejected() {
    let validator = IntentValidator::default();

    assert_eq!(
        validator.check_content("", false),
        Err(ValidationError::EmptyContent)
    );
    assert_eq!(
        validator.check_content(" \n\t ", false),
        Err(ValidationError::EmptyContent)
    );
}

#[test]
fn test_empty_with_media_allowed() {
    assert!(IntentValidator::default().check_content("", true).is_ok());
}

#[test]
fn test_limit_is_inclusive() {
    let validator = IntentValidator::default();

    assert!(validator.check_content(&"a".repeat(280), false).is_ok());
    assert_eq!(
        validator.check_content(&"a".repeat(281), false),
        Err(ValidationError::ContentTooLong {
            length: 281,
            limit: 280
        })
    );
}

#[test]
fn test_limit_counts_characters_not_bytes() {
    let validator = IntentValidator::default();

    // 280 two-byte characters
    let text = "é".repeat(280);
    assert_eq!(text.len(), 560);
    assert!(validator.check_content(&text, false).is_ok());
}

#[test]
fn test_long_text_rejected_even_with_media() {
    let validator = IntentValidator::new(10);
    assert!(matches!(
        validator.check_content("eleven char", true),
        Err(ValidationError::ContentTooLong { length: 11, limit: 10 })
    ));
}

// ============================================================================
// WITHDRAW
// ============================================================================

#[test]
fn test_zero_balance_blocks_withdraw() {
    assert_eq!(
        IntentValidator::default().check_withdraw(Some(U256::zero())),
        Err(ValidationError::ZeroBalance)
    );
}

#[test]
fn test_positive_or_unknown_balance_allows_withdraw() {
    let validator = IntentValidator::default();

    assert!(validator.check_withdraw(Some(U256::from(1))).is_ok());
    assert!(validator.check_withdraw(None).is_ok());
}
