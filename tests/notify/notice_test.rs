// Notice Tests
// Tests for notices, the recording notifier, and which errors reach the user

use somfeed::ledger::LedgerError;
use somfeed::notify::{surface, LogNotifier, Notice, Notifier, RecordingNotifier, Severity};
use somfeed::tx::{TxError, ValidationError};

// ============================================================================
// NOTICE
// ============================================================================

#[test]
fn test_notice_constructors() {
    assert_eq!(Notice::pending("a").severity(), Severity::Pending);
    assert_eq!(Notice::success("b").severity(), Severity::Success);

    let error = Notice::error("c");
    assert!(error.is_error());
    assert_eq!(error.message(), "c");
}

// ============================================================================
// RECORDING NOTIFIER
// ============================================================================

#[test]
fn test_recording_notifier_keeps_order() {
    let notifier = RecordingNotifier::new();
    notifier.notify(Notice::pending("Uploading image to IPFS..."));
    notifier.notify(Notice::error("boom"));
    notifier.notify(Notice::success("Transaction confirmed!"));

    let messages: Vec<_> = notifier
        .notices()
        .iter()
        .map(|n| n.message().to_string())
        .collect();
    assert_eq!(
        messages,
        vec!["Uploading image to IPFS...", "boom", "Transaction confirmed!"]
    );
    assert_eq!(notifier.errors().len(), 1);
}

#[test]
fn test_recording_notifier_clear() {
    let notifier = RecordingNotifier::new();
    notifier.notify(Notice::error("x"));
    notifier.clear();
    assert!(notifier.notices().is_empty());
}

#[test]
fn test_log_notifier_accepts_notices() {
    let notifier = LogNotifier;
    notifier.notify(Notice::success("done"));
    notifier.notify(Notice::error("failed"));
}

// ============================================================================
// SURFACING
// ============================================================================

#[test]
fn test_user_rejection_is_silent() {
    let notifier = RecordingNotifier::new();

    assert!(!surface(&notifier, &TxError::UserRejected));
    assert!(notifier.notices().is_empty());
}

#[test]
fn test_other_failures_are_surfaced() {
    let notifier = RecordingNotifier::new();

    assert!(surface(&notifier, &TxError::Signing("nonce too low".into())));
    assert!(surface(
        &notifier,
        &TxError::LedgerRejected {
            reason: Some("Insufficient fee".into())
        }
    ));
    assert!(surface(&notifier, &TxError::from(ValidationError::EmptyContent)));
    assert!(surface(&notifier, &LedgerError::Transport("down".into())));

    let errors = notifier.errors();
    assert_eq!(errors.len(), 4);
    assert!(errors[0].message().contains("nonce too low"));
    assert!(errors[1].message().contains("Insufficient fee"));
}
