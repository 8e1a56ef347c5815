// Notices - Toast-style notifications handed to the presentation layer

use std::fmt;
use std::sync::Mutex;
use tracing::{error, info};

/// How a notice should be presented
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Work in progress (upload, withdrawal)
    Pending,
    /// Completed successfully
    Success,
    /// Failure the user should see
    Error,
}

/// A single user-visible notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    severity: Severity,
    message: String,
}

impl Notice {
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Pending,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================================
// NOTIFIER
// ============================================================================

/// Sink for user-visible notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Errors that may be shown to the user
///
/// Everything is visible unless the implementor says otherwise.
pub trait Reportable: fmt::Display {
    fn is_user_visible(&self) -> bool {
        true
    }
}

/// Report `err` as an error notice unless it is meant to stay silent.
///
/// Returns true if a notice was emitted.
pub fn surface<E: Reportable + ?Sized>(notifier: &dyn Notifier, err: &E) -> bool {
    if !err.is_user_visible() {
        return false;
    }
    notifier.notify(Notice::error(err.to_string()));
    true
}

/// Notifier that writes notices to the tracing log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => error!(message = %notice.message, "notice"),
            _ => info!(severity = ?notice.severity, message = %notice.message, "notice"),
        }
    }
}

/// Notifier that keeps every notice for later inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices received so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    /// Only the error notices
    pub fn errors(&self) -> Vec<Notice> {
        self.notices()
            .into_iter()
            .filter(Notice::is_error)
            .collect()
    }

    /// Drop everything recorded so far
    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
