// Notify module - User-visible notifications
// Decides which failures reach the user and delivers notices to the host

mod notice;

pub use notice::{surface, LogNotifier, Notice, Notifier, RecordingNotifier, Reportable, Severity};
