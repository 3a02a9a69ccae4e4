//! Fire-and-forget user-visible notifications.
//!
//! The gate emits one categorized notification per denial cause. Each
//! notification carries a caller-supplied deduplication key so repeated
//! denials of the same kind do not spam duplicate toasts.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity of the notification.
    pub severity: Severity,
    /// Deduplication key; a second notification with the same key is dropped.
    pub dedup_key: String,
    /// Human-readable message.
    pub message: String,
}

impl Notification {
    /// Creates a success notification.
    #[must_use]
    pub fn success(dedup_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            dedup_key: dedup_key.into(),
            message: message.into(),
        }
    }

    /// Creates a warning notification.
    #[must_use]
    pub fn warning(dedup_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            dedup_key: dedup_key.into(),
            message: message.into(),
        }
    }

    /// Creates an error notification.
    #[must_use]
    pub fn error(dedup_key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            dedup_key: dedup_key.into(),
            message: message.into(),
        }
    }
}

/// Channel for delivering notifications to the user.
pub trait Notifier: Send + Sync {
    /// Delivers a notification. Must not block or fail.
    fn notify(&self, notification: Notification);
}

/// Notifier that logs through tracing.
#[derive(Debug, Default)]
pub struct TracingNotifier {
    seen: Arc<RwLock<HashSet<String>>>,
}

impl TracingNotifier {
    /// Creates a new tracing-backed notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if !self
            .seen
            .write()
            .unwrap()
            .insert(notification.dedup_key.clone())
        {
            return;
        }
        match notification.severity {
            Severity::Success => tracing::info!(message = %notification.message, "notification"),
            Severity::Warning => tracing::warn!(message = %notification.message, "notification"),
            Severity::Error => tracing::error!(message = %notification.message, "notification"),
        }
    }
}

/// Notifier that records deliveries for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Arc<RwLock<HashSet<String>>>,
    delivered: Arc<RwLock<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates a new recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.read().unwrap().clone()
    }
}

impl Clone for RecordingNotifier {
    fn clone(&self) -> Self {
        Self {
            seen: Arc::clone(&self.seen),
            delivered: Arc::clone(&self.delivered),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if !self
            .seen
            .write()
            .unwrap()
            .insert(notification.dedup_key.clone())
        {
            return;
        }
        self.delivered.write().unwrap().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_records_deliveries() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("key-a", "first"));
        notifier.notify(Notification::warning("key-b", "second"));

        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].severity, Severity::Error);
        assert_eq!(delivered[1].message, "second");
    }

    #[test]
    fn duplicate_dedup_key_is_dropped() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("denied", "access denied"));
        notifier.notify(Notification::error("denied", "access denied"));

        assert_eq!(notifier.delivered().len(), 1);
    }

    #[test]
    fn distinct_keys_both_deliver() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::error("denied:role", "role mismatch"));
        notifier.notify(Notification::error("denied:domain", "domain mismatch"));

        assert_eq!(notifier.delivered().len(), 2);
    }

    #[test]
    fn tracing_notifier_dedups_without_panicking() {
        let notifier = TracingNotifier::new();
        notifier.notify(Notification::success("ok", "signed in"));
        notifier.notify(Notification::success("ok", "signed in"));
    }
}
