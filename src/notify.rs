//! User-facing side channels: transient notifications and navigation.
//!
//! Controllers never render anything themselves. They push a `Notification`
//! and ask the `Navigator` to move; the embedding shell decides how.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Notifications
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

/// One transient toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }
}

/// Writes notifications to the log. Default for headless embedders.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::warn!(message = %notification.message, "User notification")
            }
            _ => tracing::info!(
                level = ?notification.level,
                message = %notification.message,
                "User notification"
            ),
        }
    }
}

/// Keeps every notification in order. Used by tests and by shells that drain
/// toasts on their own schedule.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        lock(&self.seen).clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *lock(&self.seen))
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.seen).iter().map(|n| n.message.clone()).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        lock(&self.seen).last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::debug!(message = %notification.message, "Notification recorded");
        lock(&self.seen).push(notification);
    }
}

// ═══════════════════════════════════════════════════════════
// Navigation
// ═══════════════════════════════════════════════════════════

/// A navigation request issued by a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum NavigationTarget {
    /// In-app route change.
    Path(String),
    /// Full-page navigation away from the client.
    External(String),
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);

    fn redirect_external(&self, url: &str);
}

/// Records navigation requests in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<NavigationTarget> {
        lock(&self.history).clone()
    }

    pub fn last(&self) -> Option<NavigationTarget> {
        lock(&self.history).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "Navigate");
        lock(&self.history).push(NavigationTarget::Path(path.to_string()));
    }

    fn redirect_external(&self, url: &str) {
        tracing::info!(url, "Leaving client for external login");
        lock(&self.history)
            .push(NavigationTarget::External(url.to_string()));
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
