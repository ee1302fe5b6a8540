//! Shared notification state for the screen and the registration flow.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{Notification, PermissionStatus};

/// Maximum number of entries kept in the notification history
pub const HISTORY_CAPACITY: usize = 50;

/// A received notification as recorded in the history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation time in Unix milliseconds, not unique under rapid succession
    pub id: i64,
    pub notification: Notification,
    /// ISO-8601 UTC timestamp with millisecond precision
    pub received_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationState {
    pub push_token: Option<String>,
    pub last_notification: Option<Notification>,
    /// Newest first, never longer than [`HISTORY_CAPACITY`]
    pub notification_history: Vec<HistoryEntry>,
    pub permission_status: PermissionStatus,
    pub badge_count: u32,
    pub is_registering: bool,
    pub notification_error: Option<String>,
}

/// Handle to the application's notification state.
///
/// Clones share the same state. Setters never fail; a poisoned lock is
/// recovered since every mutation leaves the record consistent.
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    inner: Arc<Mutex<NotificationState>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, NotificationState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the whole record
    pub fn snapshot(&self) -> NotificationState {
        self.state().clone()
    }

    pub fn push_token(&self) -> Option<String> {
        self.state().push_token.clone()
    }

    pub fn set_push_token(&self, token: Option<String>) {
        self.state().push_token = token;
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.state().last_notification.clone()
    }

    pub fn set_last_notification(&self, notification: Option<Notification>) {
        self.state().last_notification = notification;
    }

    pub fn notification_history(&self) -> Vec<HistoryEntry> {
        self.state().notification_history.clone()
    }

    /// Prepend `notification` to the history and evict past the capacity
    pub fn add_notification_to_history(&self, notification: Notification) {
        let now = Utc::now();
        let entry = HistoryEntry {
            id: now.timestamp_millis(),
            notification,
            received_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut state = self.state();
        state.notification_history.insert(0, entry);
        state.notification_history.truncate(HISTORY_CAPACITY);
    }

    pub fn clear_notification_history(&self) {
        self.state().notification_history.clear();
    }

    pub fn permission_status(&self) -> PermissionStatus {
        self.state().permission_status
    }

    pub fn set_permission_status(&self, status: PermissionStatus) {
        self.state().permission_status = status;
    }

    pub fn badge_count(&self) -> u32 {
        self.state().badge_count
    }

    pub fn set_badge_count(&self, count: u32) {
        self.state().badge_count = count;
    }

    pub fn is_registering(&self) -> bool {
        self.state().is_registering
    }

    pub fn set_is_registering(&self, is_registering: bool) {
        self.state().is_registering = is_registering;
    }

    /// Mark a registration as in flight unless one already is.
    ///
    /// Returns false, leaving the flag untouched, when another registration
    /// holds it.
    pub fn try_begin_registration(&self) -> bool {
        let mut state = self.state();
        if state.is_registering {
            return false;
        }
        state.is_registering = true;
        true
    }

    pub fn notification_error(&self) -> Option<String> {
        self.state().notification_error.clone()
    }

    pub fn set_notification_error(&self, error: impl Into<String>) {
        self.state().notification_error = Some(error.into());
    }

    pub fn clear_notification_error(&self) {
        self.state().notification_error = None;
    }
}
