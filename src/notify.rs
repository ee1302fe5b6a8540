use std::fmt::{self, Debug};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// Content of a local or remote notification
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContent {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub data: Map<String, Value>,
    pub sound: Option<String>,
    pub badge: Option<u32>,
}

impl NotificationContent {
    pub fn new() -> Self {
        NotificationContent::default()
    }

    /// Set primary description of notification
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    /// Set secondary description of notification
    pub fn subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_owned());
        self
    }

    /// Set main content of notification
    pub fn body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    /// Set notification sound
    ///
    /// Use "default" for the default system sound, otherwise the file name of
    /// a bundled sound without extension.
    pub fn sound(mut self, sound: &str) -> Self {
        self.sound = Some(sound.to_owned());
        self
    }

    /// Set the app icon badge applied when the notification is presented
    pub fn badge(mut self, badge: u32) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Insert one entry into the JSON payload
    pub fn data_entry(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_owned(), value.into());
        self
    }

    /// Replace the JSON payload
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }
}

/// When a scheduled notification fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NotificationTrigger {
    /// Present right away
    Immediate,
    /// Fire after `seconds`, and keep firing at that interval when `repeats`
    TimeInterval { seconds: u64, repeats: bool },
    /// Fire every day at `hour:minute` local time
    Daily { hour: u8, minute: u8 },
}

impl NotificationTrigger {
    pub fn after_seconds(seconds: u64) -> Self {
        NotificationTrigger::TimeInterval {
            seconds,
            repeats: false,
        }
    }

    pub fn daily(hour: u8, minute: u8) -> Self {
        NotificationTrigger::Daily { hour, minute }
    }

    /// Check trigger bounds before handing it to a platform
    pub fn validate(&self) -> Result<(), Error> {
        match *self {
            NotificationTrigger::Immediate => Ok(()),
            NotificationTrigger::TimeInterval { seconds: 0, .. } => Err(Error::InvalidTrigger(
                "time interval must be at least 1 second".to_owned(),
            )),
            NotificationTrigger::TimeInterval { .. } => Ok(()),
            NotificationTrigger::Daily { hour, minute } if hour > 23 || minute > 59 => Err(
                Error::InvalidTrigger(format!("{hour}:{minute:02} is not a valid time of day")),
            ),
            NotificationTrigger::Daily { .. } => Ok(()),
        }
    }
}

/// A notification request as known to the platform scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: NotificationTrigger,
}

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub date: DateTime<Utc>,
    pub request: NotificationRequest,
}

/// The default action identifier, sent when the user taps the notification body
pub const DEFAULT_ACTION_IDENTIFIER: &str = "default";

/// User interaction with a delivered notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification: Notification,
    pub action_identifier: String,
    /// The text that the user typed in as response
    pub user_text: Option<String>,
}

/// Notification permission as reported by the platform, plus the two
/// environment failure states recorded by registration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    #[default]
    Unknown,
    Granted,
    Denied,
    Unavailable,
    Error,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionStatus::Unknown => "unknown",
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
            PermissionStatus::Unavailable => "unavailable",
            PermissionStatus::Error => "error",
        }
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformOs {
    Android,
    Ios,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelImportance {
    Min,
    Low,
    Default,
    High,
    Max,
}

/// Android notification channel settings
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: ChannelImportance,
    pub vibration_pattern: Vec<u64>,
    pub light_color: String,
}

/// How notifications are presented while the app is in the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationBehavior {
    pub should_show_alert: bool,
    pub should_play_sound: bool,
    pub should_set_badge: bool,
}

impl Default for NotificationBehavior {
    fn default() -> Self {
        Self {
            should_show_alert: true,
            should_play_sound: true,
            should_set_badge: true,
        }
    }
}

/// Token issued by the push service for this device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushToken {
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

pub type ReceivedListener = Box<dyn Fn(Notification) + Send + Sync + 'static>;
pub type ResponseListener = Box<dyn Fn(NotificationResponse) + Send + Sync + 'static>;

#[async_trait]
pub trait NotificationPlatform
where
    Self: Send + Sync + Debug,
{
    /// Operating system the app runs on
    fn os(&self) -> PlatformOs;

    /// False on simulators and emulators
    fn is_physical_device(&self) -> bool;

    /// Configure foreground presentation of incoming notifications
    fn set_notification_handler(&self, behavior: NotificationBehavior) -> Result<(), Error>;

    /// Create or update an Android notification channel
    async fn set_notification_channel(&self, channel: NotificationChannel) -> Result<(), Error>;

    /// Get notification permission state without prompting
    async fn get_permissions(&self) -> Result<PermissionStatus, Error>;

    /// Prompt the user for notification permission
    async fn request_permissions(&self) -> Result<PermissionStatus, Error>;

    /// Ask the push service for a device token
    async fn get_push_token(&self, project_id: &str) -> Result<PushToken, Error>;

    /// Schedule a local notification and return its identifier
    async fn schedule_notification(
        &self,
        content: NotificationContent,
        trigger: NotificationTrigger,
    ) -> Result<String, Error>;

    /// Get all notifications that are scheduled and have not fired for good
    async fn get_all_scheduled_notifications(&self) -> Result<Vec<NotificationRequest>, Error>;

    /// Cancel every scheduled notification
    async fn cancel_all_scheduled_notifications(&self) -> Result<(), Error>;

    async fn get_badge_count(&self) -> Result<u32, Error>;

    /// Returns whether the badge was applied
    async fn set_badge_count(&self, count: u32) -> Result<bool, Error>;

    /// Listen for notifications delivered while the app is running
    fn add_notification_received_listener(
        &self,
        listener: ReceivedListener,
    ) -> Result<SubscriptionId, Error>;

    /// Listen for user interaction with delivered notifications
    fn add_notification_response_received_listener(
        &self,
        listener: ResponseListener,
    ) -> Result<SubscriptionId, Error>;

    fn remove_subscription(&self, id: SubscriptionId) -> Result<(), Error>;
}
