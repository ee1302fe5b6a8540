//! Headless notification test screen.
//!
//! Every button of the screen is an async method. Outcomes are reported
//! through the [`AlertSink`]; handlers never propagate errors and never
//! leave the store half-updated.

use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use serde::Serialize;

use crate::{
    registration::register_for_push_notifications, AlertSink, AppConfig, Error,
    NotificationBehavior, NotificationContent, NotificationPlatform, NotificationRequest,
    NotificationStore, NotificationTrigger, Subscription,
};

/// Delay used by the "Schedule Notification (2s)" button
pub const DELAYED_NOTIFICATION_SECONDS: u64 = 2;
/// Time of day used by the "Schedule Daily" button
pub const DAILY_NOTIFICATION_TIME: (u8, u8) = (9, 0);

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        log::error!("failed to serialize alert payload: {err}");
        String::from("{}")
    })
}

/// 12-hour clock rendering such as `9:00 AM`
fn time_of_day(hour: u8, minute: u8) -> String {
    match NaiveTime::from_hms_opt(hour.into(), minute.into(), 0) {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => format!("{hour}:{minute:02}"),
    }
}

/// Clears the in-flight flag even when the registration future is dropped
struct RegistrationInFlight<'a>(&'a NotificationStore);

impl Drop for RegistrationInFlight<'_> {
    fn drop(&mut self) {
        self.0.set_is_registering(false);
    }
}

pub struct NotificationScreen<P>
where
    P: NotificationPlatform + ?Sized,
{
    platform: Arc<P>,
    store: NotificationStore,
    config: AppConfig,
    alerts: Arc<dyn AlertSink>,
}

/// Event listeners held while the screen is shown; dropping unmounts
#[derive(Debug)]
pub struct MountedScreen<P>
where
    P: NotificationPlatform + ?Sized,
{
    received: Subscription<P>,
    response: Subscription<P>,
}

impl<P> MountedScreen<P>
where
    P: NotificationPlatform + ?Sized,
{
    pub fn subscriptions(&self) -> [&Subscription<P>; 2] {
        [&self.received, &self.response]
    }

    pub fn unmount(self) {}
}

impl<P> NotificationScreen<P>
where
    P: NotificationPlatform + ?Sized,
{
    pub fn new(
        platform: Arc<P>,
        store: NotificationStore,
        config: AppConfig,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            platform,
            store,
            config,
            alerts,
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    /// Install foreground behaviour and listeners, then register for pushes.
    ///
    /// Listeners are released when the returned [`MountedScreen`] is dropped.
    pub async fn mount(&self) -> Result<MountedScreen<P>, Error> {
        self.platform
            .set_notification_handler(NotificationBehavior::default())?;

        let store = self.store.clone();
        let received = self
            .platform
            .add_notification_received_listener(Box::new(move |notification| {
                log::info!(
                    "Notification received: {}",
                    notification.request.identifier
                );
                store.set_last_notification(Some(notification.clone()));
                store.add_notification_to_history(notification);
            }))?;
        let received = Subscription::new(Arc::clone(&self.platform), received);

        let alerts = Arc::clone(&self.alerts);
        let response = self
            .platform
            .add_notification_response_received_listener(Box::new(move |response| {
                log::info!(
                    "Notification response {} for {}",
                    response.action_identifier,
                    response.notification.request.identifier
                );
                alerts.alert(
                    "Notification Tapped",
                    &pretty_json(&response.notification.request.content.data),
                );
            }))?;
        let response = Subscription::new(Arc::clone(&self.platform), response);

        self.register_notifications().await;

        Ok(MountedScreen { received, response })
    }

    /// Run the registration flow unless one is already in flight
    pub async fn register_notifications(&self) -> Option<String> {
        if !self.store.try_begin_registration() {
            log::debug!("registration already in progress");
            return None;
        }
        let _in_flight = RegistrationInFlight(&self.store);

        let token = register_for_push_notifications(
            self.platform.as_ref(),
            &self.store,
            &self.config,
            self.alerts.as_ref(),
        )
        .await;

        if let Some(token) = &token {
            self.store.set_push_token(Some(token.clone()));
        }
        token
    }

    fn report_failure(&self, action: &str, err: Error) {
        log::error!("failed to {action}: {err:?}");
        self.alerts
            .alert("Error", &format!("Failed to {action}: {err}"));
    }

    pub async fn schedule_immediate_notification(&self) -> Option<String> {
        let content = NotificationContent::new()
            .title("Immediate Test 🚀")
            .body("This notification appears immediately!")
            .data_entry("immediate", true);

        match self
            .platform
            .schedule_notification(content, NotificationTrigger::Immediate)
            .await
        {
            Ok(identifier) => Some(identifier),
            Err(err) => {
                self.report_failure("send notification", err);
                None
            }
        }
    }

    pub async fn schedule_delayed_notification(&self) -> Option<String> {
        let content = NotificationContent::new()
            .title("Test Notification 📬")
            .body("This is a local test notification!")
            .data_entry("testData", "Some data here")
            .data_entry("timestamp", Utc::now().timestamp_millis())
            .sound("default");
        let trigger = NotificationTrigger::after_seconds(DELAYED_NOTIFICATION_SECONDS);

        match self.platform.schedule_notification(content, trigger).await {
            Ok(identifier) => {
                self.alerts.alert(
                    "Success",
                    &format!(
                        "Local notification scheduled for {DELAYED_NOTIFICATION_SECONDS} seconds from now"
                    ),
                );
                Some(identifier)
            }
            Err(err) => {
                self.report_failure("schedule notification", err);
                None
            }
        }
    }

    pub async fn schedule_daily_notification(&self) -> Option<String> {
        let (hour, minute) = DAILY_NOTIFICATION_TIME;
        let content = NotificationContent::new()
            .title("Daily Reminder ⏰")
            .body("This is your daily notification")
            .data_entry("type", "daily");

        match self
            .platform
            .schedule_notification(content, NotificationTrigger::daily(hour, minute))
            .await
        {
            Ok(identifier) => {
                self.alerts.alert(
                    "Success",
                    &format!("Daily notification scheduled for {}", time_of_day(hour, minute)),
                );
                Some(identifier)
            }
            Err(err) => {
                self.report_failure("schedule daily notification", err);
                None
            }
        }
    }

    pub async fn list_scheduled_notifications(&self) -> Option<Vec<NotificationRequest>> {
        match self.platform.get_all_scheduled_notifications().await {
            Ok(scheduled) => {
                let message = if scheduled.is_empty() {
                    "No scheduled notifications".to_owned()
                } else {
                    format!(
                        "Found {} scheduled notification(s)\n\n{}",
                        scheduled.len(),
                        pretty_json(&scheduled)
                    )
                };
                self.alerts.alert("Scheduled Notifications", &message);
                Some(scheduled)
            }
            Err(err) => {
                self.report_failure("list scheduled notifications", err);
                None
            }
        }
    }

    pub async fn cancel_all_notifications(&self) -> bool {
        match self.platform.cancel_all_scheduled_notifications().await {
            Ok(()) => {
                self.alerts
                    .alert("Success", "All scheduled notifications cancelled");
                true
            }
            Err(err) => {
                self.report_failure("cancel notifications", err);
                false
            }
        }
    }

    /// Read the badge from the platform; the store's badge field is left alone
    pub async fn get_badge_count(&self) -> Option<u32> {
        match self.platform.get_badge_count().await {
            Ok(count) => {
                self.alerts
                    .alert("Badge Count", &format!("Current badge count: {count}"));
                Some(count)
            }
            Err(err) => {
                self.report_failure("get badge count", err);
                None
            }
        }
    }

    /// Write the badge on the platform; the store's badge field is left alone
    pub async fn set_badge_count(&self, count: u32) -> bool {
        match self.platform.set_badge_count(count).await {
            Ok(_) => {
                self.alerts
                    .alert("Success", &format!("Badge count set to {count}"));
                true
            }
            Err(err) => {
                self.report_failure("set badge count", err);
                false
            }
        }
    }

    pub fn view_full_token(&self) {
        match self.store.push_token() {
            Some(token) => self.alerts.alert("Token", &token),
            None => self.alerts.alert("Token", "No token registered"),
        }
    }

    pub fn clear_history(&self) {
        self.store.clear_notification_history();
    }

    /// Text rendering of the current state
    pub fn render(&self) -> String {
        let state = self.store.snapshot();
        let mut lines = vec!["🔔 Notifications Test".to_owned(), String::new()];

        lines.push("Push Token".to_owned());
        lines.push(if state.is_registering {
            "Registering...".to_owned()
        } else {
            state
                .push_token
                .clone()
                .unwrap_or_else(|| "No token registered".to_owned())
        });

        if let Some(notification) = &state.last_notification {
            let content = &notification.request.content;
            lines.push(String::new());
            lines.push("Last Notification Received".to_owned());
            lines.push(format!("Title: {}", content.title.as_deref().unwrap_or("")));
            lines.push(format!("Body: {}", content.body.as_deref().unwrap_or("")));
        }

        lines.push(String::new());
        lines.push("Status".to_owned());
        lines.push(format!("Permission: {}", state.permission_status));
        lines.push(format!("Badge: {}", state.badge_count));
        lines.push(format!(
            "History: {} notification(s)",
            state.notification_history.len()
        ));
        if let Some(error) = &state.notification_error {
            lines.push(format!("Error: {error}"));
        }

        lines.join("\n")
    }
}
