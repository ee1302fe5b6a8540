//! Push token registration.

use crate::{
    AlertSink, AppConfig, ChannelImportance, Error, NotificationChannel, NotificationPlatform,
    NotificationStore, PermissionStatus, PlatformOs,
};

const DEFAULT_CHANNEL_ID: &str = "default";
const TOKEN_FAILURE_FALLBACK: &str = "Failed to get push token";
const PERMISSION_DENIED_ALERT: &str = "Failed to get push token for push notification! \n\n\
     Please ensure you have enabled push notifications for this app in your device settings.";

fn default_channel() -> NotificationChannel {
    NotificationChannel {
        id: DEFAULT_CHANNEL_ID.to_owned(),
        name: DEFAULT_CHANNEL_ID.to_owned(),
        importance: ChannelImportance::Max,
        vibration_pattern: vec![0, 250, 250, 250],
        light_color: "#FF231F7C".to_owned(),
    }
}

/// Obtain a push token for this device.
///
/// Permission outcomes and failures are recorded on `store` and reported
/// through `alerts`. Returns the token on success; storing it and toggling
/// `is_registering` is left to the caller.
pub async fn register_for_push_notifications<P>(
    platform: &P,
    store: &NotificationStore,
    config: &AppConfig,
    alerts: &dyn AlertSink,
) -> Option<String>
where
    P: NotificationPlatform + ?Sized,
{
    store.clear_notification_error();

    if platform.os() == PlatformOs::Android {
        if let Err(err) = platform.set_notification_channel(default_channel()).await {
            log::warn!("failed to set up notification channel: {err}");
        }
    }

    match request_push_token(platform, store, config).await {
        Ok(token) => {
            log::info!("Push Notification Token: {token}");
            Some(token)
        }
        Err(err) => {
            record_failure(store, alerts, err);
            None
        }
    }
}

async fn request_push_token<P>(
    platform: &P,
    store: &NotificationStore,
    config: &AppConfig,
) -> Result<String, Error>
where
    P: NotificationPlatform + ?Sized,
{
    if !platform.is_physical_device() {
        return Err(Error::NotPhysicalDevice);
    }

    let existing_status = platform.get_permissions().await?;
    store.set_permission_status(existing_status);

    let mut final_status = existing_status;
    if !existing_status.is_granted() {
        final_status = platform.request_permissions().await?;
        store.set_permission_status(final_status);
    }

    if !final_status.is_granted() {
        return Err(Error::PermissionNotGranted(final_status));
    }

    let project_id = config.project_id().ok_or(Error::MissingProjectId)?;

    let token = platform.get_push_token(project_id).await?;
    Ok(token.data)
}

fn record_failure(store: &NotificationStore, alerts: &dyn AlertSink, err: Error) {
    let message = err.to_string();
    match err {
        Error::NotPhysicalDevice => {
            store.set_notification_error(message.as_str());
            store.set_permission_status(PermissionStatus::Unavailable);
            alerts.alert("Error", &message);
        }
        // status already holds what the platform reported
        Error::PermissionNotGranted(_) => {
            store.set_notification_error(message);
            alerts.alert("Error", PERMISSION_DENIED_ALERT);
        }
        Error::MissingProjectId => {
            store.set_notification_error(message.as_str());
            store.set_permission_status(PermissionStatus::Error);
            alerts.alert("Error", &message);
        }
        err => {
            log::error!("Error getting push token: {err:?}");
            let message = if message.is_empty() {
                TOKEN_FAILURE_FALLBACK.to_owned()
            } else {
                message
            };
            store.set_notification_error(message.as_str());
            store.set_permission_status(PermissionStatus::Error);
            alerts.alert("Error", &message);
        }
    }
}

/// Refresh the recorded permission status without prompting the user
pub async fn check_permission_status<P>(platform: &P, store: &NotificationStore) -> PermissionStatus
where
    P: NotificationPlatform + ?Sized,
{
    match platform.get_permissions().await {
        Ok(status) => {
            store.set_permission_status(status);
            status
        }
        Err(err) => {
            log::error!("Error checking permission status: {err:?}");
            store.set_permission_status(PermissionStatus::Error);
            PermissionStatus::Error
        }
    }
}
