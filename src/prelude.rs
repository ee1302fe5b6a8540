pub use crate::{
    Alert, AlertSink, AppConfig, DeviceProfile, Error, MountedScreen, Notification,
    NotificationContent, NotificationPlatform, NotificationScreen, NotificationStore,
    NotificationTrigger, PermissionStatus, PlatformOs, RecordingAlerts, SimulatedPlatform,
    DEFAULT_ACTION_IDENTIFIER,
};
