use std::path::PathBuf;
use thiserror::Error;

use crate::PermissionStatus;

#[derive(Debug, Error)]
pub enum Error {
    // Registration errors
    #[error("Must use physical device for Push Notifications")]
    NotPhysicalDevice,
    #[error("Permission not granted for push notifications")]
    PermissionNotGranted(PermissionStatus),
    #[error("No project ID found. Push Notifications will not work.")]
    MissingProjectId,
    #[error("{0}")]
    TokenRequest(String),

    // Scheduling errors
    #[error("invalid trigger: {0}")]
    InvalidTrigger(String),
    #[error("{0}")]
    Platform(String),
    #[error("operation is not supported on this platform")]
    NotSupported,
    #[error("platform state lock was poisoned")]
    LockPoisoned,

    // Configuration errors
    #[error("failed to read app config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse app config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    // Common errors
    #[error("Other error: {0}")]
    Other(String),
}
