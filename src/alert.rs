use std::sync::{Mutex, PoisonError};

/// A modal message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Where user-facing alerts go
pub trait AlertSink: Send + Sync {
    fn alert(&self, title: &str, message: &str);
}

/// Writes alerts to the log
#[derive(Debug, Default)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&self, title: &str, message: &str) {
        log::info!("[alert] {title}: {message}");
    }
}

/// Keeps every alert in order of arrival
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn last(&self) -> Option<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, title: &str, message: &str) {
        log::debug!("recorded alert {title:?}");
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Alert {
                title: title.to_owned(),
                message: message.to_owned(),
            });
    }
}
