//! Transient user-facing messages raised by the screens

use log::{error, info, warn};
use std::sync::Mutex;

/// How an alert is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Confirmation of a finished action
    Success,
    /// Something failed
    Error,
    /// The OS refused a permission
    PermissionDenied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::PermissionDenied,
            title: "Permission refusée".to_string(),
            message: message.into(),
        }
    }
}

/// Where alerts are shown
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: Alert);
}

/// Writes alerts to the log; used by the command-line front end
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: Alert) {
        match alert.kind {
            AlertKind::Success => info!("{}: {}", alert.title, alert.message),
            AlertKind::PermissionDenied => warn!("{}: {}", alert.title, alert.message),
            AlertKind::Error => error!("{}: {}", alert.title, alert.message),
        }
    }
}

/// Keeps every alert in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, kind: AlertKind) -> usize {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|a| a.kind == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: Alert) {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(alert);
    }
}
