//! Freedesktop notification backend

use notify_rust::{Notification, Timeout};

use super::{Alert, Notifier, NotifyError};
use crate::policy::Urgency;

/// Backend for freedesktop-compliant notification daemons
pub struct LinuxNotifier;

impl LinuxNotifier {
    /// Probe the notification service once before first use
    pub fn new() -> Result<Self, NotifyError> {
        notify_rust::get_server_information()
            .map_err(|e| NotifyError::BackendUnavailable(e.to_string()))?;
        Ok(Self)
    }
}

impl Notifier for LinuxNotifier {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let mut notification = Notification::new();
        notification
            .summary(&alert.title)
            .body(&alert.body)
            .appname("remote-notify")
            .urgency(map_urgency(alert.urgency))
            .timeout(Timeout::Milliseconds(alert.timeout_ms));
        if let Some(icon) = &alert.icon {
            notification.icon(&icon.to_string_lossy());
        }

        notification
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::DispatchFailed(e.to_string()))
    }
}

fn map_urgency(urgency: Urgency) -> notify_rust::Urgency {
    match urgency {
        Urgency::Low => notify_rust::Urgency::Low,
        Urgency::Normal => notify_rust::Urgency::Normal,
        Urgency::Critical => notify_rust::Urgency::Critical,
    }
}
