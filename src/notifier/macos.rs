//! macOS backend shelling out to `terminal-notifier`

use std::process::Command;

use super::{Alert, Notifier, NotifyError};

/// Invokes the `terminal-notifier` utility once per message. Alerts are
/// grouped by source so repeated notices from one application replace
/// each other in Notification Center.
pub struct MacNotifier;

impl MacNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for MacNotifier {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let status = Command::new("terminal-notifier")
            .args([
                "-title",
                &alert.title,
                "-message",
                &alert.body,
                "-group",
                &alert.source,
            ])
            .status()
            .map_err(|e| NotifyError::DispatchFailed(e.to_string()))?;

        if !status.success() {
            return Err(NotifyError::DispatchFailed(format!(
                "terminal-notifier exited with {}",
                status
            )));
        }
        Ok(())
    }
}
