//! Desktop alert backends
//!
//! The backend is chosen once at startup via [`create_notifier`]; per-
//! message dispatch goes through the [`Notifier`] trait rather than
//! branching on the operating system per call.

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "macos")]
pub mod macos;

use std::path::PathBuf;
use thiserror::Error;

use crate::policy::Urgency;

/// Notifier error types
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The native notification service could not be reached at startup.
    /// Fatal for the server, which refuses to start.
    #[error("notification backend unavailable: {0}")]
    BackendUnavailable(String),
    /// One message could not be displayed; later messages may still work
    #[error("failed to dispatch notification: {0}")]
    DispatchFailed(String),
    /// No backend exists for this operating system
    #[error("desktop notifications are not supported on {0}")]
    UnsupportedPlatform(&'static str),
}

/// Fully-resolved display parameters for one alert.
///
/// Each backend picks the fields its surface supports; `source` is carried
/// for backends that group alerts by originating application.
#[derive(Debug, Clone)]
pub struct Alert {
    pub title: String,
    pub body: String,
    pub source: String,
    pub icon: Option<PathBuf>,
    pub urgency: Urgency,
    pub timeout_ms: u32,
}

/// Common interface over the host's native notification mechanism
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Select the backend for the current platform.
///
/// Startup-time failures (unreachable notification service, unsupported
/// operating system) surface here, before the server enters its accept
/// loop.
pub fn create_notifier() -> Result<Box<dyn Notifier>, NotifyError> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(linux::LinuxNotifier::new()?))
    }
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(macos::MacNotifier::new()))
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Err(NotifyError::UnsupportedPlatform(std::env::consts::OS))
    }
}
