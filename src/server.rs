//! Receiving side: sequential accept loop and per-connection handling

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::config::Config;
use crate::notifier::{Alert, Notifier, NotifyError};
use crate::policy;
use crate::protocol::{self, Notification};

/// Pick the port to listen on. On the designated home host the canonical
/// port stays free for SSH-tunnelled senders, so the listener moves one
/// port up.
pub fn effective_port(port: u16, home_host: &str, local_hostname: &str) -> u16 {
    if !home_host.is_empty() && local_hostname == home_host {
        port + 1
    } else {
        port
    }
}

fn local_hostname() -> String {
    nix::unistd::gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Bind the listening socket and run the accept loop. Does not return
/// under normal operation.
pub async fn run(config: Config, notifier: Box<dyn Notifier>) -> Result<()> {
    let port = effective_port(config.port, &config.home_host, &local_hostname());
    if port != config.port {
        tracing::info!("Using alternative port number: {}", port);
    }

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Listening on {}", port);

    serve(listener, config, notifier).await
}

/// Accept connections strictly sequentially: each notification is fully
/// received, decoded, and dispatched before the next accept. Notifications
/// are rare, human-triggered events; there is no worker pool.
///
/// A failed connection is logged and the loop keeps accepting. No timeout
/// is placed on accept, read, or drain, so an unresponsive peer stalls the
/// loop until it closes.
pub async fn serve(
    listener: TcpListener,
    config: Config,
    notifier: Box<dyn Notifier>,
) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if let Err(e) = handle_connection(stream, &config, notifier.as_ref()).await {
                    tracing::warn!("Error handling connection from {}: {:#}", addr, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    config: &Config,
    notifier: &dyn Notifier,
) -> Result<()> {
    // Accumulate until the sender half-closes
    let mut frame = Vec::new();
    stream
        .read_to_end(&mut frame)
        .await
        .context("Failed to read frame")?;

    // Completion rendezvous: indicate finished, then spin until the remote
    // side is also finished before closing
    stream
        .shutdown()
        .await
        .context("Failed to half-close connection")?;
    let mut scratch = [0u8; 1024];
    while stream
        .read(&mut scratch)
        .await
        .context("Failed to drain connection")?
        != 0
    {}
    drop(stream);

    let notification = protocol::decode(&frame)?;
    dispatch(&notification, config, notifier)?;
    Ok(())
}

/// Apply display policy and hand the notification to the platform
/// notifier.
fn dispatch(
    notification: &Notification,
    config: &Config,
    notifier: &dyn Notifier,
) -> Result<(), NotifyError> {
    let received_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let body = if notification.source == "outlook" {
        policy::trim_outlook_body(&notification.body)
    } else {
        notification.body.clone()
    };
    let body = format!("{}\n\n{}", received_at, body);

    let display = policy::resolve(&notification.priority, &notification.source, &config.icon_dir);

    tracing::info!(
        "Notification: time={} priority={} source={} title={:?} message={:?}",
        received_at,
        notification.priority,
        notification.source,
        notification.title,
        body
    );

    notifier.notify(&Alert {
        title: notification.title.clone(),
        body,
        source: notification.source.clone(),
        icon: display.icon,
        urgency: display.urgency,
        timeout_ms: display.timeout_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client;
    use crate::policy::Urgency;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct RecordingNotifier {
        alerts: Arc<Mutex<Vec<Alert>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    async fn start_server() -> (u16, Arc<Mutex<Vec<Alert>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let notifier = Box::new(RecordingNotifier {
            alerts: Arc::clone(&alerts),
        });
        tokio::spawn(serve(listener, Config::default(), notifier));
        (port, alerts)
    }

    async fn send_blocking(port: u16, notification: Notification) {
        tokio::task::spawn_blocking(move || {
            client::send("127.0.0.1", port, &notification).unwrap()
        })
        .await
        .unwrap();
    }

    async fn wait_for_alerts(alerts: &Arc<Mutex<Vec<Alert>>>, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if alerts.lock().unwrap().len() >= count {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for dispatches");
    }

    #[test]
    fn test_effective_port() {
        assert_eq!(effective_port(6683, "desk-lin", "desk-lin"), 6684);
        assert_eq!(effective_port(6683, "desk-lin", "laptop"), 6683);
        // No configured home host, no bump
        assert_eq!(effective_port(6683, "", ""), 6683);
    }

    #[tokio::test]
    async fn test_back_to_back_notifications_dispatch_in_order() {
        let (port, alerts) = start_server().await;

        send_blocking(port, Notification::new("normal", "ti2", "A", "msg1")).await;
        send_blocking(port, Notification::new("critical", "outlook", "B", "Dear,\n\nmsg2")).await;

        wait_for_alerts(&alerts, 2).await;
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 2);

        assert_eq!(alerts[0].title, "A");
        assert_eq!(alerts[0].urgency, Urgency::Normal);
        assert!(alerts[0].body.ends_with("msg1"));

        assert_eq!(alerts[1].title, "B");
        assert_eq!(alerts[1].urgency, Urgency::Critical);
        // Outlook greeting trimmed before display
        assert!(alerts[1].body.ends_with("msg2"));
        assert!(!alerts[1].body.contains("Dear"));
    }

    #[tokio::test]
    async fn test_receipt_timestamp_prepended_to_body() {
        let (port, alerts) = start_server().await;

        send_blocking(port, Notification::new("low", "ti2", "A", "msg")).await;
        wait_for_alerts(&alerts, 1).await;

        let alerts = alerts.lock().unwrap();
        let (timestamp, rest) = alerts[0].body.split_once("\n\n").unwrap();
        // UTC "YYYY-MM-DD HH:MM:SS"
        assert_eq!(timestamp.len(), 19);
        assert_eq!(rest, "msg");
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_stop_the_server() {
        let (port, alerts) = start_server().await;

        // Connection 1: only two delimiters, rejected by the codec
        tokio::task::spawn_blocking(move || {
            use std::io::{Read, Write};
            let mut stream = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
            stream.write_all(b"normal\0ti2\0no body field").unwrap();
            stream.shutdown(std::net::Shutdown::Write).unwrap();
            let mut scratch = [0u8; 1024];
            while stream.read(&mut scratch).unwrap() != 0 {}
        })
        .await
        .unwrap();

        // Connection 2: well-formed, must still be displayed
        send_blocking(port, Notification::new("normal", "ti2", "B", "msg")).await;

        wait_for_alerts(&alerts, 1).await;
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "B");
    }

    #[tokio::test]
    async fn test_dispatch_failure_does_not_stop_the_server() {
        struct FailingOnce {
            alerts: Arc<Mutex<Vec<Alert>>>,
        }

        impl Notifier for FailingOnce {
            fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
                let mut alerts = self.alerts.lock().unwrap();
                if alerts.is_empty() {
                    alerts.push(alert.clone());
                    return Err(NotifyError::DispatchFailed("backend hiccup".to_string()));
                }
                alerts.push(alert.clone());
                Ok(())
            }
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let notifier = Box::new(FailingOnce {
            alerts: Arc::clone(&alerts),
        });
        tokio::spawn(serve(listener, Config::default(), notifier));

        send_blocking(port, Notification::new("normal", "ti2", "first", "dropped")).await;
        send_blocking(port, Notification::new("normal", "ti2", "second", "shown")).await;

        wait_for_alerts(&alerts, 2).await;
        let alerts = alerts.lock().unwrap();
        assert_eq!(alerts[1].title, "second");
    }
}
