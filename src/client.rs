//! Client for sending one notification to the receiving host

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use thiserror::Error;

use crate::policy::Priority;
use crate::protocol::{self, Notification};

/// Client-side connection errors
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Neither the canonical nor the alternate port accepted the connection
    #[error("cannot reach {host} on ports {primary} and {alternate}")]
    Unreachable {
        host: String,
        primary: u16,
        alternate: u16,
    },
    #[error("i/o error while sending notification")]
    Io(#[from] std::io::Error),
}

/// Resolve the send priority from the three mutually-exclusive CLI flags.
/// Default is normal; if several flags are set, critical overrides normal
/// overrides low.
pub fn resolve_priority(low: bool, normal: bool, critical: bool) -> Priority {
    let mut priority = Priority::Normal;
    if low {
        priority = Priority::Low;
    }
    if normal {
        priority = Priority::Normal;
    }
    if critical {
        priority = Priority::Critical;
    }
    priority
}

/// Send one notification to `host:port`.
///
/// A failed connection is retried once against `port + 1`, the convention
/// for hosts where the canonical port is held by an SSH tunnel endpoint.
/// After writing the frame the client half-closes, then drains the
/// connection to end-of-stream so it never tears the stream down while the
/// receiver is still mid-read.
///
/// No timeout is placed on connect, write, or drain.
pub fn send(host: &str, port: u16, notification: &Notification) -> Result<(), ConnectError> {
    let mut stream = connect(host, port)?;

    stream.write_all(&protocol::encode(notification))?;
    stream.shutdown(Shutdown::Write)?; // indicate finished

    // Spin until the remote side is also finished
    let mut scratch = [0u8; 1024];
    while stream.read(&mut scratch)? != 0 {}

    Ok(())
}

fn connect(host: &str, port: u16) -> Result<TcpStream, ConnectError> {
    match TcpStream::connect((host, port)) {
        Ok(stream) => Ok(stream),
        Err(e) => {
            tracing::debug!(
                "Connection to {}:{} failed ({}), trying alternate port",
                host,
                port,
                e
            );
            TcpStream::connect((host, port + 1)).map_err(|_| ConnectError::Unreachable {
                host: host.to_string(),
                primary: port,
                alternate: port + 1,
            })
        }
    }
}
