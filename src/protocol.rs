//! Wire format for notification frames
//!
//! A frame is the four notification fields joined by a single reserved
//! delimiter byte in fixed order: priority, source, title, body. There is
//! no length prefix; message end is the transport-level end-of-stream
//! signal from the sender's half-close.

use thiserror::Error;

/// Reserved field delimiter (NUL). Fields must not contain this byte;
/// encoding does not escape it.
pub const DELIMITER: u8 = 0x00;

/// Codec error types
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed frame: expected 3 delimiters, found {0}")]
    MalformedFrame(usize),
}

/// One notification in transit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Priority label ("low", "normal", "critical"); resolved to display
    /// parameters on the receiving side, unknown labels fall back there
    pub priority: String,
    /// Label of the originating application (e.g. "outlook", "ti2")
    pub source: String,
    /// Single-line summary
    pub title: String,
    /// Message text, may span multiple lines
    pub body: String,
}

impl Notification {
    pub fn new(priority: &str, source: &str, title: &str, body: &str) -> Self {
        Self {
            priority: priority.to_string(),
            source: source.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}

/// Encode a notification as a delimiter-joined frame.
pub fn encode(notification: &Notification) -> Vec<u8> {
    let mut frame = Vec::with_capacity(
        notification.priority.len()
            + notification.source.len()
            + notification.title.len()
            + notification.body.len()
            + 3,
    );
    frame.extend_from_slice(notification.priority.as_bytes());
    frame.push(DELIMITER);
    frame.extend_from_slice(notification.source.as_bytes());
    frame.push(DELIMITER);
    frame.extend_from_slice(notification.title.as_bytes());
    frame.push(DELIMITER);
    frame.extend_from_slice(notification.body.as_bytes());
    frame
}

/// Decode a frame received from the wire.
///
/// The frame must contain exactly three delimiter bytes, yielding the four
/// fields in order. Field text is decoded from UTF-8 best-effort: invalid
/// sequences become replacement characters instead of failing the frame.
pub fn decode(frame: &[u8]) -> Result<Notification, ProtocolError> {
    let delimiters = frame.iter().filter(|&&b| b == DELIMITER).count();
    if delimiters != 3 {
        return Err(ProtocolError::MalformedFrame(delimiters));
    }

    let mut fields = frame
        .split(|&b| b == DELIMITER)
        .map(|field| String::from_utf8_lossy(field).into_owned());

    Ok(Notification {
        priority: fields.next().unwrap_or_default(),
        source: fields.next().unwrap_or_default(),
        title: fields.next().unwrap_or_default(),
        body: fields.next().unwrap_or_default(),
    })
}
