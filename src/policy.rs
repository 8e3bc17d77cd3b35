//! Display policy lookups
//!
//! Maps the free-text priority and source labels carried on the wire to
//! concrete display parameters. Unknown labels fall back to defaults
//! rather than erroring: an unrecognized priority displays as normal, an
//! unrecognized source gets no icon.

use std::path::{Path, PathBuf};

/// Send priority carried in the first frame field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Normal,
    Critical,
}

impl Priority {
    /// Parse a wire label. Unrecognized labels resolve to `Normal`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "low" => Priority::Low,
            "critical" => Priority::Critical,
            _ => Priority::Normal,
        }
    }

    /// The label written to the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::Critical => "critical",
        }
    }
}

/// Three-valued display priority respected by the notification surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Normal,
    Critical,
}

/// Resolved display parameters for one notification. Derived per message,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPolicy {
    pub urgency: Urgency,
    pub timeout_ms: u32,
    pub icon: Option<PathBuf>,
}

/// Urgency and display timeout for a priority label. Low notices linger
/// for an hour, normal for eight, critical for three days.
pub fn urgency_for(priority: &str) -> (Urgency, u32) {
    match Priority::from_label(priority) {
        Priority::Low => (Urgency::Low, 3_600_000),
        Priority::Normal => (Urgency::Normal, 28_800_000),
        Priority::Critical => (Urgency::Critical, 259_200_000),
    }
}

/// Icon file for a source label, rooted at the configured icon directory.
/// Unknown sources get no icon.
pub fn icon_for(source: &str, icon_dir: &Path) -> Option<PathBuf> {
    let file = match source {
        "outlook" => "outlook.png",
        "office" => "office.png",
        "window" => "windows.png",
        "ti2" => "ti2.png",
        _ => return None,
    };
    Some(icon_dir.join(file))
}

/// Resolve the full display policy for one notification.
pub fn resolve(priority: &str, source: &str, icon_dir: &Path) -> DisplayPolicy {
    let (urgency, timeout_ms) = urgency_for(priority);
    DisplayPolicy {
        urgency,
        timeout_ms,
        icon: icon_for(source, icon_dir),
    }
}

/// Reduce an outlook message body for display: scan lines from the top,
/// skipping greeting lines (starting with "dear", any case) and blank
/// lines, then keep the first qualifying line plus the next two. A body
/// with no qualifying line passes through unchanged.
pub fn trim_outlook_body(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.to_lowercase().starts_with("dear") {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let end = lines.len().min(i + 3);
        return lines[i..end].join("\n");
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_table() {
        assert_eq!(urgency_for("low"), (Urgency::Low, 3_600_000));
        assert_eq!(urgency_for("normal"), (Urgency::Normal, 28_800_000));
        assert_eq!(urgency_for("critical"), (Urgency::Critical, 259_200_000));
    }

    #[test]
    fn test_unknown_priority_falls_back_to_normal() {
        assert_eq!(urgency_for("urgent"), urgency_for("normal"));
    }

    #[test]
    fn test_known_source_icons() {
        let dir = Path::new("/var/lib/icons");
        assert_eq!(
            icon_for("outlook", dir),
            Some(PathBuf::from("/var/lib/icons/outlook.png"))
        );
        assert_eq!(
            icon_for("window", dir),
            Some(PathBuf::from("/var/lib/icons/windows.png"))
        );
    }

    #[test]
    fn test_unknown_source_has_no_icon() {
        let dir = Path::new("/var/lib/icons");
        assert_eq!(icon_for("unknownapp", dir), None);
        assert_eq!(icon_for("default", dir), None);
    }

    #[test]
    fn test_trim_skips_greeting_and_blank_lines() {
        let body = "Dear Team,\n\nMeeting moved to 3pm\nBring laptops\nRoom changed";
        assert_eq!(
            trim_outlook_body(body),
            "Meeting moved to 3pm\nBring laptops\nRoom changed"
        );
    }

    #[test]
    fn test_trim_caps_at_three_lines() {
        let body = "dear all,\nfirst\nsecond\nthird\nfourth";
        assert_eq!(trim_outlook_body(body), "first\nsecond\nthird");
    }

    #[test]
    fn test_trim_short_body() {
        assert_eq!(trim_outlook_body("just one line"), "just one line");
    }

    #[test]
    fn test_trim_leaves_unqualifying_body_unmodified() {
        assert_eq!(trim_outlook_body(""), "");
        assert_eq!(trim_outlook_body("Dear Bob,\n\n  \n"), "Dear Bob,\n\n  \n");
    }
}
