//! Sources, status readings, and persisted observations.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Text format of timestamps in the observation log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A monitored stream: a short name and the URL of its status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

impl Source {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Name with the first letter capitalized, for labels.
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Capitalize the first character of a source name.
pub fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Result of checking one status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamStatus {
    pub online: bool,
    pub listeners: u32,
}

impl StreamStatus {
    pub fn online(listeners: u32) -> Self {
        Self {
            online: true,
            listeners,
        }
    }

    /// The reading used whenever a check fails.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn label(&self) -> &'static str {
        if self.online {
            "Online"
        } else {
            "Offline"
        }
    }
}

/// One timestamped sample for one source. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub source: String,
    pub listeners: u32,
    pub online: bool,
    pub timestamp: NaiveDateTime,
}

impl Observation {
    /// Record `status` for `source`, stamped with the current local time.
    pub fn now(source: &str, status: StreamStatus) -> Self {
        Self::at(source, status, now_seconds())
    }

    pub fn at(source: &str, status: StreamStatus, timestamp: NaiveDateTime) -> Self {
        Self {
            source: source.to_string(),
            listeners: status.listeners,
            online: status.online,
            timestamp: timestamp.with_nanosecond(0).unwrap_or(timestamp),
        }
    }

    pub fn status(&self) -> StreamStatus {
        StreamStatus {
            online: self.online,
            listeners: self.listeners,
        }
    }

    /// Timestamp as stored in the log.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Current local wall-clock time truncated to whole seconds.
pub fn now_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_name() {
        assert_eq!(Source::new("tabajara", "http://x").display_name(), "Tabajara");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_observation_truncates_to_seconds() {
        let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_milli_opt(12, 30, 15, 750)
            .unwrap();
        let obs = Observation::at("tabajara", StreamStatus::online(12), ts);
        assert_eq!(obs.timestamp_text(), "2024-05-01 12:30:15");
        assert_eq!(obs.status(), StreamStatus::online(12));
    }

    #[test]
    fn test_offline_has_no_listeners() {
        let status = StreamStatus::offline();
        assert!(!status.online);
        assert_eq!(status.listeners, 0);
        assert_eq!(status.label(), "Offline");
    }
}
