// Per-subsystem log sequences (newest-first)

mod sink;

pub use sink::{LogLine, LogSink};

use crate::config::LogsConfig;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Logical subsystem a log line belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChannel {
    Vision,
    Communication,
    Referee,
}

impl LogChannel {
    pub const ALL: [LogChannel; 3] = [
        LogChannel::Vision,
        LogChannel::Communication,
        LogChannel::Referee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogChannel::Vision => "vision",
            LogChannel::Communication => "communication",
            LogChannel::Referee => "referee",
        }
    }
}

/// The three independent log sequences
#[derive(Clone, Debug)]
pub struct LogBook {
    vision: LogSink,
    communication: LogSink,
    referee: LogSink,
    timestamp_format: String,
}

impl LogBook {
    pub fn new(config: &LogsConfig) -> Self {
        let timestamp_format = if is_valid_format(&config.timestamp_format) {
            config.timestamp_format.clone()
        } else {
            warn!(
                format = %config.timestamp_format,
                "Invalid log timestamp format, using default"
            );
            DEFAULT_TIMESTAMP_FORMAT.to_string()
        };

        Self {
            vision: LogSink::new(config.max_lines),
            communication: LogSink::new(config.max_lines),
            referee: LogSink::new(config.max_lines),
            timestamp_format,
        }
    }

    pub fn sink(&self, channel: LogChannel) -> &LogSink {
        match channel {
            LogChannel::Vision => &self.vision,
            LogChannel::Communication => &self.communication,
            LogChannel::Referee => &self.referee,
        }
    }

    fn sink_mut(&mut self, channel: LogChannel) -> &mut LogSink {
        match channel {
            LogChannel::Vision => &mut self.vision,
            LogChannel::Communication => &mut self.communication,
            LogChannel::Referee => &mut self.referee,
        }
    }

    /// Prepend a line prefixed with `[timestamp]`
    pub fn stamp(&mut self, channel: LogChannel, at: DateTime<Local>, message: &str) {
        let line = LogLine::stamped(at, &self.timestamp_format, message);
        self.sink_mut(channel).push(line);
    }

    /// Prepend a line exactly as received (already formatted upstream)
    pub fn push_verbatim(&mut self, channel: LogChannel, at: DateTime<Local>, text: &str) {
        self.sink_mut(channel).push(LogLine::verbatim(at, text));
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }
}

impl Default for LogBook {
    fn default() -> Self {
        Self::new(&LogsConfig::default())
    }
}

/// Reject strftime strings that would fail at render time
fn is_valid_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_stamp_prefixes_timestamp() {
        let mut book = LogBook::default();
        book.stamp(LogChannel::Communication, at(9, 5, 7), "Connection established.");

        let sink = book.sink(LogChannel::Communication);
        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink.latest().unwrap().as_str(),
            "[09:05:07] Connection established."
        );
    }

    #[test]
    fn test_channels_are_independent() {
        let mut book = LogBook::default();
        book.push_verbatim(LogChannel::Vision, at(10, 0, 0), "v1");
        book.push_verbatim(LogChannel::Referee, at(10, 0, 1), "r1");
        book.push_verbatim(LogChannel::Referee, at(10, 0, 2), "r2");

        assert_eq!(book.sink(LogChannel::Vision).len(), 1);
        assert_eq!(book.sink(LogChannel::Communication).len(), 0);
        assert_eq!(book.sink(LogChannel::Referee).len(), 2);
        assert_eq!(book.sink(LogChannel::Referee).latest().unwrap().as_str(), "r2");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let config = LogsConfig {
            max_lines: None,
            timestamp_format: "%Q broken".to_string(),
        };
        let mut book = LogBook::new(&config);
        assert_eq!(book.timestamp_format(), DEFAULT_TIMESTAMP_FORMAT);

        book.stamp(LogChannel::Vision, at(23, 59, 1), "ok");
        assert_eq!(book.sink(LogChannel::Vision).latest().unwrap().as_str(), "[23:59:01] ok");
    }

    #[test]
    fn test_custom_format() {
        let config = LogsConfig {
            max_lines: None,
            timestamp_format: "%H:%M".to_string(),
        };
        let mut book = LogBook::new(&config);
        book.stamp(LogChannel::Vision, at(8, 30, 59), "tick");
        assert_eq!(book.sink(LogChannel::Vision).latest().unwrap().as_str(), "[08:30] tick");
    }
}
