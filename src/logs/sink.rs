use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Immutable formatted log line
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogLine {
    /// Local wall-clock time the line was recorded
    pub recorded_at: DateTime<Local>,
    text: String,
}

impl LogLine {
    /// `[<timestamp>] <message>`
    ///
    /// `format` must already be a valid strftime string; `LogBook` checks it.
    pub fn stamped(at: DateTime<Local>, format: &str, message: &str) -> Self {
        Self {
            recorded_at: at,
            text: format!("[{}] {}", at.format(format), message),
        }
    }

    pub fn verbatim(at: DateTime<Local>, text: &str) -> Self {
        Self {
            recorded_at: at,
            text: text.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ordered log sequence, newest line first.
///
/// Unbounded unless a capacity is given, in which case the oldest lines are
/// evicted once it is exceeded.
#[derive(Clone, Debug, Default)]
pub struct LogSink {
    lines: VecDeque<LogLine>,
    max_lines: Option<usize>,
}

impl LogSink {
    pub fn new(max_lines: Option<usize>) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
        }
    }

    pub fn push(&mut self, line: LogLine) {
        self.lines.push_front(line);
        if let Some(max) = self.max_lines {
            self.lines.truncate(max);
        }
    }

    /// Lines newest-first
    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn latest(&self) -> Option<&LogLine> {
        self.lines.front()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines containing `needle`
    pub fn count_matching(&self, needle: &str) -> usize {
        self.lines
            .iter()
            .filter(|line| line.as_str().contains(needle))
            .count()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.as_str().to_string()).collect()
    }
}
