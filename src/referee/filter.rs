use super::format::{render_raw_line, render_referee_line};
use serde_json::Value;
use tracing::debug;

/// Dedup key of the referee stream: the last accepted `(command, command_counter)`.
///
/// Absent and explicit-null fields are both stored as `None`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RefereeSnapshot {
    pub command: Option<Value>,
    pub command_counter: Option<Value>,
}

impl RefereeSnapshot {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            command: field(payload, "command"),
            command_counter: field(payload, "command_counter"),
        }
    }
}

fn field(payload: &Value, key: &str) -> Option<Value> {
    payload.get(key).filter(|v| !v.is_null()).cloned()
}

/// Line produced by an accepted snapshot
#[derive(Clone, Debug, PartialEq)]
pub enum RefereeLine {
    /// Normal rendering
    Formatted(String),
    /// Rendering failed; raw payload dump
    Raw(String),
}

impl RefereeLine {
    pub fn as_str(&self) -> &str {
        match self {
            RefereeLine::Formatted(s) | RefereeLine::Raw(s) => s,
        }
    }
}

/// Suppresses referee updates whose command and counter both match the last
/// accepted one.
#[derive(Debug, Default)]
pub struct RefereeFilter {
    /// Starts all-null, so a first payload without command or counter is
    /// suppressed like any other repeat
    last_accepted: RefereeSnapshot,
}

impl RefereeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_accepted(&self) -> &RefereeSnapshot {
        &self.last_accepted
    }

    /// Offer an incoming payload.
    ///
    /// Accepted when the command or the counter differs from the last accepted
    /// snapshot (either alone is enough).
    /// Returns the line to log, or `None` when suppressed. Rendering failures
    /// never propagate: they degrade to a raw dump.
    pub fn offer(&mut self, payload: &Value) -> Option<RefereeLine> {
        let incoming = RefereeSnapshot::from_payload(payload);

        if self.last_accepted == incoming {
            return None;
        }
        self.last_accepted = incoming;

        let line = match render_referee_line(payload) {
            Ok(line) => RefereeLine::Formatted(line),
            Err(e) => {
                debug!(error = %e, payload = %payload, "Referee line rendering failed, logging raw payload");
                RefereeLine::Raw(render_raw_line(payload))
            }
        };
        Some(line)
    }
}
