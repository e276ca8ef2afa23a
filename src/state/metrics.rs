use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Width of the sliding window used for the event rate (ms)
const RATE_WINDOW_MS: i64 = 5000;

/// Per-event key shared by every unrecognized event name
pub const UNKNOWN_EVENT_KEY: &str = "<unknown>";

/// Ingestion counters for one session
#[derive(Clone, Debug, Default)]
pub struct IngestMetrics {
    /// Total events received (known and unknown)
    total_events: u64,

    /// Per event name counts; unknown names are pooled under `UNKNOWN_EVENT_KEY`
    per_event: BTreeMap<String, u64>,

    /// Events with a name no handler knows
    unknown_events: u64,

    /// Event timestamps for rate calculation (sliding 5-second window)
    event_timestamps: VecDeque<i64>,

    last_event_at: Option<DateTime<Utc>>,
}

impl IngestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event
    pub fn record_event(&mut self, name: &str, known: bool, at: DateTime<Utc>) {
        self.total_events += 1;
        let key = if known { name } else { UNKNOWN_EVENT_KEY };
        *self.per_event.entry(key.to_string()).or_insert(0) += 1;
        if !known {
            self.unknown_events += 1;
        }

        let now = at.timestamp_millis();
        self.event_timestamps.push_back(now);
        self.prune(now);
        self.last_event_at = Some(at);
    }

    fn prune(&mut self, now: i64) {
        while let Some(&oldest) = self.event_timestamps.front() {
            if now - oldest > RATE_WINDOW_MS {
                self.event_timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Events per second over the last 5 seconds
    pub fn event_rate(&self) -> f64 {
        self.event_timestamps.len() as f64 / (RATE_WINDOW_MS as f64 / 1000.0)
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn unknown_events(&self) -> u64 {
        self.unknown_events
    }

    pub fn count(&self, name: &str) -> u64 {
        self.per_event.get(name).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_events: self.total_events,
            unknown_events: self.unknown_events,
            event_rate: self.event_rate(),
            per_event: self.per_event.clone(),
            last_event_at: self.last_event_at,
        }
    }
}

/// Snapshot of ingestion metrics at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_events: u64,
    pub unknown_events: u64,
    pub event_rate: f64,
    pub per_event: BTreeMap<String, u64>,
    pub last_event_at: Option<DateTime<Utc>>,
}
