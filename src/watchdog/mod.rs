// Liveness watchdogs (edge-triggered LIVE/STALE state machines)

mod timer;

pub use timer::DeadlineTimer;

use crate::config::WatchdogConfig;
use crate::event::EventKind;
use crate::logs::LogChannel;
use crate::state::StatusFlag;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Liveness of one monitored source
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    Live,
    Stale,
}

/// Edge reported by a watchdog; self-transitions are never reported
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    BecameLive,
    WentStale,
}

/// Sources that can be monitored by a watchdog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WatchedSource {
    Vision,
    Referee,
}

impl WatchedSource {
    /// Event that resets this source's watchdog
    pub fn qualifying_event(&self) -> EventKind {
        match self {
            WatchedSource::Vision => EventKind::VisionUpdate,
            WatchedSource::Referee => EventKind::RefereeUpdate,
        }
    }

    /// Status flag driven by this watchdog
    pub fn status_flag(&self) -> StatusFlag {
        match self {
            WatchedSource::Vision => StatusFlag::Vision,
            WatchedSource::Referee => StatusFlag::Strategy,
        }
    }

    /// Log sequence receiving transition lines
    pub fn log_channel(&self) -> LogChannel {
        match self {
            WatchedSource::Vision => LogChannel::Vision,
            WatchedSource::Referee => LogChannel::Referee,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WatchedSource::Vision => "Vision feed",
            WatchedSource::Referee => "Referee feed",
        }
    }
}

/// Per-source liveness state machine.
///
/// Starts `Stale`. A qualifying event restarts the countdown and moves to
/// `Live`; the countdown elapsing moves back to `Stale`. Only the edges are
/// reported to the caller.
#[derive(Debug)]
pub struct Watchdog {
    source: WatchedSource,
    timeout: Duration,
    state: Liveness,
    timer: DeadlineTimer,
}

impl Watchdog {
    pub fn new(source: WatchedSource, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            state: Liveness::Stale,
            timer: DeadlineTimer::new(),
        }
    }

    pub fn source(&self) -> WatchedSource {
        self.source
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> Liveness {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Feed a qualifying event received at `now`.
    ///
    /// Reschedules the countdown (replacing any pending one) and returns
    /// `BecameLive` only on the `Stale -> Live` edge.
    pub fn on_qualifying_event(&mut self, now: Instant) -> Option<Transition> {
        self.timer.schedule(now + self.timeout);

        match self.state {
            Liveness::Live => None,
            Liveness::Stale => {
                self.state = Liveness::Live;
                info!(source = ?self.source, "Source became live");
                Some(Transition::BecameLive)
            }
        }
    }

    /// Fire the countdown if it elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<Transition> {
        if !self.timer.take_if_due(now) {
            return None;
        }

        match self.state {
            Liveness::Live => {
                self.state = Liveness::Stale;
                warn!(
                    source = ?self.source,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Source went stale"
                );
                Some(Transition::WentStale)
            }
            // A pending timer only exists while live
            Liveness::Stale => None,
        }
    }

    /// Drop any pending countdown and force `Stale` without reporting an edge
    pub fn cancel(&mut self) {
        if self.timer.cancel() {
            debug!(source = ?self.source, "Watchdog timer cancelled");
        }
        self.state = Liveness::Stale;
    }
}

/// All watchdogs of a session
#[derive(Debug, Default)]
pub struct WatchdogSet {
    watchdogs: Vec<Watchdog>,
}

impl WatchdogSet {
    pub fn new(watchdogs: Vec<Watchdog>) -> Self {
        Self { watchdogs }
    }

    /// Vision watchdog always; referee watchdog when a timeout is configured
    pub fn from_config(config: &WatchdogConfig) -> Self {
        let mut watchdogs = vec![Watchdog::new(WatchedSource::Vision, config.vision_timeout())];
        if let Some(timeout) = config.referee_timeout() {
            watchdogs.push(Watchdog::new(WatchedSource::Referee, timeout));
        }
        Self::new(watchdogs)
    }

    pub fn get(&self, source: WatchedSource) -> Option<&Watchdog> {
        self.watchdogs.iter().find(|w| w.source == source)
    }

    /// Feed an event to every watchdog it qualifies for
    pub fn on_event(&mut self, kind: EventKind, now: Instant) -> Vec<(WatchedSource, Transition)> {
        self.watchdogs
            .iter_mut()
            .filter(|w| w.source.qualifying_event() == kind)
            .filter_map(|w| w.on_qualifying_event(now).map(|t| (w.source, t)))
            .collect()
    }

    /// Earliest pending deadline across all watchdogs
    pub fn next_deadline(&self) -> Option<Instant> {
        self.watchdogs.iter().filter_map(Watchdog::deadline).min()
    }

    /// Fire every countdown that elapsed by `now`
    pub fn expire_due(&mut self, now: Instant) -> Vec<(WatchedSource, Transition)> {
        self.watchdogs
            .iter_mut()
            .filter_map(|w| w.poll(now).map(|t| (w.source, t)))
            .collect()
    }

    pub fn cancel_all(&mut self) {
        for watchdog in &mut self.watchdogs {
            watchdog.cancel();
        }
    }
}
