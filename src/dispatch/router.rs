use crate::config::PitchsyncConfig;
use crate::event::{
    output_line, parse_list, parse_status_flag, Agent, Ball, ChannelEvent, EventKind, Pose,
    Trajectory,
};
use crate::logs::LogChannel;
use crate::referee::{RefereeFilter, RefereeLine};
use crate::state::{IngestMetrics, StateStore, StatusFlag, Team};
use crate::watchdog::{Transition, WatchdogSet, WatchedSource};
use chrono::{Local, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Routes channel events to the store, the watchdogs and the referee filter.
///
/// Every call runs to completion before the next one; the caller is the
/// only writer.
pub struct Dispatcher {
    store: StateStore,
    watchdogs: WatchdogSet,
    referee: RefereeFilter,
    metrics: IngestMetrics,
}

impl Dispatcher {
    pub fn new(config: &PitchsyncConfig) -> Self {
        Self {
            store: StateStore::new(&config.store, &config.logs),
            watchdogs: WatchdogSet::from_config(&config.watchdog),
            referee: RefereeFilter::new(),
            metrics: IngestMetrics::new(),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn watchdogs(&self) -> &WatchdogSet {
        &self.watchdogs
    }

    pub fn metrics(&self) -> &IngestMetrics {
        &self.metrics
    }

    pub fn into_store(self) -> StateStore {
        self.store
    }

    /// Earliest pending watchdog deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.watchdogs.next_deadline()
    }

    /// Apply one channel event received at `now`.
    ///
    /// Countdowns that elapsed before `now` fire first, so an event handled
    /// late still reports the `Live -> Stale` edge it arrived after.
    pub fn dispatch(&mut self, event: ChannelEvent, now: Instant) {
        self.expire_watchdogs(now);

        match event {
            ChannelEvent::Connected => {
                self.metrics.record_event("connect", true, Utc::now());
                self.on_connect();
            }
            ChannelEvent::Disconnected => {
                self.metrics.record_event("disconnect", true, Utc::now());
                self.on_disconnect();
            }
            ChannelEvent::Message { name, payload } => {
                let kind = EventKind::from_name(&name);
                self.metrics.record_event(&name, kind.is_some(), Utc::now());
                match kind {
                    Some(kind) => self.on_message(kind, &payload, now),
                    None => debug!(event = %name, "Ignoring unknown event"),
                }
            }
        }
    }

    /// Fire watchdog countdowns that elapsed by `now`
    pub fn expire_watchdogs(&mut self, now: Instant) {
        for (source, transition) in self.watchdogs.expire_due(now) {
            self.apply_transition(source, transition);
        }
    }

    fn on_connect(&mut self) {
        info!("Connected to state server");
        self.store.set_status_flag(StatusFlag::Gui, true);
        self.store
            .append_log(LogChannel::Communication, Local::now(), "Connection established.");
    }

    fn on_disconnect(&mut self) {
        warn!("Disconnected from state server");
        self.watchdogs.cancel_all();
        self.store.reset_status_on_disconnect();
        self.store
            .append_log(LogChannel::Communication, Local::now(), "Connection lost.");
    }

    fn on_message(&mut self, kind: EventKind, payload: &Value, now: Instant) {
        match kind {
            EventKind::SystemStatus => match payload.as_object() {
                Some(partial) => self.store.merge_status(partial),
                None => warn!("system_status payload is not an object, skipping"),
            },
            EventKind::VisionUpdate => {
                self.store
                    .apply_agents_update(Team::Yellow, parse_list::<Agent>(payload, "yellow"));
                self.store
                    .apply_agents_update(Team::Blue, parse_list::<Agent>(payload, "blue"));
                self.store.apply_objects_update(parse_list::<Ball>(payload, "balls"));
            }
            EventKind::TrajectoryUpdate => {
                self.store
                    .apply_trajectory_update(parse_list::<Trajectory>(payload, "trajectories"));
            }
            EventKind::RefereeUpdate => self.on_referee_update(payload),
            EventKind::RefereeStatus => self.on_referee_status(payload),
            EventKind::VisionStatus => self.on_status_flag(StatusFlag::Vision, kind, payload),
            EventKind::CommunicationStatus => {
                self.on_status_flag(StatusFlag::Control, kind, payload)
            }
            EventKind::VisionOutput => self.on_output(LogChannel::Vision, payload),
            EventKind::CommunicationOutput => self.on_output(LogChannel::Communication, payload),
            EventKind::RefereeOutput => self.on_output(LogChannel::Referee, payload),
            EventKind::VisionMsg => debug!(payload = %payload, "vision_msg"),
            EventKind::Position => match Pose::deserialize(payload) {
                Ok(pose) => self.store.set_position(pose),
                Err(e) => warn!(error = %e, "Malformed position payload, skipping"),
            },
        }

        // Watchdogs see the event after the store has applied it
        for (source, transition) in self.watchdogs.on_event(kind, now) {
            self.apply_transition(source, transition);
        }
    }

    fn on_referee_update(&mut self, payload: &Value) {
        let Some(line) = self.referee.offer(payload) else {
            return;
        };
        if matches!(line, RefereeLine::Raw(_)) {
            debug!("Referee update logged as raw payload");
        }
        self.store
            .append_log(LogChannel::Referee, Local::now(), line.as_str());
    }

    fn on_referee_status(&mut self, payload: &Value) {
        let Some(online) = parse_status_flag(payload) else {
            warn!(payload = %payload, "Malformed refereeStatus payload, skipping");
            return;
        };
        if self.store.set_status_flag(StatusFlag::Strategy, online) {
            let message = if online {
                "Referee service online."
            } else {
                "Referee service offline."
            };
            self.store.append_log(LogChannel::Referee, Local::now(), message);
        }
    }

    fn on_status_flag(&mut self, flag: StatusFlag, kind: EventKind, payload: &Value) {
        match parse_status_flag(payload) {
            Some(value) => {
                self.store.set_status_flag(flag, value);
            }
            None => warn!(event = kind.as_str(), "Malformed status payload, skipping"),
        }
    }

    fn on_output(&mut self, channel: LogChannel, payload: &Value) {
        if let Some(line) = output_line(payload) {
            self.store.append_log_verbatim(channel, Local::now(), line);
        }
        self.store.set_last_output(channel, payload.clone());
    }

    fn apply_transition(&mut self, source: WatchedSource, transition: Transition) {
        let live = transition == Transition::BecameLive;
        self.store.set_status_flag(source.status_flag(), live);

        let message = match transition {
            Transition::BecameLive => format!("{} connected.", source.label()),
            Transition::WentStale => {
                let timeout_ms = self
                    .watchdogs
                    .get(source)
                    .map(|w| w.timeout().as_millis())
                    .unwrap_or_default();
                format!("{} disconnected (no data for {} ms).", source.label(), timeout_ms)
            }
        };
        self.store.append_log(source.log_channel(), Local::now(), &message);
    }
}
