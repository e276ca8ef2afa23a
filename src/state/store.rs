use crate::config::{LogsConfig, StoreConfig};
use crate::event::{Agent, Ball, Pose, Trajectory};
use crate::logs::{LogBook, LogChannel, LogSink};
use crate::state::entity::{StatusFlag, StoreChange, StoreSnapshot, SystemStatus, Team};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::debug;

/// Derived state store: one container per tracked quantity.
///
/// Owned by a single writer (the session). Every mutation runs to completion
/// before the next one starts, so readers never observe a torn update.
/// Observers learn about changes through `subscribe()` and re-read.
pub struct StateStore {
    yellow: Vec<Agent>,
    blue: Vec<Agent>,
    balls: Vec<Ball>,

    /// Rebuilt wholesale on every trajectory update
    trajectories: BTreeMap<i64, Trajectory>,

    status: SystemStatus,
    position: Pose,

    /// Last raw payload of each `*Output` event
    last_output: BTreeMap<LogChannel, Value>,

    logs: LogBook,

    /// Broadcast channel for change notifications
    changes: broadcast::Sender<StoreChange>,
}

impl StateStore {
    pub fn new(store_config: &StoreConfig, logs_config: &LogsConfig) -> Self {
        let (changes, _) = broadcast::channel(store_config.change_buffer.max(1));

        Self {
            yellow: Vec::new(),
            blue: Vec::new(),
            balls: Vec::new(),
            trajectories: BTreeMap::new(),
            status: SystemStatus::default(),
            position: Pose::default(),
            last_output: BTreeMap::new(),
            logs: LogBook::new(logs_config),
            changes,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    fn notify(&self, change: StoreChange) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }

    /// Replace the team's agent list, preserving payload order
    pub fn apply_agents_update(&mut self, team: Team, agents: Vec<Agent>) {
        let slot = match team {
            Team::Yellow => &mut self.yellow,
            Team::Blue => &mut self.blue,
        };
        *slot = agents;
        self.notify(StoreChange::Agents(team));
    }

    /// Replace the ball list
    pub fn apply_objects_update(&mut self, balls: Vec<Ball>) {
        self.balls = balls;
        self.notify(StoreChange::Objects);
    }

    /// Clear the trajectory map and rebuild it from `entries`.
    ///
    /// After this call the key set is exactly the set of robot ids in
    /// `entries`; an empty list leaves the map empty.
    pub fn apply_trajectory_update(&mut self, entries: Vec<Trajectory>) {
        self.trajectories.clear();
        for entry in entries {
            self.trajectories.insert(entry.robot_id, entry);
        }
        debug!(count = self.trajectories.len(), "Trajectories rebuilt");
        self.notify(StoreChange::Trajectories);
    }

    /// Merge a partial status record
    pub fn merge_status(&mut self, partial: &Map<String, Value>) {
        if self.status.merge(partial) > 0 {
            self.notify(StoreChange::Status);
        }
    }

    /// Set one status flag; returns true if it changed
    pub fn set_status_flag(&mut self, flag: StatusFlag, value: bool) -> bool {
        let changed = self.status.set(flag, value);
        if changed {
            self.notify(StoreChange::Status);
        }
        changed
    }

    pub fn reset_status_on_disconnect(&mut self) {
        self.status.reset_on_disconnect();
        self.notify(StoreChange::Status);
    }

    pub fn set_position(&mut self, pose: Pose) {
        self.position = pose;
        self.notify(StoreChange::Position);
    }

    pub fn set_last_output(&mut self, channel: LogChannel, payload: Value) {
        self.last_output.insert(channel, payload);
        self.notify(StoreChange::Output(channel));
    }

    /// Prepend a timestamp-prefixed line to a log sequence
    pub fn append_log(&mut self, channel: LogChannel, at: DateTime<Local>, message: &str) {
        self.logs.stamp(channel, at, message);
        self.notify(StoreChange::Log(channel));
    }

    /// Prepend a pre-formatted line to a log sequence
    pub fn append_log_verbatim(&mut self, channel: LogChannel, at: DateTime<Local>, line: &str) {
        self.logs.push_verbatim(channel, at, line);
        self.notify(StoreChange::Log(channel));
    }

    pub fn agents(&self, team: Team) -> &[Agent] {
        match team {
            Team::Yellow => &self.yellow,
            Team::Blue => &self.blue,
        }
    }

    pub fn objects(&self) -> &[Ball] {
        &self.balls
    }

    pub fn trajectories(&self) -> &BTreeMap<i64, Trajectory> {
        &self.trajectories
    }

    pub fn status(&self) -> &SystemStatus {
        &self.status
    }

    pub fn position(&self) -> &Pose {
        &self.position
    }

    pub fn last_output(&self, channel: LogChannel) -> Option<&Value> {
        self.last_output.get(&channel)
    }

    pub fn logs(&self, channel: LogChannel) -> &LogSink {
        self.logs.sink(channel)
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            yellow: self.yellow.clone(),
            blue: self.blue.clone(),
            balls: self.balls.clone(),
            trajectories: self.trajectories.clone(),
            status: self.status.clone(),
            position: self.position.clone(),
            last_output: self.last_output.clone(),
            logs: LogChannel::ALL
                .iter()
                .map(|channel| (*channel, self.logs.sink(*channel).to_vec()))
                .collect(),
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default(), &LogsConfig::default())
    }
}
