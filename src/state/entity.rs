use crate::event::{Agent, Ball, Pose, Trajectory};
use crate::logs::LogChannel;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Team colour; each has its own agent container
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Yellow,
    Blue,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Yellow => "yellow",
            Team::Blue => "blue",
        }
    }
}

/// Named liveness flags tracked by `SystemStatus`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusFlag {
    /// Local link to the state server
    Gui,
    /// Vision feed
    Vision,
    /// Strategy / referee service
    Strategy,
    /// Control (communication) service
    Control,
}

impl StatusFlag {
    pub const REMOTE: [StatusFlag; 3] = [StatusFlag::Vision, StatusFlag::Strategy, StatusFlag::Control];

    /// Map a status record key to a flag
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gui" => Some(StatusFlag::Gui),
            "vision" => Some(StatusFlag::Vision),
            "strategy" | "referee" => Some(StatusFlag::Strategy),
            "control" | "communication" => Some(StatusFlag::Control),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFlag::Gui => "gui",
            StatusFlag::Vision => "vision",
            StatusFlag::Strategy => "strategy",
            StatusFlag::Control => "control",
        }
    }
}

/// Flat record of boolean liveness flags.
///
/// Keys outside the known set are kept in `extra` and never touched by the
/// disconnect reset.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SystemStatus {
    pub gui: bool,
    pub vision: bool,
    pub strategy: bool,
    pub control: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, bool>,
}

impl SystemStatus {
    pub fn get(&self, flag: StatusFlag) -> bool {
        match flag {
            StatusFlag::Gui => self.gui,
            StatusFlag::Vision => self.vision,
            StatusFlag::Strategy => self.strategy,
            StatusFlag::Control => self.control,
        }
    }

    /// Set a flag; returns true if the value changed
    pub fn set(&mut self, flag: StatusFlag, value: bool) -> bool {
        let slot = match flag {
            StatusFlag::Gui => &mut self.gui,
            StatusFlag::Vision => &mut self.vision,
            StatusFlag::Strategy => &mut self.strategy,
            StatusFlag::Control => &mut self.control,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }

    /// Overwrite every flag present in `partial`; absent keys stay untouched.
    ///
    /// Non-boolean values are skipped. Returns the number of keys applied.
    pub fn merge(&mut self, partial: &Map<String, Value>) -> usize {
        let mut applied = 0;
        for (key, value) in partial {
            let Some(value) = value.as_bool() else {
                warn!(key = %key, "Ignoring non-boolean status value");
                continue;
            };
            match StatusFlag::from_key(key) {
                Some(flag) => {
                    self.set(flag, value);
                }
                None => {
                    self.extra.insert(key.clone(), value);
                }
            }
            applied += 1;
        }
        applied
    }

    /// Local link and every remote flag go false; `extra` is left as is.
    pub fn reset_on_disconnect(&mut self) {
        self.gui = false;
        for flag in StatusFlag::REMOTE {
            self.set(flag, false);
        }
    }
}

/// Notification published after a container was fully updated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreChange {
    Agents(Team),
    Objects,
    Trajectories,
    Status,
    Position,
    Output(LogChannel),
    Log(LogChannel),
}

/// Deep copy of every container
#[derive(Clone, Debug, Serialize)]
pub struct StoreSnapshot {
    pub yellow: Vec<Agent>,
    pub blue: Vec<Agent>,
    pub balls: Vec<Ball>,
    pub trajectories: BTreeMap<i64, Trajectory>,
    pub status: SystemStatus,
    pub position: Pose,
    pub last_output: BTreeMap<LogChannel, Value>,
    pub logs: BTreeMap<LogChannel, Vec<String>>,
}
