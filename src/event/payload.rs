use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Robot as reported by the vision feed.
///
/// Team membership is carried by the container the agent is stored in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Orientation in radians
    #[serde(default, alias = "orientation", alias = "theta")]
    pub angle: f64,
}

/// Ball position
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Single-robot pose from the legacy `position` event
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub angle: f64,
}

/// One sample of a planned trajectory
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    /// Offset from the start of the trajectory, in seconds
    #[serde(default, alias = "time")]
    pub t: f64,
}

/// Planned trajectory for one robot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub robot_id: i64,
    #[serde(default)]
    pub points: Vec<TrajectoryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
}

/// Parse `payload[field]` as a list of `T`.
///
/// A missing or non-array field yields an empty list. Elements that fail to
/// deserialize are skipped so one bad entry cannot discard the whole update.
pub fn parse_list<T: DeserializeOwned>(payload: &Value, field: &str) -> Vec<T> {
    let Some(items) = payload.get(field).and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(field = %field, error = %e, "Skipping malformed list element");
                None
            }
        })
        .collect()
}

/// Extract a liveness flag from either a bare boolean or `{status: bool}`.
pub fn parse_status_flag(payload: &Value) -> Option<bool> {
    match payload {
        Value::Bool(b) => Some(*b),
        Value::Object(map) => map.get("status").and_then(Value::as_bool),
        _ => None,
    }
}

/// Extract the optional `line` of an output event
pub fn output_line(payload: &Value) -> Option<&str> {
    payload
        .get("line")
        .and_then(Value::as_str)
        .filter(|line| !line.is_empty())
}
