use serde_json::{Map, Value};
use std::fmt;

const STAGE_TIME_KEYS: [&str; 2] = ["stage_time_left", "stage_time_remaining"];
const ACTION_TIME_KEYS: [&str; 2] = ["current_action_time_remaining", "action_time_remaining"];

/// Referee line rendering errors
#[derive(Debug)]
pub enum FormatError {
    PayloadNotObject,
    UnexpectedType { field: String },
    InvalidTeams,
    Serialize(serde_json::Error),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::PayloadNotObject => write!(f, "referee payload must be a JSON object"),
            FormatError::UnexpectedType { field } => {
                write!(f, "field '{}' has a type that cannot be rendered", field)
            }
            FormatError::InvalidTeams => write!(f, "teams must be an array or an object"),
            FormatError::Serialize(e) => write!(f, "failed to serialize teams: {}", e),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        FormatError::Serialize(e)
    }
}

/// Render a referee snapshot as one log line (without timestamp).
///
/// Format: `stage=<stage> [stage_time_left=..] [command=..] [counter=..]
/// [action_time_left=..] [| teams: A(1), B(0)]`. Optional fields are only
/// rendered when present. A roster that cannot be rendered compactly is
/// dumped as raw JSON instead.
pub fn render_referee_line(payload: &Value) -> Result<String, FormatError> {
    let map = payload.as_object().ok_or(FormatError::PayloadNotObject)?;

    let stage = match present(map, "stage") {
        Some(v) => scalar_text("stage", v)?,
        None => "unknown".to_string(),
    };
    let mut parts = vec![format!("stage={}", stage)];

    if let Some((key, v)) = first_present(map, &STAGE_TIME_KEYS) {
        parts.push(format!("stage_time_left={}", scalar_text(key, v)?));
    }
    if let Some(v) = present(map, "command") {
        parts.push(format!("command={}", scalar_text("command", v)?));
    }
    if let Some(v) = present(map, "command_counter") {
        parts.push(format!("counter={}", scalar_text("command_counter", v)?));
    }
    if let Some((key, v)) = first_present(map, &ACTION_TIME_KEYS) {
        parts.push(format!("action_time_left={}", scalar_text(key, v)?));
    }

    let mut line = parts.join(" ");
    if let Some(teams) = present(map, "teams") {
        line.push_str(" | teams: ");
        line.push_str(&render_teams(teams)?);
    }

    Ok(line)
}

/// Debug line carrying the raw payload, used when rendering fails
pub fn render_raw_line(payload: &Value) -> String {
    format!("[debug] referee payload: {}", payload)
}

/// Field value, treating explicit null as absent
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn first_present<'a, 'k>(
    map: &'a Map<String, Value>,
    keys: &[&'k str],
) -> Option<(&'k str, &'a Value)> {
    keys.iter()
        .find_map(|key| present(map, key).map(|v| (*key, v)))
}

fn scalar_text(field: &str, value: &Value) -> Result<String, FormatError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(FormatError::UnexpectedType {
            field: field.to_string(),
        }),
    }
}

fn render_teams(teams: &Value) -> Result<String, FormatError> {
    let entries: Vec<&Value> = match teams {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => return Err(FormatError::InvalidTeams),
    };

    let compact: Option<Vec<String>> = entries.into_iter().map(compact_team).collect();
    match compact {
        Some(names) => Ok(names.join(", ")),
        None => Ok(serde_json::to_string(teams)?),
    }
}

/// `name(score)`, or `None` if the entry doesn't have that shape
fn compact_team(entry: &Value) -> Option<String> {
    let name = entry.get("name")?.as_str()?;
    match entry.get("score") {
        None | Some(Value::Null) => Some(format!("{}(-)", name)),
        Some(Value::Number(score)) => Some(format!("{}({})", name, score)),
        Some(_) => None,
    }
}
