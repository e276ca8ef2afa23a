use serde_json::Value;

mod payload;

pub use payload::{
    output_line, parse_list, parse_status_flag, Agent, Ball, Pose, Trajectory, TrajectoryPoint,
};

/// ChannelEvent is one delivery from the event channel.
///
/// Lifecycle notifications are first-class variants rather than errors:
/// the core only knows "connected" and "not connected".
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelEvent {
    /// Transport link established
    Connected,

    /// Transport link lost
    Disconnected,

    /// Named event with an opaque JSON payload
    Message { name: String, payload: Value },
}

impl ChannelEvent {
    /// Build a named message event
    pub fn message(name: impl Into<String>, payload: Value) -> Self {
        ChannelEvent::Message {
            name: name.into(),
            payload,
        }
    }

    /// Name used for metrics and logging
    pub fn name(&self) -> &str {
        match self {
            ChannelEvent::Connected => "connect",
            ChannelEvent::Disconnected => "disconnect",
            ChannelEvent::Message { name, .. } => name,
        }
    }
}

/// Known inbound event names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    SystemStatus,
    VisionUpdate,
    TrajectoryUpdate,
    RefereeUpdate,
    RefereeStatus,
    VisionStatus,
    CommunicationStatus,
    VisionOutput,
    CommunicationOutput,
    RefereeOutput,
    VisionMsg,
    Position,
}

impl EventKind {
    /// Resolve a wire event name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "system_status" => EventKind::SystemStatus,
            "vision_update" => EventKind::VisionUpdate,
            "trajectory_update" => EventKind::TrajectoryUpdate,
            "referee_update" => EventKind::RefereeUpdate,
            "refereeStatus" => EventKind::RefereeStatus,
            "visionStatus" => EventKind::VisionStatus,
            "communicationStatus" => EventKind::CommunicationStatus,
            "visionOutput" => EventKind::VisionOutput,
            "communicationOutput" => EventKind::CommunicationOutput,
            "refereeOutput" => EventKind::RefereeOutput,
            "vision_msg" => EventKind::VisionMsg,
            "position" => EventKind::Position,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SystemStatus => "system_status",
            EventKind::VisionUpdate => "vision_update",
            EventKind::TrajectoryUpdate => "trajectory_update",
            EventKind::RefereeUpdate => "referee_update",
            EventKind::RefereeStatus => "refereeStatus",
            EventKind::VisionStatus => "visionStatus",
            EventKind::CommunicationStatus => "communicationStatus",
            EventKind::VisionOutput => "visionOutput",
            EventKind::CommunicationOutput => "communicationOutput",
            EventKind::RefereeOutput => "refereeOutput",
            EventKind::VisionMsg => "vision_msg",
            EventKind::Position => "position",
        }
    }
}
