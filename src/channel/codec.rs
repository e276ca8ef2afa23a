use crate::config::WireProtocol;
use crate::event::ChannelEvent;
use serde_json::Value;
use std::fmt;

/// Decoded text frame
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    /// Event or lifecycle notification for the session
    Event(ChannelEvent),
    /// engine.io open handshake; the client must join the namespace
    Open,
    /// engine.io ping; the client must answer with a pong
    Ping,
    /// Frame with no meaning for the session (pong, noop, ack)
    Ignored,
}

/// Wire decoding errors
#[derive(Debug)]
pub enum FrameError {
    Empty,
    UnknownPacket(String),
    InvalidJson(serde_json::Error),
    MissingEventName,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Empty => write!(f, "empty frame"),
            FrameError::UnknownPacket(p) => write!(f, "unknown packet type '{}'", p),
            FrameError::InvalidJson(e) => write!(f, "invalid JSON in frame: {}", e),
            FrameError::MissingEventName => write!(f, "event frame without a name"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::InvalidJson(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(e: serde_json::Error) -> Self {
        FrameError::InvalidJson(e)
    }
}

/// engine.io pong reply
pub const PONG: &str = "3";
/// socket.io default namespace connect request
pub const NAMESPACE_CONNECT: &str = "40";

/// Decode one WebSocket text frame
pub fn decode_frame(protocol: WireProtocol, text: &str) -> Result<Frame, FrameError> {
    match protocol {
        WireProtocol::SocketIo => decode_socketio(text),
        WireProtocol::Json => decode_envelope(text),
    }
}

/// socket.io v4 over engine.io v4
///
/// engine.io type is the first character; for `4` (message) the socket.io
/// type follows.
fn decode_socketio(text: &str) -> Result<Frame, FrameError> {
    let mut chars = text.chars();
    let engine_type = chars.next().ok_or(FrameError::Empty)?;

    match engine_type {
        '0' => Ok(Frame::Open),
        '1' => Ok(Frame::Event(ChannelEvent::Disconnected)),
        '2' => Ok(Frame::Ping),
        '3' | '6' => Ok(Frame::Ignored),
        '4' => {
            let rest = &text[1..];
            let socket_type = rest.chars().next().ok_or(FrameError::Empty)?;
            let body = &rest[socket_type.len_utf8()..];
            match socket_type {
                '0' => Ok(Frame::Event(ChannelEvent::Connected)),
                '1' => Ok(Frame::Event(ChannelEvent::Disconnected)),
                '2' => decode_event_array(body),
                // ack, connect error, binary variants
                '3' | '4' | '5' | '6' => Ok(Frame::Ignored),
                other => Err(FrameError::UnknownPacket(format!("4{}", other))),
            }
        }
        other => Err(FrameError::UnknownPacket(other.to_string())),
    }
}

/// Body of a `42` packet: `[/namespace,][ack_id]["name", payload]`
fn decode_event_array(body: &str) -> Result<Frame, FrameError> {
    let mut body = body;
    if body.starts_with('/') {
        body = match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        };
    }
    let body = body.trim_start_matches(|c: char| c.is_ascii_digit());

    let value: Value = serde_json::from_str(body)?;
    let mut items = match value {
        Value::Array(items) => items.into_iter(),
        _ => return Err(FrameError::MissingEventName),
    };

    let name = match items.next() {
        Some(Value::String(name)) => name,
        _ => return Err(FrameError::MissingEventName),
    };
    let payload = items.next().unwrap_or(Value::Null);

    Ok(Frame::Event(ChannelEvent::Message { name, payload }))
}

/// `{"event": name, "data": payload}`
fn decode_envelope(text: &str) -> Result<Frame, FrameError> {
    if text.trim().is_empty() {
        return Err(FrameError::Empty);
    }

    let mut value: Value = serde_json::from_str(text)?;
    let name = match value.get("event").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return Err(FrameError::MissingEventName),
    };
    let payload = value
        .get_mut("data")
        .map(Value::take)
        .unwrap_or(Value::Null);

    let event = match name.as_str() {
        "connect" => ChannelEvent::Connected,
        "disconnect" => ChannelEvent::Disconnected,
        _ => ChannelEvent::Message { name, payload },
    };
    Ok(Frame::Event(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sio(text: &str) -> Result<Frame, FrameError> {
        decode_frame(WireProtocol::SocketIo, text)
    }

    #[test]
    fn test_engine_io_control_packets() {
        assert_eq!(sio(r#"0{"sid":"abc","pingInterval":25000}"#).unwrap(), Frame::Open);
        assert_eq!(sio("2").unwrap(), Frame::Ping);
        assert_eq!(sio("3").unwrap(), Frame::Ignored);
        assert_eq!(sio("1").unwrap(), Frame::Event(ChannelEvent::Disconnected));
    }

    #[test]
    fn test_namespace_lifecycle() {
        assert_eq!(
            sio(r#"40{"sid":"xyz"}"#).unwrap(),
            Frame::Event(ChannelEvent::Connected)
        );
        assert_eq!(sio("41").unwrap(), Frame::Event(ChannelEvent::Disconnected));
    }

    #[test]
    fn test_event_packet() {
        let frame = sio(r#"42["vision_update",{"yellow":[],"blue":[],"balls":[]}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event(ChannelEvent::message(
                "vision_update",
                json!({"yellow": [], "blue": [], "balls": []})
            ))
        );
    }

    #[test]
    fn test_event_packet_with_namespace_and_ack() {
        let frame = sio(r#"42/gui,17["refereeStatus",true]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event(ChannelEvent::message("refereeStatus", json!(true)))
        );
    }

    #[test]
    fn test_event_without_payload() {
        let frame = sio(r#"42["ping_gui"]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event(ChannelEvent::message("ping_gui", Value::Null))
        );
    }

    #[test]
    fn test_malformed_socketio_frames() {
        assert!(matches!(sio(""), Err(FrameError::Empty)));
        assert!(matches!(sio("4"), Err(FrameError::Empty)));
        assert!(matches!(sio("9"), Err(FrameError::UnknownPacket(_))));
        assert!(matches!(sio("42[1,2]"), Err(FrameError::MissingEventName)));
        assert!(matches!(sio("42{}"), Err(FrameError::MissingEventName)));
        assert!(matches!(sio("42[oops"), Err(FrameError::InvalidJson(_))));
    }

    #[test]
    fn test_json_envelope() {
        let frame = decode_frame(
            WireProtocol::Json,
            r#"{"event":"visionOutput","data":{"line":"cam ok"}}"#,
        )
        .unwrap();
        assert_eq!(
            frame,
            Frame::Event(ChannelEvent::message("visionOutput", json!({"line": "cam ok"})))
        );

        let frame = decode_frame(WireProtocol::Json, r#"{"event":"disconnect"}"#).unwrap();
        assert_eq!(frame, Frame::Event(ChannelEvent::Disconnected));
    }

    #[test]
    fn test_json_envelope_errors() {
        assert!(matches!(
            decode_frame(WireProtocol::Json, "  "),
            Err(FrameError::Empty)
        ));
        assert!(matches!(
            decode_frame(WireProtocol::Json, r#"{"data":1}"#),
            Err(FrameError::MissingEventName)
        ));
        assert!(matches!(
            decode_frame(WireProtocol::Json, "not json"),
            Err(FrameError::InvalidJson(_))
        ));
    }
}
