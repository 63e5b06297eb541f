//! WebSocket frame DTOs.
//!
//! Client→Server: `hello`, `action`. Server→Client: `state`, `error`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{Action, RoomState};

/// Frame type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Hello,
    Action,
    State,
    Error,
}

/// Sent by the client right after the socket opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloMessage {
    pub r#type: MessageType,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub room_id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub client_id: String,
}

/// An action to apply to the room state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    pub r#type: MessageType,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub room_id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub client_id: String,
    pub action: Action,
}

/// `roomId` / `clientId` are informational; anything but a string reads as empty.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        _ => Ok(String::new()),
    }
}

/// Full room snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMessage {
    pub r#type: MessageType,
    pub room_id: String,
    pub version: u64,
    pub server_now_ms: i64,
    pub state: RoomState,
}

/// Recoverable protocol error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub code: String,
    pub message: String,
}

/// Decoded client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Hello(HelloMessage),
    Action(ActionMessage),
}

/// Why a client frame was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundParseError {
    /// Not JSON, or a known frame type with a malformed payload.
    BadJson,
    /// JSON without a recognized `type`.
    UnknownType(Option<String>),
}

/// Decode a client text frame.
pub fn parse_inbound(text: &str) -> Result<InboundMessage, InboundParseError> {
    let value: Value = serde_json::from_str(text).map_err(|_| InboundParseError::BadJson)?;
    let frame_type = value.get("type").and_then(Value::as_str).map(str::to_owned);

    match frame_type.as_deref() {
        Some("hello") => serde_json::from_value(value)
            .map(InboundMessage::Hello)
            .map_err(|_| InboundParseError::BadJson),
        Some("action") => serde_json::from_value(value)
            .map(InboundMessage::Action)
            .map_err(|_| InboundParseError::BadJson),
        _ => Err(InboundParseError::UnknownType(frame_type)),
    }
}

/// Decoded server frame, as seen by clients.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    State(StateMessage),
    Error(ErrorMessage),
}

/// Decode a server text frame. Returns `None` for anything unrecognized.
pub fn parse_outbound(text: &str) -> Option<OutboundMessage> {
    if let Ok(msg) = serde_json::from_str::<StateMessage>(text)
        && msg.r#type == MessageType::State
    {
        return Some(OutboundMessage::State(msg));
    }
    if let Ok(msg) = serde_json::from_str::<ErrorMessage>(text)
        && msg.r#type == MessageType::Error
    {
        return Some(OutboundMessage::Error(msg));
    }
    None
}
