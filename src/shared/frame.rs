/**
 * Socket Frames
 *
 * Every unit exchanged over a live connection is a JSON envelope
 * `{ "type": <string>, "content": <kind-specific> }`.
 *
 * # Inbound
 *
 * - `chat` - a [`MessageDraft`] to persist and route
 * - `typing` - a typing indicator to route without persistence
 * - `notification` - a [`NotificationDraft`] routed to one user or everyone
 * - `read` / `group_read` - a read receipt for a stored message
 *
 * Any other `type` is ignored. A frame whose `content` does not match its
 * `type` is a decode error.
 *
 * # Outbound
 *
 * `chat`, `typing`, `notification`, `read`, `group_read`, `online` and
 * `error` (a rejected send, returned to the sender only).
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::event::{Event, GroupReadContent, MessageReadContent, UserStatusContent};
use crate::shared::message::{ChatMessage, MessageDraft, Notification, NotificationDraft};

/// Envelope as read off the wire, before the content is interpreted.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    frame_type: String,
    #[serde(default)]
    content: serde_json::Value,
}

/// Typing indicator as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TypingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default = "default_is_typing")]
    pub is_typing: bool,
}

fn default_is_typing() -> bool {
    true
}

/// Read receipt as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadDraft {
    pub message_id: Uuid,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Chat(MessageDraft),
    Typing(TypingDraft),
    Notification(NotificationDraft),
    Read(ReadDraft),
}

impl InboundFrame {
    /// Decode one text frame.
    ///
    /// Returns `Ok(None)` for an envelope with an unrecognised `type`.
    ///
    /// # Errors
    ///
    /// `SharedError::SerializationError` when the text is not a JSON
    /// envelope, or when the content does not fit the declared type.
    pub fn decode(text: &str) -> Result<Option<Self>, SharedError> {
        let raw: RawFrame = serde_json::from_str(text)?;
        let frame = match raw.frame_type.as_str() {
            "chat" => Self::Chat(serde_json::from_value(raw.content)?),
            "typing" => Self::Typing(serde_json::from_value(raw.content)?),
            "notification" => Self::Notification(serde_json::from_value(raw.content)?),
            "read" | "group_read" => Self::Read(serde_json::from_value(raw.content)?),
            _ => return Ok(None),
        };
        Ok(Some(frame))
    }
}

/// Typing indicator as relayed to other users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypingContent {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub is_typing: bool,
}

/// Content of an `error` frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorContent {
    pub message: String,
}

/// A frame on its way to a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum OutboundFrame {
    Chat(ChatMessage),
    Typing(TypingContent),
    Notification(Notification),
    Read(MessageReadContent),
    GroupRead(GroupReadContent),
    Online(UserStatusContent),
    Error(ErrorContent),
}

impl OutboundFrame {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorContent {
            message: message.into(),
        })
    }

    /// Wire name of this frame's `type`.
    pub fn frame_type(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Typing(_) => "typing",
            Self::Notification(_) => "notification",
            Self::Read(_) => "read",
            Self::GroupRead(_) => "group_read",
            Self::Online(_) => "online",
            Self::Error(_) => "error",
        }
    }

    /// Serialize to the JSON text written to the socket.
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Event> for OutboundFrame {
    fn from(event: Event) -> Self {
        match event {
            Event::MessageSent(message) => Self::Chat(message),
            Event::MessageRead(content) => Self::Read(content),
            Event::GroupRead(content) => Self::GroupRead(content),
            Event::UserOnline(content) | Event::UserOffline(content) => Self::Online(content),
            Event::Notification(notification) => Self::Notification(notification),
        }
    }
}
