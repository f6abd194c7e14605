/**
 * Chat Message and Notification Records
 *
 * This module defines the records that flow through the delivery core:
 * persisted chat messages, the drafts clients submit to create them,
 * and notifications.
 *
 * Drafts are what arrives over the socket or the HTTP API. They are
 * validated and turned into a `ChatMessage` (with an ID, a sender and a
 * timestamp) by the message service before anything is stored or routed.
 */
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Maximum length of a chat message body, in characters.
pub const MAX_BODY_LENGTH: usize = 4_000;

/// Maximum length of a notification title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length of a notification body, in characters.
pub const MAX_NOTIFICATION_LENGTH: usize = 2_000;

/// Kind of payload a chat message carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
        }
    }
}

impl FromStr for MessageKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            other => Err(SharedError::validation(
                "message_type",
                format!("unknown message type '{other}'"),
            )),
        }
    }
}

/// Delivery state of a stored message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    #[default]
    Sent,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Read => "read",
        }
    }
}

impl FromStr for MessageStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "read" => Ok(Self::Read),
            other => Err(SharedError::validation(
                "status",
                format!("unknown message status '{other}'"),
            )),
        }
    }
}

/// A chat message as submitted by a client.
///
/// Exactly one of `receiver_id` and `group_id` must be set; the message
/// service rejects drafts that address neither (or both).
///
/// # Example
///
/// ```rust
/// use chathub::shared::message::MessageDraft;
///
/// let draft: MessageDraft = serde_json::from_str(r#"{"receiver_id":"bob","body":"hi"}"#).unwrap();
/// assert!(draft.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessageDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub body: String,
    #[serde(default)]
    pub message_type: MessageKind,
}

impl MessageDraft {
    /// Direct message draft addressed to `receiver_id`.
    pub fn direct(receiver_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            receiver_id: Some(receiver_id.into()),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Group message draft addressed to `group_id`.
    pub fn group(group_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Check the body against the length limits.
    ///
    /// Addressing is checked separately by the delivery policy.
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.body.trim().is_empty() {
            return Err(SharedError::validation("body", "message body cannot be empty"));
        }
        let length = self.body.chars().count();
        if length > MAX_BODY_LENGTH {
            return Err(SharedError::validation(
                "body",
                format!("message body is {length} characters, limit is {MAX_BODY_LENGTH}"),
            ));
        }
        Ok(())
    }
}

/// A persisted chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    #[serde(default)]
    pub message_type: MessageKind,
    pub body: String,
    pub sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub read_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a new message from a validated draft.
    ///
    /// The message gets a fresh ID and the current UTC time.
    pub fn from_draft(sender_id: impl Into<String>, draft: MessageDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_type: draft.message_type,
            body: draft.body,
            sender_id: sender_id.into(),
            receiver_id: non_empty(draft.receiver_id),
            group_id: non_empty(draft.group_id),
            status: MessageStatus::Sent,
            read_by: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_group(&self) -> bool {
        self.group_id.is_some()
    }

    /// Record `user_id` as a reader. Returns `false` if it already was one.
    pub fn record_reader(&mut self, user_id: &str) -> bool {
        if self.read_by.iter().any(|reader| reader == user_id) {
            return false;
        }
        self.read_by.push(user_id.to_string());
        self.status = MessageStatus::Read;
        true
    }
}

/// Category of a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Group,
    #[default]
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Group => "group",
            Self::System => "system",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "group" => Ok(Self::Group),
            "system" => Ok(Self::System),
            other => Err(SharedError::validation(
                "kind",
                format!("unknown notification kind '{other}'"),
            )),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification as submitted by a client or a service.
///
/// When `user_id` is absent the notification is meant for everyone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotificationDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub kind: NotificationKind,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl NotificationDraft {
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.content.trim().is_empty() {
            return Err(SharedError::validation("content", "notification content cannot be empty"));
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(SharedError::validation(
                "title",
                format!("title exceeds {MAX_TITLE_LENGTH} characters"),
            ));
        }
        if self.content.chars().count() > MAX_NOTIFICATION_LENGTH {
            return Err(SharedError::validation(
                "content",
                format!("content exceeds {MAX_NOTIFICATION_LENGTH} characters"),
            ));
        }
        Ok(())
    }
}

/// A notification ready for delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_draft(sender_id: Option<String>, draft: NotificationDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: draft.kind,
            title: draft.title,
            content: draft.content,
            user_id: non_empty(draft.user_id),
            sender_id,
            group_id: non_empty(draft.group_id),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
