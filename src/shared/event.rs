/**
 * Domain Events
 *
 * This module defines the events that services publish on the event bus
 * and that the hub turns into outbound frames.
 *
 * `Event` is a closed sum type: every kind carries exactly one payload
 * type, so a subscriber matches on the variant and never has to guess
 * what the payload is. Events have no identity of their own and are
 * never replayed.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::message::{ChatMessage, Notification};

/// Discriminant of an [`Event`], used as the event bus subscription key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MessageSent,
    MessageRead,
    GroupRead,
    UserOnline,
    UserOffline,
    Notification,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 6] = [
        EventKind::MessageSent,
        EventKind::MessageRead,
        EventKind::GroupRead,
        EventKind::UserOnline,
        EventKind::UserOffline,
        EventKind::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageSent => "message_sent",
            Self::MessageRead => "message_read",
            Self::GroupRead => "group_read",
            Self::UserOnline => "user_online",
            Self::UserOffline => "user_offline",
            Self::Notification => "notification",
        }
    }
}

/// A direct message was read by its receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageReadContent {
    pub message_id: Uuid,
    pub user_id: String,
    pub read_at: DateTime<Utc>,
    #[serde(default)]
    pub is_group: bool,
}

/// A group message was read by one more member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupReadContent {
    pub message_id: Uuid,
    pub group_id: String,
    pub read_by_user: String,
    pub read_at: DateTime<Utc>,
    pub read_count: usize,
    pub read_by: Vec<String>,
}

/// A user's presence changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStatusContent {
    pub user_id: String,
    pub is_online: bool,
}

/// An immutable domain event.
///
/// # Example
///
/// ```rust
/// use chathub::shared::event::{Event, EventKind, UserStatusContent};
///
/// let event = Event::UserOnline(UserStatusContent { user_id: "alice".into(), is_online: true });
/// assert_eq!(event.kind(), EventKind::UserOnline);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Event {
    MessageSent(ChatMessage),
    MessageRead(MessageReadContent),
    GroupRead(GroupReadContent),
    UserOnline(UserStatusContent),
    UserOffline(UserStatusContent),
    Notification(Notification),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MessageSent(_) => EventKind::MessageSent,
            Self::MessageRead(_) => EventKind::MessageRead,
            Self::GroupRead(_) => EventKind::GroupRead,
            Self::UserOnline(_) => EventKind::UserOnline,
            Self::UserOffline(_) => EventKind::UserOffline,
            Self::Notification(_) => EventKind::Notification,
        }
    }

    /// Presence event for `user_id`.
    pub fn presence(user_id: impl Into<String>, is_online: bool) -> Self {
        let content = UserStatusContent {
            user_id: user_id.into(),
            is_online,
        };
        if is_online {
            Self::UserOnline(content)
        } else {
            Self::UserOffline(content)
        }
    }
}
