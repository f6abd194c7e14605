/**
 * Delivery Policy
 *
 * Pure functions mapping a domain event, or an addressed client frame, to
 * the set of connections that should receive it. Nothing in here touches
 * the hub or the store; group targets are resolved into member IDs later,
 * at delivery time, by [`Fanout`](super::fanout::Fanout).
 *
 * | Source | Target |
 * |--------|--------|
 * | direct chat / typing | the receiver |
 * | group chat / typing | group members, minus the sender |
 * | chat / typing with no receiver and no group | rejected |
 * | `MessageRead` | every connection |
 * | `GroupRead` | group members |
 * | `UserOnline` / `UserOffline` | every connection |
 * | notification | the notified user, or every connection if unaddressed |
 */
use thiserror::Error;

use crate::shared::event::Event;
use crate::shared::message::{ChatMessage, Notification};

/// Where a frame should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    User(String),
    Group {
        group_id: String,
        exclude: Option<String>,
    },
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("message has neither a receiver nor a group")]
    Unaddressed,
    #[error("message cannot have both a receiver and a group")]
    Ambiguous,
}

/// Target for a chat or typing frame from `sender_id`.
pub fn address(
    sender_id: &str,
    receiver_id: Option<&str>,
    group_id: Option<&str>,
) -> Result<Target, PolicyError> {
    let receiver_id = receiver_id.filter(|id| !id.trim().is_empty());
    let group_id = group_id.filter(|id| !id.trim().is_empty());
    match (receiver_id, group_id) {
        (Some(receiver), None) => Ok(Target::User(receiver.to_string())),
        (None, Some(group)) => Ok(Target::Group {
            group_id: group.to_string(),
            exclude: Some(sender_id.to_string()),
        }),
        (Some(_), Some(_)) => Err(PolicyError::Ambiguous),
        (None, None) => Err(PolicyError::Unaddressed),
    }
}

pub fn message_target(message: &ChatMessage) -> Result<Target, PolicyError> {
    address(
        &message.sender_id,
        message.receiver_id.as_deref(),
        message.group_id.as_deref(),
    )
}

pub fn notification_target(notification: &Notification) -> Target {
    match notification.user_id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(user_id) => Target::User(user_id.to_string()),
        None => Target::All,
    }
}

/// Target for a published event.
pub fn event_target(event: &Event) -> Result<Target, PolicyError> {
    match event {
        Event::MessageSent(message) => message_target(message),
        Event::MessageRead(_) => Ok(Target::All),
        Event::GroupRead(content) => Ok(Target::Group {
            group_id: content.group_id.clone(),
            exclude: None,
        }),
        Event::UserOnline(_) | Event::UserOffline(_) => Ok(Target::All),
        Event::Notification(notification) => Ok(notification_target(notification)),
    }
}
