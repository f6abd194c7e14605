/**
 * Message Service
 *
 * Validates, persists and announces chat messages and read receipts.
 *
 * Two send paths exist:
 *
 * - [`MessageService::persist`] is used by live connections. The
 *   connection routes the stored message itself, so nothing is published.
 * - [`MessageService::send`] is used by the HTTP API. It persists and then
 *   publishes `MessageSent`, which the hub's bus subscription routes.
 *
 * Read receipts always go through the event bus.
 */
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::backend::chat::error::ServiceError;
use crate::backend::realtime::event_bus::EventBus;
use crate::backend::realtime::policy;
use crate::backend::store::ChatStore;
use crate::shared::event::{Event, GroupReadContent, MessageReadContent};
use crate::shared::message::{ChatMessage, MessageDraft};

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn ChatStore>,
    bus: EventBus,
}

impl MessageService {
    pub fn new(store: Arc<dyn ChatStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Validate `draft` and store it as a message from `sender_id`.
    ///
    /// # Errors
    ///
    /// * `ServiceError::Invalid` - body empty or too long
    /// * `ServiceError::Policy` - neither (or both) of receiver and group set
    /// * `ServiceError::Store` - the insert failed
    pub async fn persist(
        &self,
        sender_id: &str,
        draft: MessageDraft,
    ) -> Result<ChatMessage, ServiceError> {
        draft.validate()?;
        policy::address(
            sender_id,
            draft.receiver_id.as_deref(),
            draft.group_id.as_deref(),
        )?;

        let message = ChatMessage::from_draft(sender_id, draft);
        self.store.insert_message(&message).await?;

        tracing::debug!(
            message_id = %message.id,
            sender_id = %sender_id,
            group = message.is_group(),
            "[Messages] Message stored"
        );
        Ok(message)
    }

    /// Persist and publish `MessageSent`.
    pub async fn send(
        &self,
        sender_id: &str,
        draft: MessageDraft,
    ) -> Result<ChatMessage, ServiceError> {
        let message = self.persist(sender_id, draft).await?;
        self.bus.publish(Event::MessageSent(message.clone()));
        Ok(message)
    }

    /// Record that `reader_id` read message `message_id` and publish the
    /// receipt.
    ///
    /// Only the receiver may read a direct message, and only a group member
    /// may read a group message. The sender reading their own message, or a
    /// reader marking a message they already read, is accepted and
    /// publishes nothing.
    ///
    /// # Returns
    ///
    /// The message with its updated reader list.
    pub async fn mark_as_read(
        &self,
        message_id: Uuid,
        reader_id: &str,
    ) -> Result<ChatMessage, ServiceError> {
        let message = self.store.get_message(message_id).await?;
        if message.sender_id == reader_id {
            return Ok(message);
        }

        match message.group_id.as_deref() {
            Some(group_id) => {
                let members = self.store.group_members(group_id).await?;
                if !members.iter().any(|member| member == reader_id) {
                    return Err(ServiceError::forbidden(format!(
                        "{reader_id} is not a member of group {group_id}"
                    )));
                }
            }
            None => {
                if message.receiver_id.as_deref() != Some(reader_id) {
                    return Err(ServiceError::forbidden(format!(
                        "message {message_id} is not addressed to {reader_id}"
                    )));
                }
            }
        }

        if message.read_by.iter().any(|reader| reader == reader_id) {
            tracing::debug!(message_id = %message_id, reader_id = %reader_id, "[Messages] Already read, receipt not republished");
            return Ok(message);
        }

        let updated = self.store.mark_message_read(message_id, reader_id).await?;
        let read_at = Utc::now();

        let event = match updated.group_id.clone() {
            Some(group_id) => Event::GroupRead(GroupReadContent {
                message_id,
                group_id,
                read_by_user: reader_id.to_string(),
                read_at,
                read_count: updated.read_by.len(),
                read_by: updated.read_by.clone(),
            }),
            None => Event::MessageRead(MessageReadContent {
                message_id,
                user_id: reader_id.to_string(),
                read_at,
                is_group: false,
            }),
        };
        self.bus.publish(event);

        tracing::debug!(message_id = %message_id, reader_id = %reader_id, "[Messages] Message marked as read");
        Ok(updated)
    }
}
