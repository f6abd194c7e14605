/**
 * Message Handlers
 *
 * - `POST /api/messages` - send a message through the HTTP API
 * - `POST /api/messages/{message_id}/read` - mark a message as read
 *
 * Both publish on the event bus; the hub delivers the resulting frames to
 * whoever is connected.
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::chat::service::MessageService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::message::{ChatMessage, MessageDraft, MessageKind};

/// Request body for `POST /api/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "type", default)]
    pub message_type: MessageKind,
    pub content: String,
    #[serde(default)]
    pub receiver_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
}

impl From<SendMessageRequest> for MessageDraft {
    fn from(request: SendMessageRequest) -> Self {
        Self {
            receiver_id: request.receiver_id,
            group_id: request.group_id,
            body: request.content,
            message_type: request.message_type,
        }
    }
}

/// POST /api/messages
///
/// # Returns
///
/// `201 Created` with the stored message.
///
/// # Errors
///
/// * `400 Bad Request` - empty or oversized body, or no receiver and no group
/// * `401 Unauthorized` - missing or invalid token
pub async fn send_message(
    State(messages): State<MessageService>,
    AuthUser(user): AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), BackendError> {
    let message = messages.send(&user.user_id, request.into()).await?;
    tracing::info!(message_id = %message.id, sender_id = %user.user_id, "Message sent via API");
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/{message_id}/read
pub async fn mark_message_read(
    State(messages): State<MessageService>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<ChatMessage>, BackendError> {
    let message = messages.mark_as_read(message_id, &user.user_id).await?;
    Ok(Json(message))
}
