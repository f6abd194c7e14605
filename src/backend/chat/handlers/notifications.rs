/**
 * Notification Handlers
 */
use axum::{extract::State, http::StatusCode, Json};

use crate::backend::chat::notifications::NotificationService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::message::{Notification, NotificationDraft};

/// POST /api/notifications
///
/// Without a `user_id` the notification goes to every connected user.
pub async fn create_notification(
    State(notifications): State<NotificationService>,
    AuthUser(user): AuthUser,
    Json(draft): Json<NotificationDraft>,
) -> Result<(StatusCode, Json<Notification>), BackendError> {
    let notification = notifications.create(Some(user.user_id), draft).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}
