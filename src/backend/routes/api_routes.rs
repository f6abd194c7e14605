/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Presence
 * - `GET /api/online` - Users with a live connection
 * - `GET /api/online/{user_id}` - Whether one user is connected
 *
 * ## Messages
 * - `POST /api/messages` - Send a message
 * - `POST /api/messages/{message_id}/read` - Mark a message as read
 *
 * ## Notifications
 * - `POST /api/notifications` - Create a notification
 *
 * All API routes require a session token.
 */

use axum::Router;

use crate::backend::chat::handlers::{
    create_notification, list_online_users, mark_message_read, send_message, user_online,
};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with API routes configured
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Presence endpoints
        .route(
            "/api/online",
            axum::routing::get(list_online_users),
        )
        .route(
            "/api/online/{user_id}",
            axum::routing::get(user_online),
        )
        // Message endpoints
        .route(
            "/api/messages",
            axum::routing::post(send_message),
        )
        .route(
            "/api/messages/{message_id}/read",
            axum::routing::post(mark_message_read),
        )
        // Notification endpoints
        .route(
            "/api/notifications",
            axum::routing::post(create_notification),
        )
}
