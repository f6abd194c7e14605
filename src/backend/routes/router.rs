/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Chat routes (socket upgrade)
 * 2. API routes (messages, presence, notifications)
 * 3. Health check
 * 4. Fallback handler (404)
 *
 * Every request is traced by `tower_http`'s `TraceLayer`.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;
use crate::backend::store::ChatStore;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the hub and services
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Route Details
///
/// - `GET /ws` - Authenticated socket upgrade
/// - `GET /api/online` - Online users
/// - `GET /api/online/{user_id}` - One user's presence
/// - `POST /api/messages` - Send a message
/// - `POST /api/messages/{message_id}/read` - Mark a message as read
/// - `POST /api/notifications` - Create a notification
/// - `GET /health` - Store health
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_chat_routes(Router::new());

    // Add API routes
    let router = configure_api_routes(router);

    let router = router.route("/health", axum::routing::get(health_check));

    // Fallback handler for 404
    let router = router.fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") });

    router.layer(TraceLayer::new_for_http()).with_state(app_state)
}

/// GET /health
///
/// `200` with the store backend name when the store answers, `503`
/// otherwise.
async fn health_check(State(store): State<Arc<dyn ChatStore>>) -> (StatusCode, Json<Value>) {
    match store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": store.backend_name() })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "store": store.backend_name() })),
            )
        }
    }
}
