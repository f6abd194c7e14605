/**
 * Chat Route Handlers
 *
 * This module wires the real-time endpoint.
 *
 * # Routes
 *
 * - `GET /ws` - socket upgrade; the token comes from the `Authorization`
 *   header or the `token` query parameter
 */

use axum::Router;

use crate::backend::realtime::ws_upgrade;
use crate::backend::server::state::AppState;

/// Configure chat-related routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with chat routes configured
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/ws", axum::routing::get(ws_upgrade))
}
