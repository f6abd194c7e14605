/**
 * Socket Upgrade Handler
 *
 * `GET /ws` upgrades an authenticated request to a socket and hands both
 * halves to [`Realtime::connect`]. The [`AuthUser`] extractor runs first,
 * so a request without a valid token gets `401` and no connection is ever
 * created.
 */
use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::StreamExt;

use super::Realtime;
use crate::backend::middleware::AuthUser;

/// GET /ws
pub async fn ws_upgrade(
    State(realtime): State<Realtime>,
    AuthUser(user): AuthUser,
    ws: WebSocketUpgrade,
) -> Response {
    tracing::info!(user_id = %user.user_id, "[Realtime] Socket upgrade authenticated");

    let max_message_size = realtime.config().max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| async move {
            let (sink, stream) = socket.split();
            // Runs detached; it ends when the connection is torn down.
            let _connection = realtime.connect(user.user_id, stream, sink).await;
        })
}
