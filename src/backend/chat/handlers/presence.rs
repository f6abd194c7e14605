/**
 * Presence Handlers
 *
 * Live presence straight from the hub. The answers are snapshots and may
 * be stale by the time the response arrives.
 */
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::middleware::AuthUser;
use crate::backend::realtime::Realtime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnlineUsersResponse {
    pub online_users: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserOnlineResponse {
    pub user_id: String,
    pub is_online: bool,
}

/// GET /api/online
pub async fn list_online_users(
    State(realtime): State<Realtime>,
    AuthUser(_user): AuthUser,
) -> Json<OnlineUsersResponse> {
    let online_users = realtime.presence().list_online().into_iter().collect();
    Json(OnlineUsersResponse { online_users })
}

/// GET /api/online/{user_id}
pub async fn user_online(
    State(realtime): State<Realtime>,
    AuthUser(_user): AuthUser,
    Path(user_id): Path<String>,
) -> Json<UserOnlineResponse> {
    let is_online = realtime.presence().is_online(&user_id);
    Json(UserOnlineResponse { user_id, is_online })
}
