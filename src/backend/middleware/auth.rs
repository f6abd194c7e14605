/**
 * Authentication Extractor
 *
 * This module resolves the user behind a request from its session token.
 * The token is read from the `Authorization: Bearer <token>` header, or
 * from a `token` query parameter for socket upgrades, where browsers
 * cannot set headers.
 *
 * Requests without a valid token are rejected with `401 Unauthorized`
 * before the handler runs, so an unauthenticated socket upgrade never
 * produces a connection.
 */
use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use serde::Deserialize;

use crate::backend::auth::sessions::verify_token;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: Option<String>,
}

/// Axum extractor for authenticated user
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull the raw token out of the request, header first.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts.headers.get(AUTHORIZATION) {
        return header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string());
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                tracing::warn!(path = %parts.uri.path(), "Missing session token");
                StatusCode::UNAUTHORIZED
            })?;

        let claims = verify_token(&token, &state.jwt_secret).map_err(|e| {
            tracing::warn!(path = %parts.uri.path(), "Invalid token: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        Ok(AuthUser(AuthenticatedUser {
            user_id: claims.sub,
            username: claims.username,
        }))
    }
}
