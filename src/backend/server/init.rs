/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including store loading, state creation, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Open the chat store (Postgres when configured, in-memory otherwise)
 * 2. Build the event bus, hub and services around it
 * 3. Create and configure the router
 */
use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_store, ServerConfig};
use crate::backend::server::state::AppState;
use crate::shared::config::ConfigError;

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Errors
///
/// Returns an error if the hub configuration is invalid.
///
/// # Error Handling
///
/// - Missing database: the in-memory store is used
/// - Migration failures: logged but don't prevent startup
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, ConfigError> {
    tracing::info!("Initializing chathub backend server");

    let store = load_store(config.database_url.as_deref()).await;
    tracing::info!(backend = store.backend_name(), "Chat store ready");

    let app_state = AppState::new(store, config.hub.clone(), config.jwt_secret.as_str())?;
    tracing::info!(
        queue_capacity = config.hub.send_queue_capacity,
        max_message_size = config.hub.max_message_size,
        pong_wait = ?config.hub.pong_wait,
        "Realtime hub initialized"
    );

    Ok(create_router(app_state))
}
