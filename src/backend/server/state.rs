/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container. It holds:
 * - The realtime context (hub, event bus, presence)
 * - The message and notification services
 * - The chat store
 * - The JWT secret used to authenticate requests and socket upgrades
 *
 * Every field is cheap to clone (`Arc` or a handle around one), so the
 * state is cloned into each handler as Axum expects.
 *
 * # Example
 *
 * ```rust,no_run
 * use axum::extract::State;
 * use chathub::backend::realtime::Realtime;
 *
 * async fn handler(State(realtime): State<Realtime>) -> usize {
 *     realtime.presence().list_online().len()
 * }
 * ```
 */
use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::chat::notifications::NotificationService;
use crate::backend::chat::service::MessageService;
use crate::backend::realtime::{EventBus, Realtime};
use crate::backend::store::ChatStore;
use crate::shared::config::{ConfigError, HubConfig};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Hub, event bus and presence.
    pub realtime: Realtime,

    /// Message sending and read receipts.
    pub messages: MessageService,

    pub notifications: NotificationService,

    /// Persistence backend, in-memory or Postgres.
    pub store: Arc<dyn ChatStore>,

    /// HS256 secret for session tokens.
    pub jwt_secret: Arc<str>,
}

impl AppState {
    /// Wire the services around `store` with a fresh event bus.
    ///
    /// # Errors
    ///
    /// Returns an error if `hub` is not a valid configuration.
    pub fn new(
        store: Arc<dyn ChatStore>,
        hub: HubConfig,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Result<Self, ConfigError> {
        let bus = EventBus::new();
        let realtime = Realtime::new(hub, store.clone(), bus.clone())?;
        let messages = realtime.messages().clone();
        let notifications = NotificationService::new(store.clone(), bus);

        Ok(Self {
            realtime,
            messages,
            notifications,
            store,
            jwt_secret: jwt_secret.into(),
        })
    }
}

impl FromRef<AppState> for Realtime {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.realtime.clone()
    }
}

impl FromRef<AppState> for MessageService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messages.clone()
    }
}

impl FromRef<AppState> for NotificationService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifications.clone()
    }
}

impl FromRef<AppState> for Arc<dyn ChatStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}
