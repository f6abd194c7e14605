/**
 * Online Service
 *
 * Keeps the store's `online` / `last_seen` fields in step with connection
 * lifecycle and announces presence changes on the event bus.
 *
 * The stored flag is informational only. Live presence is answered by the
 * hub; a restarted process starts with every stored flag potentially
 * stale, and each is corrected the next time that user connects or
 * disconnects.
 */
use std::sync::Arc;

use chrono::Utc;

use crate::backend::realtime::event_bus::EventBus;
use crate::backend::store::{ChatStore, StoreResult, UserStatus};
use crate::shared::event::Event;

#[derive(Clone)]
pub struct OnlineService {
    store: Arc<dyn ChatStore>,
    bus: EventBus,
}

impl OnlineService {
    pub fn new(store: Arc<dyn ChatStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    pub async fn set_user_online(&self, user_id: &str) -> StoreResult<()> {
        self.set_status(user_id, true).await
    }

    pub async fn set_user_offline(&self, user_id: &str) -> StoreResult<()> {
        self.set_status(user_id, false).await
    }

    /// Persisted status of `user_id`, if the store has ever seen them.
    pub async fn stored_status(&self, user_id: &str) -> StoreResult<Option<UserStatus>> {
        self.store.user_status(user_id).await
    }

    // Publishes even when the store write fails.
    async fn set_status(&self, user_id: &str, online: bool) -> StoreResult<()> {
        let result = self.store.set_user_status(user_id, online, Utc::now()).await;
        self.bus.publish(Event::presence(user_id, online));

        match &result {
            Ok(()) => tracing::debug!(user_id = %user_id, online, "[Online] Status updated"),
            Err(e) => tracing::warn!(user_id = %user_id, online, error = %e, "[Online] Failed to persist status"),
        }
        result
    }
}
