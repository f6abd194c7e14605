/**
 * Notification Service
 *
 * Stores notifications and publishes them for delivery. A notification
 * with a `user_id` goes to that user's connection; one without goes to
 * every connection.
 */
use std::sync::Arc;

use crate::backend::chat::error::ServiceError;
use crate::backend::realtime::event_bus::EventBus;
use crate::backend::store::ChatStore;
use crate::shared::event::Event;
use crate::shared::message::{Notification, NotificationDraft};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn ChatStore>,
    bus: EventBus,
}

impl NotificationService {
    pub fn new(store: Arc<dyn ChatStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Validate, store and publish a notification.
    ///
    /// # Arguments
    ///
    /// * `sender_id` - the user that triggered it, `None` for system notices
    /// * `draft` - addressing and text
    pub async fn create(
        &self,
        sender_id: Option<String>,
        draft: NotificationDraft,
    ) -> Result<Notification, ServiceError> {
        draft.validate()?;
        let notification = Notification::from_draft(sender_id, draft);
        self.store.insert_notification(&notification).await?;
        self.bus.publish(Event::Notification(notification.clone()));

        tracing::debug!(
            notification_id = %notification.id,
            user_id = ?notification.user_id,
            kind = %notification.kind,
            "[Notifications] Notification created"
        );
        Ok(notification)
    }
}
