//! In-memory implementation of [`ChatStore`].
//!
//! Everything lives in `HashMap`s behind `tokio::sync::RwLock`. State is
//! lost on restart. Groups have no CRUD surface here, so they are seeded
//! with [`MemoryStore::add_group`].
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ChatStore, StoreError, StoreResult, UserStatus};
use crate::shared::message::{ChatMessage, Notification};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    messages: Arc<RwLock<HashMap<Uuid, ChatMessage>>>,
    groups: Arc<RwLock<HashMap<String, Vec<String>>>>,
    statuses: Arc<RwLock<HashMap<String, UserStatus>>>,
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a group with the given members.
    pub async fn add_group<I, S>(&self, group_id: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.groups.write().await.insert(group_id.into(), members);
    }

    /// All stored messages, oldest first.
    pub async fn messages(&self) -> Vec<ChatMessage> {
        let mut messages: Vec<_> = self.messages.read().await.values().cloned().collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn insert_message(&self, message: &ChatMessage) -> StoreResult<()> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            return Err(StoreError::Conflict(format!("message {}", message.id)));
        }
        messages.insert(message.id, message.clone());
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> StoreResult<ChatMessage> {
        self.messages
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("message {id}")))
    }

    async fn mark_message_read(&self, id: Uuid, user_id: &str) -> StoreResult<ChatMessage> {
        let mut messages = self.messages.write().await;
        let message = messages
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("message {id}")))?;
        message.record_reader(user_id);
        Ok(message.clone())
    }

    async fn group_members(&self, group_id: &str) -> StoreResult<Vec<String>> {
        self.groups
            .read()
            .await
            .get(group_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("group {group_id}")))
    }

    async fn set_user_status(
        &self,
        user_id: &str,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.statuses
            .write()
            .await
            .insert(user_id.to_string(), UserStatus { online, last_seen });
        Ok(())
    }

    async fn user_status(&self, user_id: &str) -> StoreResult<Option<UserStatus>> {
        Ok(self.statuses.read().await.get(user_id).copied())
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        self.notifications.write().await.push(notification.clone());
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
