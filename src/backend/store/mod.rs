//! Persistence for the chat core.
//!
//! The delivery core needs very little from storage: a place to put
//! messages and notifications, read receipts, the user "online" flag, and
//! a way to resolve a group into its member IDs. [`ChatStore`] captures
//! exactly that, with two backends:
//!
//! - [`memory::MemoryStore`] for tests, local development, and deployments
//!   without `DATABASE_URL`
//! - [`postgres::PostgresStore`] backed by `sqlx`
//!
//! Group membership itself is managed elsewhere (the CRUD side of the
//! application); this module only reads it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::message::{ChatMessage, Notification};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persisted presence flag of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStatus {
    pub online: bool,
    pub last_seen: DateTime<Utc>,
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn insert_message(&self, message: &ChatMessage) -> StoreResult<()>;
    async fn get_message(&self, id: Uuid) -> StoreResult<ChatMessage>;
    /// Add `user_id` to the message's readers and return the updated
    /// message. Marking twice is not an error.
    async fn mark_message_read(&self, id: Uuid, user_id: &str) -> StoreResult<ChatMessage>;

    /// Current member IDs of a group. Unknown groups are `NotFound`.
    async fn group_members(&self, group_id: &str) -> StoreResult<Vec<String>>;

    async fn set_user_status(
        &self,
        user_id: &str,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> StoreResult<()>;
    async fn user_status(&self, user_id: &str) -> StoreResult<Option<UserStatus>>;

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
