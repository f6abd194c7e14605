//! Postgres-backed implementation of [`ChatStore`].
//!
//! Schema lives in `migrations/` and is applied by [`PostgresStore::migrate`]
//! at startup. Enum-like columns (`message_type`, `status`, `kind`) are
//! stored as their snake_case names; a row holding an unknown name is
//! reported as [`StoreError::Corrupt`] instead of being guessed at.
//!
//! Database URLs may contain credentials and are never logged.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::{ChatStore, StoreError, StoreResult, UserStatus};
use crate::shared::message::{ChatMessage, MessageKind, MessageStatus, Notification};

const MESSAGE_COLUMNS: &str =
    "id, message_type, body, sender_id, receiver_id, group_id, status, read_by, created_at";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Apply pending migrations from `migrations/`.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }
}

fn message_from_row(row: &PgRow) -> StoreResult<ChatMessage> {
    let message_type: String = row.try_get("message_type")?;
    let status: String = row.try_get("status")?;
    Ok(ChatMessage {
        id: row.try_get("id")?,
        message_type: message_type
            .parse::<MessageKind>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        body: row.try_get("body")?,
        sender_id: row.try_get("sender_id")?,
        receiver_id: row.try_get("receiver_id")?,
        group_id: row.try_get("group_id")?,
        status: status
            .parse::<MessageStatus>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?,
        read_by: row.try_get("read_by")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ChatStore for PostgresStore {
    async fn insert_message(&self, message: &ChatMessage) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, message_type, body, sender_id, receiver_id, group_id, status, read_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(message.id)
        .bind(message.message_type.as_str())
        .bind(&message.body)
        .bind(&message.sender_id)
        .bind(&message.receiver_id)
        .bind(&message.group_id)
        .bind(message.status.as_str())
        .bind(&message.read_by)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!("message {}", message.id)));
        }
        Ok(())
    }

    async fn get_message(&self, id: Uuid) -> StoreResult<ChatMessage> {
        let row = sqlx::query(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("message {id}")))?;
        message_from_row(&row)
    }

    async fn mark_message_read(&self, id: Uuid, user_id: &str) -> StoreResult<ChatMessage> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE messages
            SET read_by = CASE WHEN $2 = ANY(read_by) THEN read_by ELSE array_append(read_by, $2) END,
                status = 'read'
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("message {id}")))?;
        message_from_row(&row)
    }

    async fn group_members(&self, group_id: &str) -> StoreResult<Vec<String>> {
        let members: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM group_members WHERE group_id = $1 ORDER BY joined_at",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        if members.is_empty() {
            return Err(StoreError::NotFound(format!("group {group_id}")));
        }
        Ok(members)
    }

    async fn set_user_status(
        &self,
        user_id: &str,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_status (user_id, online, last_seen)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                online = EXCLUDED.online,
                last_seen = EXCLUDED.last_seen
            "#,
        )
        .bind(user_id)
        .bind(online)
        .bind(last_seen)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn user_status(&self, user_id: &str) -> StoreResult<Option<UserStatus>> {
        let row = sqlx::query("SELECT online, last_seen FROM user_status WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| -> StoreResult<UserStatus> {
            Ok(UserStatus {
                online: row.try_get("online")?,
                last_seen: row.try_get("last_seen")?,
            })
        })
        .transpose()
    }

    async fn insert_notification(&self, notification: &Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, kind, title, content, user_id, sender_id, group_id, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(notification.id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.content)
        .bind(&notification.user_id)
        .bind(&notification.sender_id)
        .bind(&notification.group_id)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
