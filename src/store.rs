//! Durable-store adapters: message reads and the sync checkpoint log.
//!
//! Both adapters sit behind traits so the indexer can be exercised against
//! in-memory fakes. The SQLite implementations are the production path.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::SyncError;
use crate::models::{Message, SyncCheckpoint, SyncStatus};

/// Read-only access to the durable message table.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch all messages with `created_at > after`, ordered ascending.
    /// The bound is exclusive: a message stamped exactly at the checkpoint
    /// time is not refetched.
    async fn messages_after(&self, after: DateTime<Utc>) -> Result<Vec<Message>, SyncError>;
}

/// Append-only log of sync attempts.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// The most recent checkpoint by `last_update_time` descending, or
    /// `None` before the first recorded attempt.
    async fn current(&self) -> Result<Option<SyncCheckpoint>, SyncError>;

    /// Append one attempt row. Rows are never updated or deleted.
    async fn append(&self, checkpoint: &SyncCheckpoint) -> Result<(), SyncError>;
}

pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn messages_after(&self, after: DateTime<Utc>) -> Result<Vec<Message>, SyncError> {
        let rows = sqlx::query(
            r#"
            SELECT id, content, user_id, channel_id, dm_user_id, parent_id, created_at
            FROM messages
            WHERE created_at > ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(after.timestamp())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::Fetch(e.to_string()))?;

        let messages = rows
            .iter()
            .map(|row| {
                let created_at: i64 = row.get("created_at");
                Message {
                    id: row.get("id"),
                    content: row.get("content"),
                    user_id: row.get("user_id"),
                    channel_id: row.get("channel_id"),
                    dm_user_id: row.get("dm_user_id"),
                    parent_id: row.get("parent_id"),
                    created_at: DateTime::from_timestamp(created_at, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                }
            })
            .collect();

        Ok(messages)
    }
}

pub struct SqliteCheckpointStore {
    pool: SqlitePool,
}

impl SqliteCheckpointStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn current(&self) -> Result<Option<SyncCheckpoint>, SyncError> {
        let row = sqlx::query(
            r#"
            SELECT last_update_time, status, messages_processed, recorded_at
            FROM sync_checkpoints
            ORDER BY last_update_time DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SyncError::Fetch(e.to_string()))?;

        Ok(row.map(|row| {
            let last_update_time: i64 = row.get("last_update_time");
            let recorded_at: i64 = row.get("recorded_at");
            let status: String = row.get("status");
            SyncCheckpoint {
                last_update_time: DateTime::from_timestamp(last_update_time, 0)
                    .unwrap_or(DateTime::UNIX_EPOCH),
                status: SyncStatus::parse(&status),
                messages_processed: row.get("messages_processed"),
                recorded_at: DateTime::from_timestamp(recorded_at, 0)
                    .unwrap_or(DateTime::UNIX_EPOCH),
            }
        }))
    }

    async fn append(&self, checkpoint: &SyncCheckpoint) -> Result<(), SyncError> {
        sqlx::query(
            r#"
            INSERT INTO sync_checkpoints (last_update_time, status, messages_processed, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(checkpoint.last_update_time.timestamp())
        .bind(checkpoint.status.as_str())
        .bind(checkpoint.messages_processed)
        .bind(checkpoint.recorded_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| SyncError::Checkpoint(e.to_string()))?;

        Ok(())
    }
}
