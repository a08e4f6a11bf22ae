//! Core data models shared by the indexer and the query pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as stored in the durable message table.
///
/// Messages are immutable once indexed; the indexer only ever reads them.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub user_id: Option<String>,
    pub channel_id: Option<String>,
    pub dm_user_id: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a sync attempt, `success` or `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
        }
    }

    /// Anything other than the exact `success` marker is treated as failed.
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => SyncStatus::Success,
            _ => SyncStatus::Failed,
        }
    }
}

/// One row of the append-only sync checkpoint log.
///
/// The current checkpoint is the most recent row by `last_update_time`
/// descending, and its `last_update_time` is the exact lower bound of the
/// next incremental fetch.
#[derive(Debug, Clone)]
pub struct SyncCheckpoint {
    pub last_update_time: DateTime<Utc>,
    pub status: SyncStatus,
    pub messages_processed: i64,
    pub recorded_at: DateTime<Utc>,
}

/// Summary of a completed sync run.
#[derive(Debug, Clone, Copy)]
pub struct SyncReport {
    pub processed: usize,
}

/// A shared file or link projected from retrieved vector metadata.
///
/// Only used for the resource-listing response shape; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    // Absent fields are dropped from the wire, not serialized as null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Context retrieved for a single query. Transient, never persisted.
#[derive(Debug, Clone)]
pub enum RetrievedContext {
    /// Resource-intent path: filtered hits from the message index.
    Resources(Vec<Resource>),
    /// Knowledge path: one summary plus detail chunks, in citation order.
    Knowledge { summary: String, details: Vec<String> },
}

/// One prompt/response pair kept in a conversation session.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub prompt: String,
    pub response: String,
    pub resources: Option<Vec<Resource>>,
}
