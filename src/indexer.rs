//! Incremental sync of chat messages into the vector index.
//!
//! The run is checkpoint-driven: the lower bound of each fetch is the
//! `last_update_time` of the most recent checkpoint (epoch before the first
//! run). Messages are embedded and upserted in fixed-size batches; batches
//! run sequentially, the embedding calls within a batch run concurrently.
//! Vector ids are derived from message ids (`msg_<id>`), so a retried run
//! re-covers anything an aborted run already wrote.
//!
//! On success a checkpoint is recorded with the wall-clock time at
//! completion, NOT the `created_at` of the last processed message. A message
//! inserted between the fetch snapshot and the checkpoint write can
//! therefore be skipped by the next run if its `created_at` is not past the
//! new checkpoint. That trade against producer/indexer clock skew is
//! deliberate and must not be changed without a product decision.

use chrono::Utc;
use futures_util::future::try_join_all;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn};

use crate::embedding::EmbeddingClient;
use crate::error::SyncError;
use crate::models::{Message, SyncCheckpoint, SyncReport, SyncStatus};
use crate::store::{CheckpointStore, MessageStore};
use crate::vector::{IndexedVector, VectorIndex, VectorMetadata};

/// Index/namespace targets and batching for the sync job.
#[derive(Debug, Clone)]
pub struct IndexerSettings {
    pub message_index: String,
    pub namespace: String,
    pub batch_size: usize,
}

pub struct Indexer {
    messages: Arc<dyn MessageStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    settings: IndexerSettings,
    running: AtomicBool,
}

impl Indexer {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        settings: IndexerSettings,
    ) -> Self {
        Self {
            messages,
            checkpoints,
            embeddings,
            index,
            settings,
            running: AtomicBool::new(false),
        }
    }

    /// Run one incremental sync.
    ///
    /// Refuses to overlap with an in-flight run on the same instance: the
    /// external scheduler fires coarsely, but a manual trigger during a slow
    /// run must not produce duplicate checkpoints.
    pub async fn run_sync(&self) -> Result<SyncReport, SyncError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::AlreadyRunning);
        }

        let result = self.sync_inner().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn sync_inner(&self) -> Result<SyncReport, SyncError> {
        let since = self
            .checkpoints
            .current()
            .await?
            .map(|c| c.last_update_time)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        info!(since = %since, "fetching messages since last checkpoint");
        let messages = self.messages.messages_after(since).await?;

        if messages.is_empty() {
            // No checkpoint row for an empty run; the old lower bound stays.
            info!("no new messages to process");
            return Ok(SyncReport { processed: 0 });
        }

        info!(count = messages.len(), "processing new messages");

        let total = messages.len();
        for (batch_no, batch) in messages.chunks(self.settings.batch_size).enumerate() {
            if let Err(e) = self.index_batch(batch).await {
                error!(batch = batch_no + 1, error = %e, "sync aborted mid-batch");
                self.record_failure().await;
                return Err(e);
            }
            info!(batch = batch_no + 1, size = batch.len(), "processed batch");
        }

        let now = Utc::now();
        self.checkpoints
            .append(&SyncCheckpoint {
                last_update_time: now,
                status: SyncStatus::Success,
                messages_processed: total as i64,
                recorded_at: now,
            })
            .await?;

        info!(processed = total, "sync complete");
        Ok(SyncReport { processed: total })
    }

    /// Embed every message in the batch concurrently, then upsert the batch
    /// in one call.
    async fn index_batch(&self, batch: &[Message]) -> Result<(), SyncError> {
        let embeddings = try_join_all(batch.iter().map(|msg| self.embeddings.embed(&msg.content)))
            .await
            .map_err(SyncError::Embedding)?;

        let vectors: Vec<IndexedVector> = batch
            .iter()
            .zip(embeddings)
            .map(|(msg, values)| IndexedVector {
                id: vector_id(msg.id),
                values,
                metadata: message_metadata(msg),
            })
            .collect();

        self.index
            .upsert(&self.settings.message_index, &self.settings.namespace, &vectors)
            .await
            .map_err(SyncError::IndexWrite)
    }

    /// Earlier batches are not rolled back; messages_processed stays 0 on
    /// failure rows regardless.
    async fn record_failure(&self) {
        let now = Utc::now();
        let failed = SyncCheckpoint {
            last_update_time: now,
            status: SyncStatus::Failed,
            messages_processed: 0,
            recorded_at: now,
        };
        if let Err(e) = self.checkpoints.append(&failed).await {
            warn!(error = %e, "could not record failed checkpoint");
        }
    }
}

/// Deterministic vector id for a message. Stable across runs, which is what
/// makes re-indexing an upsert rather than a duplicate.
pub fn vector_id(message_id: i64) -> String {
    format!("msg_{}", message_id)
}

fn twitter_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https?://(www\.)?(twitter\.com|x\.com)/\w+/status/\d+")
            .expect("permalink pattern is valid")
    })
}

/// First Twitter/X status permalink embedded in the content, if any.
pub fn twitter_permalink(content: &str) -> Option<&str> {
    twitter_pattern().find(content).map(|m| m.as_str())
}

/// Derive vector metadata from a message. Pure function of the message, so
/// re-indexing the same message always produces identical metadata.
pub fn message_metadata(msg: &Message) -> VectorMetadata {
    let permalink = twitter_permalink(&msg.content);

    VectorMetadata {
        content: Some(msg.content.clone()),
        user_id: Some(msg.user_id.clone().unwrap_or_else(|| "unknown".into())),
        channel_id: Some(msg.channel_id.clone().unwrap_or_else(|| "unknown".into())),
        created_at: Some(msg.created_at.to_rfc3339()),
        kind: Some(if permalink.is_some() {
            "twitter_post".to_string()
        } else {
            "slack_message".to_string()
        }),
        name: None,
        url: None,
        tweet_url: permalink.map(|p| p.to_string()),
        is_twitter_url: permalink.map(|_| true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn message(id: i64, content: &str) -> Message {
        Message {
            id,
            content: content.to_string(),
            user_id: Some("u1".to_string()),
            channel_id: Some("c1".to_string()),
            dm_user_id: None,
            parent_id: None,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_vector_id_format() {
        assert_eq!(vector_id(42), "msg_42");
    }

    #[test]
    fn test_twitter_permalink_matches_both_hosts() {
        assert_eq!(
            twitter_permalink("see https://twitter.com/user/status/12345 for details"),
            Some("https://twitter.com/user/status/12345")
        );
        assert_eq!(
            twitter_permalink("https://x.com/someone/status/987"),
            Some("https://x.com/someone/status/987")
        );
        assert_eq!(
            twitter_permalink("http://www.twitter.com/a/status/1"),
            Some("http://www.twitter.com/a/status/1")
        );
    }

    #[test]
    fn test_twitter_permalink_rejects_non_status_urls() {
        assert!(twitter_permalink("https://twitter.com/user").is_none());
        assert!(twitter_permalink("https://example.com/status/123").is_none());
        assert!(twitter_permalink("plain message, no links").is_none());
    }

    #[test]
    fn test_metadata_for_plain_message() {
        let meta = message_metadata(&message(1, "hello world"));
        assert_eq!(meta.kind.as_deref(), Some("slack_message"));
        assert!(meta.tweet_url.is_none());
        assert!(meta.is_twitter_url.is_none());
        assert_eq!(meta.content.as_deref(), Some("hello world"));
        assert_eq!(meta.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_metadata_for_twitter_message() {
        let meta = message_metadata(&message(2, "check https://x.com/team/status/555 out"));
        assert_eq!(meta.kind.as_deref(), Some("twitter_post"));
        assert_eq!(
            meta.tweet_url.as_deref(),
            Some("https://x.com/team/status/555")
        );
        assert_eq!(meta.is_twitter_url, Some(true));
    }

    #[test]
    fn test_metadata_is_deterministic() {
        let msg = message(3, "ship it https://x.com/team/status/777");
        let a = serde_json::to_value(message_metadata(&msg)).unwrap();
        let b = serde_json::to_value(message_metadata(&msg)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_metadata_defaults_missing_ids_to_unknown() {
        let mut msg = message(4, "anonymous");
        msg.user_id = None;
        msg.channel_id = None;
        let meta = message_metadata(&msg);
        assert_eq!(meta.user_id.as_deref(), Some("unknown"));
        assert_eq!(meta.channel_id.as_deref(), Some("unknown"));
    }
}
