//! Vector index client: batched upsert and filtered similarity search
//! against a remote, namespaced vector database.
//!
//! # Wire contract
//!
//! - `POST {base}/indexes/{index}/upsert` with
//!   `{namespace, vectors: [{id, values, metadata}]}`
//! - `POST {base}/indexes/{index}/query` with
//!   `{namespace, vector, topK, includeMetadata, filter?}` returning
//!   `{matches: [{id, score, metadata}]}`
//!
//! Upsert is insert-or-replace keyed by vector id, which is what makes
//! re-indexing idempotent. Metadata filters are built through
//! [`MetadataFilter`] rather than ad hoc JSON so the filter shape cannot
//! drift between call sites.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::VectorConfig;
use crate::error::ClientError;
use crate::http::post_json_with_retry;

/// Metadata attached to an indexed vector and returned with query matches.
///
/// All fields are optional on the read path: the summary and chunk indices
/// carry only `content`, while message vectors carry the full set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_twitter_url: Option<bool>,
}

/// One vector in an upsert payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// One similarity-search hit. Tie ordering between equal scores is the
/// index's native ordering; this layer does not re-sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: VectorMetadata,
}

/// Typed metadata filter. Currently the only predicate the pipeline needs
/// is `type IN (...)`; the builder keeps the `$and`/`$in` wire shape in
/// one place.
#[derive(Debug, Clone)]
pub struct MetadataFilter {
    kinds: Vec<String>,
}

impl MetadataFilter {
    /// Restrict matches to vectors whose `type` metadata is in `kinds`.
    pub fn kind_in(kinds: &[&str]) -> Self {
        Self {
            kinds: kinds.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "$and": [
                { "type": { "$in": self.kinds } }
            ]
        })
    }
}

/// Parameters of a similarity query.
#[derive(Debug, Clone)]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub filter: Option<MetadataFilter>,
}

/// Upsert and similarity search against a named index + namespace.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        vectors: &[IndexedVector],
    ) -> Result<(), ClientError>;

    async fn query(
        &self,
        index: &str,
        namespace: &str,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, ClientError>;
}

/// HTTP implementation of [`VectorIndex`]. Requires the `VECTOR_API_KEY`
/// environment variable.
pub struct HttpVectorIndex {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl HttpVectorIndex {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        let api_key = match std::env::var("VECTOR_API_KEY") {
            Ok(key) => key,
            Err(_) => bail!("VECTOR_API_KEY environment variable not set"),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        vectors: &[IndexedVector],
    ) -> Result<(), ClientError> {
        let url = format!("{}/indexes/{}/upsert", self.base_url, index);
        let body = serde_json::json!({
            "namespace": namespace,
            "vectors": vectors,
        });

        post_json_with_retry(
            &self.client,
            &url,
            &[("Api-Key", self.api_key.clone())],
            &body,
            self.max_retries,
        )
        .await?;

        Ok(())
    }

    async fn query(
        &self,
        index: &str,
        namespace: &str,
        query: VectorQuery,
    ) -> Result<Vec<VectorMatch>, ClientError> {
        let url = format!("{}/indexes/{}/query", self.base_url, index);
        let mut body = serde_json::json!({
            "namespace": namespace,
            "vector": query.vector,
            "topK": query.top_k,
            "includeMetadata": true,
        });
        if let Some(filter) = &query.filter {
            body["filter"] = filter.to_value();
        }

        let json = post_json_with_retry(
            &self.client,
            &url,
            &[("Api-Key", self.api_key.clone())],
            &body,
            self.max_retries,
        )
        .await?;

        let matches = json
            .get("matches")
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

        serde_json::from_value(matches)
            .map_err(|e| ClientError::InvalidResponse(format!("malformed matches: {}", e)))
    }
}
