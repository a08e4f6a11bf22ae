//! Embedding client: text → fixed-length dense vector.
//!
//! [`EmbeddingClient`] is the seam the indexer and the retrieval router
//! depend on; [`OpenAiEmbeddings`] is the production implementation against
//! the OpenAI embeddings API, with the shared retry/backoff strategy from
//! [`crate::http`]. Requires the `OPENAI_API_KEY` environment variable.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::ClientError;
use crate::http::post_json_with_retry;

/// Converts one text into one embedding vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError>;
}

pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    model: String,
    api_key: String,
    max_retries: u32,
}

impl OpenAiEmbeddings {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) => key,
            Err(_) => bail!("OPENAI_API_KEY environment variable not set"),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl EmbeddingClient for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ClientError> {
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let json = post_json_with_retry(
            &self.client,
            "https://api.openai.com/v1/embeddings",
            &[("Authorization", format!("Bearer {}", self.api_key))],
            &body,
            self.max_retries,
        )
        .await?;

        parse_embedding_response(&json)
    }
}

/// Extract the first `data[].embedding` array from the API response.
fn parse_embedding_response(json: &serde_json::Value) -> Result<Vec<f32>, ClientError> {
    let embedding = json
        .get("data")
        .and_then(|d| d.as_array())
        .and_then(|d| d.first())
        .and_then(|item| item.get("embedding"))
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            ClientError::InvalidResponse("missing data[0].embedding in response".into())
        })?;

    Ok(embedding
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0) as f32)
        .collect())
}
