//! Language model client used for intent classification and answer
//! composition.
//!
//! Same transport conventions as the embedding client: bounded timeout,
//! shared retry/backoff, `OPENAI_API_KEY` from the environment.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::ChatConfig;
use crate::error::ClientError;
use crate::http::post_json_with_retry;

/// A single-turn completion: instruction prompt in, response text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError>;
}

pub struct OpenAiChat {
    client: reqwest::Client,
    model: String,
    temperature: f32,
    api_key: String,
    max_retries: u32,
}

impl OpenAiChat {
    pub fn new(config: &ChatConfig) -> Result<Self> {
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
            temperature: config.temperature,
            api_key,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let json = post_json_with_retry(
            &self.client,
            "https://api.openai.com/v1/chat/completions",
            &[("Authorization", format!("Bearer {}", self.api_key))],
            &body,
            self.max_retries,
        )
        .await?;

        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content` from the API response.
fn parse_chat_response(json: &serde_json::Value) -> Result<String, ClientError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ClientError::InvalidResponse("missing choices[0].message.content in response".into())
        })
}
