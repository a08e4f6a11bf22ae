use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    pub vector: VectorConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    /// Pool size. The sync job and the server each hold their own pool, so
    /// this bounds connections per process, not globally.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dims: None,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Names of the remote vector indices and the namespace the message stream
/// is written into. One index per logical stream: raw messages, document
/// summaries, document chunks.
#[derive(Debug, Deserialize, Clone)]
pub struct VectorConfig {
    pub base_url: String,
    pub message_index: String,
    pub summary_index: String,
    pub chunk_index: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexerConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_resource_top_k")]
    pub resource_top_k: usize,
    #[serde(default = "default_summary_top_k")]
    pub summary_top_k: usize,
    #[serde(default = "default_detail_top_k")]
    pub detail_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            resource_top_k: default_resource_top_k(),
            summary_top_k: default_summary_top_k(),
            detail_top_k: default_detail_top_k(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_max_exchanges")]
    pub max_exchanges: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_exchanges: default_max_exchanges(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Schedule the external cron wrapper fires the sync job on. Recorded here
/// so deployments keep the schedule next to the rest of the settings; the
/// crate itself never runs a timer loop.
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_cron")]
    pub cron: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cron: default_cron(),
            timezone: default_timezone(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}
fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}
fn default_chat_model() -> String {
    "gpt-4o".to_string()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_namespace() -> String {
    "slack-messages".to_string()
}
fn default_batch_size() -> usize {
    100
}
fn default_resource_top_k() -> usize {
    20
}
fn default_summary_top_k() -> usize {
    1
}
fn default_detail_top_k() -> usize {
    3
}
fn default_max_exchanges() -> usize {
    5
}
fn default_cron() -> String {
    "0 0 * * 0".to_string()
}
fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be >= 1");
    }

    if config.indexer.batch_size == 0 {
        anyhow::bail!("indexer.batch_size must be >= 1");
    }

    if config.retrieval.resource_top_k == 0
        || config.retrieval.summary_top_k == 0
        || config.retrieval.detail_top_k == 0
    {
        anyhow::bail!("retrieval top-k values must be >= 1");
    }

    if config.session.max_exchanges == 0 {
        anyhow::bail!("session.max_exchanges must be >= 1");
    }

    if let Some(dims) = config.embedding.dims {
        if dims == 0 {
            anyhow::bail!("embedding.dims must be > 0 when set");
        }
    }

    if !(0.0..=2.0).contains(&config.chat.temperature) {
        anyhow::bail!("chat.temperature must be in [0.0, 2.0]");
    }

    for (field, value) in [
        ("vector.base_url", &config.vector.base_url),
        ("vector.message_index", &config.vector.message_index),
        ("vector.summary_index", &config.vector.summary_index),
        ("vector.chunk_index", &config.vector.chunk_index),
    ] {
        if value.trim().is_empty() {
            anyhow::bail!("{} must not be empty", field);
        }
    }

    Ok(config)
}
