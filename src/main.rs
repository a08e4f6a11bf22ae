//! # Message Recall CLI (`recall`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `recall init` | Create the SQLite database and run schema migrations |
//! | `recall sync` | Run one incremental sync into the vector index |
//! | `recall serve` | Start the query HTTP server |
//!
//! `recall sync` is what the external scheduler invokes on its weekly tick;
//! the process exit status is the whole contract with the invoker. API keys
//! (`OPENAI_API_KEY`, `VECTOR_API_KEY`) come from the environment, loaded
//! from a `.env` file when present.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use message_recall::chat::OpenAiChat;
use message_recall::composer::AnswerComposer;
use message_recall::config::{load_config, Config};
use message_recall::db;
use message_recall::embedding::OpenAiEmbeddings;
use message_recall::indexer::{Indexer, IndexerSettings};
use message_recall::intent::IntentClassifier;
use message_recall::migrate;
use message_recall::pipeline::QueryPipeline;
use message_recall::router::{RetrievalRouter, RouterSettings};
use message_recall::server;
use message_recall::session::SessionStore;
use message_recall::store::{SqliteCheckpointStore, SqliteMessageStore};
use message_recall::vector::HttpVectorIndex;

/// Message Recall — retrieval-augmented question answering over a chat
/// workspace's message history.
#[derive(Parser)]
#[command(
    name = "recall",
    about = "Retrieval-augmented question answering for chat workspaces",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/recall.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Idempotent.
    Init,

    /// Run one incremental sync of new messages into the vector index.
    Sync,

    /// Start the query HTTP server.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&config.db).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("database initialized at {}", config.db.path.display());
        }
        Commands::Sync => {
            let indexer = build_indexer(&config).await?;
            let report = indexer.run_sync().await?;
            println!("sync");
            println!("  processed: {} messages", report.processed);
            println!("ok");
        }
        Commands::Serve => {
            let pipeline = build_pipeline(&config)?;
            server::run_server(&config, pipeline).await?;
        }
    }

    Ok(())
}

async fn build_indexer(config: &Config) -> Result<Indexer> {
    let pool = db::connect(&config.db).await?;

    Ok(Indexer::new(
        Arc::new(SqliteMessageStore::new(pool.clone())),
        Arc::new(SqliteCheckpointStore::new(pool)),
        Arc::new(OpenAiEmbeddings::new(&config.embedding)?),
        Arc::new(HttpVectorIndex::new(&config.vector)?),
        IndexerSettings {
            message_index: config.vector.message_index.clone(),
            namespace: config.vector.namespace.clone(),
            batch_size: config.indexer.batch_size,
        },
    ))
}

fn build_pipeline(config: &Config) -> Result<Arc<QueryPipeline>> {
    let chat = Arc::new(OpenAiChat::new(&config.chat)?);
    let embeddings = Arc::new(OpenAiEmbeddings::new(&config.embedding)?);
    let index = Arc::new(HttpVectorIndex::new(&config.vector)?);
    let sessions = Arc::new(SessionStore::new(config.session.max_exchanges));

    Ok(Arc::new(QueryPipeline::new(
        IntentClassifier::new(chat.clone()),
        RetrievalRouter::new(embeddings, index, RouterSettings::from_config(config)),
        AnswerComposer::new(chat, sessions),
    )))
}
