//! Error taxonomy for the sync job and the query pipeline.
//!
//! Transport-level failures from the external services (embedding, chat
//! completion, vector index) are wrapped in [`ClientError`] and converted
//! into the domain variant at the call site, so a caller can always tell
//! which stage of a run or a query failed.

use thiserror::Error;

/// Failure talking to an external HTTP service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by a sync run.
///
/// `Fetch` aborts the run without a checkpoint; `Embedding` and `IndexWrite`
/// abort the remaining batches and record a failed checkpoint first.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("message fetch failed: {0}")]
    Fetch(String),

    #[error("checkpoint store failed: {0}")]
    Checkpoint(String),

    #[error("embedding failed: {0}")]
    Embedding(ClientError),

    #[error("vector upsert failed: {0}")]
    IndexWrite(ClientError),

    #[error("a sync run is already active")]
    AlreadyRunning,
}

/// Errors raised while answering a query. All map to HTTP 500 at the
/// request boundary.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("intent classification failed: {0}")]
    Classification(ClientError),

    #[error("context retrieval failed: {0}")]
    Retrieval(String),

    #[error("answer composition failed: {0}")]
    Composition(ClientError),
}
