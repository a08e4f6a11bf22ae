//! Intent-driven retrieval across the vector indices.
//!
//! The resource path queries the message index under its namespace with a
//! `type IN (slack_file, twitter_post)` filter and projects matches to
//! [`Resource`]s. Every other intent fans out concurrently to the summary
//! index (top 1) and chunk index (top 3), unfiltered and in the default
//! namespace; a failure in either lookup fails the whole query.

use std::sync::Arc;
use tracing::debug;

use crate::config::{Config, RetrievalConfig};
use crate::embedding::EmbeddingClient;
use crate::error::QueryError;
use crate::intent::Intent;
use crate::models::{Resource, RetrievedContext};
use crate::vector::{MetadataFilter, VectorIndex, VectorMatch, VectorQuery};

/// Index names, namespace, and top-K limits per retrieval path.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub message_index: String,
    pub summary_index: String,
    pub chunk_index: String,
    pub namespace: String,
    pub retrieval: RetrievalConfig,
}

impl RouterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            message_index: config.vector.message_index.clone(),
            summary_index: config.vector.summary_index.clone(),
            chunk_index: config.vector.chunk_index.clone(),
            namespace: config.vector.namespace.clone(),
            retrieval: config.retrieval.clone(),
        }
    }
}

pub struct RetrievalRouter {
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    settings: RouterSettings,
}

impl RetrievalRouter {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        settings: RouterSettings,
    ) -> Self {
        Self {
            embeddings,
            index,
            settings,
        }
    }

    pub async fn retrieve(
        &self,
        query: &str,
        intent: Intent,
    ) -> Result<RetrievedContext, QueryError> {
        let vector = self
            .embeddings
            .embed(query)
            .await
            .map_err(|e| QueryError::Retrieval(e.to_string()))?;

        match intent {
            Intent::ResourceRequest => self.retrieve_resources(vector).await,
            Intent::HandbookKnowledge | Intent::GeneralQuery | Intent::Unknown => {
                self.retrieve_knowledge(vector).await
            }
        }
    }

    async fn retrieve_resources(&self, vector: Vec<f32>) -> Result<RetrievedContext, QueryError> {
        let matches = self
            .index
            .query(
                &self.settings.message_index,
                &self.settings.namespace,
                VectorQuery {
                    vector,
                    top_k: self.settings.retrieval.resource_top_k,
                    filter: Some(MetadataFilter::kind_in(&["slack_file", "twitter_post"])),
                },
            )
            .await
            .map_err(|e| QueryError::Retrieval(e.to_string()))?;

        debug!(hits = matches.len(), "resource retrieval complete");
        Ok(RetrievedContext::Resources(
            matches.iter().map(resource_from_match).collect(),
        ))
    }

    async fn retrieve_knowledge(&self, vector: Vec<f32>) -> Result<RetrievedContext, QueryError> {
        let summary_query = self.index.query(
            &self.settings.summary_index,
            "",
            VectorQuery {
                vector: vector.clone(),
                top_k: self.settings.retrieval.summary_top_k,
                filter: None,
            },
        );
        let detail_query = self.index.query(
            &self.settings.chunk_index,
            "",
            VectorQuery {
                vector,
                top_k: self.settings.retrieval.detail_top_k,
                filter: None,
            },
        );

        let (summaries, details) = tokio::try_join!(summary_query, detail_query)
            .map_err(|e| QueryError::Retrieval(e.to_string()))?;

        debug!(details = details.len(), "knowledge retrieval complete");

        let summary = summaries
            .first()
            .and_then(|m| m.metadata.content.clone())
            .unwrap_or_else(|| "No summary available".to_string());

        // Detail order defines citation numbering; keep arity even for
        // matches with no stored content.
        let details = details
            .into_iter()
            .map(|m| m.metadata.content.unwrap_or_default())
            .collect();

        Ok(RetrievedContext::Knowledge { summary, details })
    }
}

/// Project a filtered message-index match into the resource response shape.
fn resource_from_match(m: &VectorMatch) -> Resource {
    let kind = m.metadata.kind.clone().unwrap_or_default();
    let name = if kind == "twitter_post" {
        "Twitter Resource".to_string()
    } else {
        m.metadata
            .name
            .clone()
            .unwrap_or_else(|| "Resource".to_string())
    };

    Resource {
        kind,
        name,
        url: m.metadata.url.clone().or_else(|| m.metadata.tweet_url.clone()),
        created_at: m.metadata.created_at.clone(),
    }
}
