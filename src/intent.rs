//! Query intent classification.
//!
//! One language-model call assigns the query a label from a fixed set. The
//! raw trimmed label is mapped into [`Intent`]; anything that is not an
//! exact known label becomes [`Intent::Unknown`], which the router treats
//! as the knowledge/general path. A lowercase `resource_request` therefore
//! does NOT take the resource path — the exact-match semantics are part of
//! the contract, and `Unknown` makes the fallthrough visible instead of
//! accidental.

use std::sync::Arc;
use tracing::info;

use crate::chat::ChatModel;
use crate::error::QueryError;

/// Classified purpose of a user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// User is looking for files, documents, or shared resources.
    ResourceRequest,
    /// User asks about the program the handbook covers.
    HandbookKnowledge,
    /// Anything else: greetings, general questions.
    GeneralQuery,
    /// The model produced a label outside the known set.
    Unknown,
}

impl Intent {
    /// Exact-match mapping from the model's label text.
    pub fn from_label(label: &str) -> Self {
        match label {
            "RESOURCE_REQUEST" => Intent::ResourceRequest,
            "HANDBOOK_KNOWLEDGE" => Intent::HandbookKnowledge,
            "GENERAL_QUERY" => Intent::GeneralQuery,
            _ => Intent::Unknown,
        }
    }
}

pub struct IntentClassifier {
    chat: Arc<dyn ChatModel>,
}

impl IntentClassifier {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self { chat }
    }

    /// Classify a query. A model transport failure is a
    /// [`QueryError::Classification`]; a malformed label is not an error,
    /// just [`Intent::Unknown`].
    pub async fn classify(&self, query: &str) -> Result<Intent, QueryError> {
        let prompt = classification_prompt(query);
        let label = self
            .chat
            .complete(&prompt)
            .await
            .map_err(QueryError::Classification)?;
        let label = label.trim();

        let intent = Intent::from_label(label);
        info!(label, ?intent, "query intent classified");
        Ok(intent)
    }
}

fn classification_prompt(query: &str) -> String {
    format!(
        r#"As an AI assistant, analyze this query and classify its primary intent. The query is: "{}"

Choose ONE of these categories:
1. RESOURCE_REQUEST - User is specifically looking for files, documents, or shared resources
2. HANDBOOK_KNOWLEDGE - User asks about gauntlet, AI, or logistics with the GauntletAI program
3. GENERAL_QUERY - User is asking a general question or making a request that doesn't fit the above

If unsure, choose Handbook Knowledge. Respond with just the category name."#,
        query
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_labels_map_to_variants() {
        assert_eq!(Intent::from_label("RESOURCE_REQUEST"), Intent::ResourceRequest);
        assert_eq!(
            Intent::from_label("HANDBOOK_KNOWLEDGE"),
            Intent::HandbookKnowledge
        );
        assert_eq!(Intent::from_label("GENERAL_QUERY"), Intent::GeneralQuery);
    }

    #[test]
    fn test_case_and_garbage_fall_to_unknown() {
        assert_eq!(Intent::from_label("resource_request"), Intent::Unknown);
        assert_eq!(Intent::from_label("Resource Request"), Intent::Unknown);
        assert_eq!(Intent::from_label(""), Intent::Unknown);
        assert_eq!(Intent::from_label("I think RESOURCE_REQUEST"), Intent::Unknown);
    }

    #[test]
    fn test_prompt_embeds_query_and_tiebreak() {
        let prompt = classification_prompt("where are the slides?");
        assert!(prompt.contains("\"where are the slides?\""));
        assert!(prompt.contains("RESOURCE_REQUEST"));
        assert!(prompt.contains("If unsure, choose Handbook Knowledge"));
    }
}
