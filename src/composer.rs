//! Grounded answer composition.
//!
//! Builds a single language-model prompt from the retrieved context, the
//! query, and up to five prior exchanges, then decides after generation
//! whether the answer cites its sources: a `[n]` bracket anywhere in the
//! generated text is what turns the citations section on. The scan is
//! deliberately post-hoc and never cross-checks that a cited index is in
//! bounds of the detail list.

use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::chat::ChatModel;
use crate::error::{ClientError, QueryError};
use crate::intent::Intent;
use crate::models::{Exchange, Resource, RetrievedContext};
use crate::session::SessionStore;

/// Composer output, before block serialization.
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub text: String,
    pub citations_used: bool,
    pub resources: Option<Vec<Resource>>,
}

pub struct AnswerComposer {
    chat: Arc<dyn ChatModel>,
    sessions: Arc<SessionStore>,
}

impl AnswerComposer {
    pub fn new(chat: Arc<dyn ChatModel>, sessions: Arc<SessionStore>) -> Self {
        Self { chat, sessions }
    }

    /// Compose the final answer and record the exchange in the session.
    pub async fn compose(
        &self,
        session_id: &str,
        prompt: &str,
        intent: Intent,
        context: &RetrievedContext,
    ) -> Result<ComposedAnswer, QueryError> {
        let transcript = transcript(&self.sessions.history(session_id));

        let (model_prompt, resources) = match context {
            RetrievedContext::Resources(resources) => {
                let rendered = serde_json::to_string(resources).map_err(|e| {
                    QueryError::Composition(ClientError::InvalidResponse(e.to_string()))
                })?;
                (
                    resource_prompt(&transcript, prompt, &rendered),
                    Some(resources.clone()),
                )
            }
            RetrievedContext::Knowledge { summary, details } => (
                knowledge_prompt(intent, &transcript, prompt, summary, details),
                None,
            ),
        };

        let text = self
            .chat
            .complete(&model_prompt)
            .await
            .map_err(QueryError::Composition)?;

        let citations_used = has_citations(&text);

        self.sessions.append(
            session_id,
            Exchange {
                prompt: prompt.to_string(),
                response: text.clone(),
                resources: resources.clone(),
            },
        );

        Ok(ComposedAnswer {
            text,
            citations_used,
            resources,
        })
    }
}

fn citation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\d+\]").expect("citation pattern is valid"))
}

/// Whether the generated text contains a bracket-number citation marker.
pub fn has_citations(text: &str) -> bool {
    citation_pattern().is_match(text)
}

/// Render prior exchanges as a plain transcript, or empty when the session
/// has no history yet.
fn transcript(history: &[Exchange]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = history
        .iter()
        .map(|e| format!("User: {}\nAssistant: {}", e.prompt, e.response))
        .collect();

    format!(
        "Previous conversation:\n{}\n\nCurrent question:",
        lines.join("\n")
    )
}

fn resource_prompt(transcript: &str, prompt: &str, resources_json: &str) -> String {
    format!(
        r#"{}
User: {}

Here are the available resources: {}

In 1-2 short sentences, summarize these resources."#,
        transcript, prompt, resources_json
    )
}

fn knowledge_prompt(
    intent: Intent,
    transcript: &str,
    prompt: &str,
    summary: &str,
    details: &[String],
) -> String {
    let numbered: Vec<String> = details
        .iter()
        .enumerate()
        .map(|(i, d)| format!("[{}] {}", i + 1, d))
        .collect();

    let context = format!(
        "\nOverview:\n{}\n\nSpecific Details:\n{}",
        summary,
        numbered.join("\n\n")
    );

    let handbook = intent == Intent::HandbookKnowledge;
    let guidance = if handbook {
        "Use the handbook information below to provide a detailed response."
    } else {
        "Provide a natural response, and reference the handbook if relevant to the query (e.g. if anything about gauntlet is mentioned)"
    };
    let context_header = if handbook {
        "Handbook Information:"
    } else {
        "Additional Context (reference only if relevant):"
    };

    format!(
        r#"You are a friendly and knowledgeable assistant who is an expert on the GauntletAI program.
{}

User Query: "{}"

{}
{}

Previous Conversation:
{}

IMPORTANT:
- Keep your response clear and concise, no longer than 2 sentences
- Only use citations [X] when you are specifically referencing information from the handbook
- For general greetings or casual conversation, respond naturally without citations
- For handbook-related queries, include at least one citation using [X]
- If multiple handbook chunks support a point, cite all relevant chunks
- Do not include any tags like [Overview] in your response
- Do not force citations if the response doesn't require handbook information"#,
        guidance, prompt, context_header, context, transcript
    )
}
