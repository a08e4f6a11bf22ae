//! Structured block serialization: the wire contract the chat UI consumes.
//!
//! A composed answer becomes a list of typed blocks: a leading markdown
//! section, then either one file-reference block per resource with a stored
//! url, or (only when the answer text actually cites) a divider, a
//! `*Sources*` header, and one section per detail chunk. The shapes here
//! must not drift; the UI renders them field-for-field.

use serde::Serialize;

use crate::composer::ComposedAnswer;
use crate::models::{Resource, RetrievedContext};

/// One unit of the composed response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: MrkdwnText },
    Divider,
    File {
        external_id: String,
        source: String,
        title: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct MrkdwnText {
    #[serde(rename = "type")]
    kind: &'static str,
    pub text: String,
}

impl MrkdwnText {
    fn new(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn",
            text: text.into(),
        }
    }
}

fn section(text: impl Into<String>) -> Block {
    Block::Section {
        text: MrkdwnText::new(text),
    }
}

/// Full JSON body of a successful `/api/query` response.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub response: BlockList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<Resource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockList {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseMetadata {
    pub source: String,
    /// Cited context, or `null` for uncited answers.
    pub context: Option<MetadataContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataContext {
    pub summary: String,
    pub details: Vec<CitedDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CitedDetail {
    pub citation: String,
    pub content: String,
}

/// Serialize a composed answer and its retrieval context into the response
/// body.
pub fn build_response(answer: &ComposedAnswer, context: &RetrievedContext) -> QueryResponse {
    match context {
        RetrievedContext::Resources(resources) => {
            let mut blocks = vec![section(answer.text.clone())];
            // A resource without a url stays in the context list but gets
            // no file block; the UI cannot render a file without one.
            blocks.extend(resources.iter().filter_map(|r| {
                r.url.clone().map(|url| Block::File {
                    external_id: url,
                    source: "remote".to_string(),
                    title: r.name.clone(),
                })
            }));

            QueryResponse {
                response: BlockList { blocks },
                context: Some(resources.clone()),
                metadata: None,
            }
        }
        RetrievedContext::Knowledge { summary, details } => {
            let mut blocks = vec![section(answer.text.clone())];

            if answer.citations_used {
                blocks.push(Block::Divider);
                blocks.push(section("*Sources*"));
                blocks.extend(
                    details
                        .iter()
                        .enumerate()
                        .map(|(i, d)| section(format!("*[{}]* {}", i + 1, d))),
                );
            }

            let metadata = if answer.citations_used {
                ResponseMetadata {
                    source: "GauntletAI Handbook".to_string(),
                    context: Some(MetadataContext {
                        summary: summary.clone(),
                        details: details
                            .iter()
                            .enumerate()
                            .map(|(i, d)| CitedDetail {
                                citation: format!("[{}]", i + 1),
                                content: d.clone(),
                            })
                            .collect(),
                    }),
                }
            } else {
                ResponseMetadata {
                    source: "General Response".to_string(),
                    context: None,
                }
            };

            QueryResponse {
                response: BlockList { blocks },
                context: None,
                metadata: Some(metadata),
            }
        }
    }
}
