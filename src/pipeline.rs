//! End-to-end query pipeline: classify → retrieve → compose.

use crate::composer::{AnswerComposer, ComposedAnswer};
use crate::error::QueryError;
use crate::intent::{Intent, IntentClassifier};
use crate::models::RetrievedContext;
use crate::router::RetrievalRouter;

/// Everything a request boundary needs to serialize a response.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub intent: Intent,
    pub context: RetrievedContext,
    pub answer: ComposedAnswer,
}

pub struct QueryPipeline {
    classifier: IntentClassifier,
    router: RetrievalRouter,
    composer: AnswerComposer,
}

impl QueryPipeline {
    pub fn new(
        classifier: IntentClassifier,
        router: RetrievalRouter,
        composer: AnswerComposer,
    ) -> Self {
        Self {
            classifier,
            router,
            composer,
        }
    }

    /// Answer one query. Stateless apart from the composer's session
    /// side effect; concurrent queries on different sessions are
    /// independent.
    pub async fn answer(&self, session_id: &str, prompt: &str) -> Result<QueryOutcome, QueryError> {
        let intent = self.classifier.classify(prompt).await?;
        let context = self.router.retrieve(prompt, intent).await?;
        let answer = self
            .composer
            .compose(session_id, prompt, intent, &context)
            .await?;

        Ok(QueryOutcome {
            intent,
            context,
            answer,
        })
    }
}
