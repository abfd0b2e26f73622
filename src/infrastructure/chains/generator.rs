use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, future};

use super::prompts::{self, render};
use crate::domain::{
    AnswerGenerator, AnswerStream, CompletionProvider, CompletionRequest, Document, DomainError,
};

/// Streams a `<cited_answer>` built from the documents
#[derive(Debug, Clone)]
pub struct LlmAnswerGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmAnswerGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    fn build_request(question: &str, documents: &[Document]) -> CompletionRequest {
        let context = prompts::context(documents);
        let user = render(
            prompts::GENERATION_USER,
            &[("question", question), ("context", &context)],
        );

        CompletionRequest::builder()
            .system(prompts::GENERATION_SYSTEM)
            .user(user)
            .temperature(0.0)
            .build()
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<AnswerStream, DomainError> {
        let request = Self::build_request(question, documents);
        let chunks = self.provider.complete_stream(request).await?;

        let tokens = chunks.filter_map(|chunk| {
            future::ready(match chunk {
                Ok(chunk) => chunk.delta.map(Ok),
                Err(e) => Some(Err(e)),
            })
        });

        Ok(Box::pin(tokens))
    }
}
