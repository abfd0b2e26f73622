//! Completion-backed binary classifiers

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::prompts::{self, render};
use super::verdict::parse_binary_score;
use crate::infrastructure::observability::record_token_usage;
use crate::domain::{
    AnswerGrader, CompletionProvider, CompletionRequest, Document, DomainError,
    GroundednessGrader, RelevanceGrader,
};

/// Replies are a short JSON object; this keeps the call cheap
const VERDICT_MAX_TOKENS: u32 = 20;

async fn ask_binary(
    provider: &dyn CompletionProvider,
    chain: &'static str,
    system: &str,
    user: String,
) -> Result<bool, DomainError> {
    let request = CompletionRequest::builder()
        .system(system)
        .user(user)
        .temperature(0.0)
        .max_tokens(VERDICT_MAX_TOKENS)
        .json_output()
        .build();

    let completion = provider.complete(request).await?;
    if let Some(usage) = completion.usage {
        record_token_usage(chain, usage);
    }
    let verdict = parse_binary_score(chain, &completion.content)?;

    debug!(chain, verdict, "Binary classifier verdict");
    Ok(verdict)
}

/// Relevance of a retrieved document to the question
#[derive(Debug, Clone)]
pub struct LlmRelevanceGrader {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmRelevanceGrader {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RelevanceGrader for LlmRelevanceGrader {
    async fn is_relevant(&self, question: &str, document: &Document) -> Result<bool, DomainError> {
        let user = render(
            prompts::RELEVANCE_USER,
            &[("document", &document.content), ("question", question)],
        );
        ask_binary(
            self.provider.as_ref(),
            "relevance_grader",
            prompts::RELEVANCE_SYSTEM,
            user,
        )
        .await
    }
}

/// Whether a generation is supported by the documents
#[derive(Debug, Clone)]
pub struct LlmGroundednessGrader {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmGroundednessGrader {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl GroundednessGrader for LlmGroundednessGrader {
    async fn is_grounded(
        &self,
        documents: &[Document],
        generation: &str,
    ) -> Result<bool, DomainError> {
        let facts = prompts::facts(documents);
        let user = render(
            prompts::GROUNDEDNESS_USER,
            &[("documents", &facts), ("generation", generation)],
        );
        ask_binary(
            self.provider.as_ref(),
            "groundedness_grader",
            prompts::GROUNDEDNESS_SYSTEM,
            user,
        )
        .await
    }
}

/// Whether a generation resolves the question
#[derive(Debug, Clone)]
pub struct LlmAnswerGrader {
    provider: Arc<dyn CompletionProvider>,
}

impl LlmAnswerGrader {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl AnswerGrader for LlmAnswerGrader {
    async fn is_responsive(&self, question: &str, generation: &str) -> Result<bool, DomainError> {
        let user = render(
            prompts::ANSWER_USER,
            &[("question", question), ("generation", generation)],
        );
        ask_binary(
            self.provider.as_ref(),
            "answer_grader",
            prompts::ANSWER_SYSTEM,
            user,
        )
        .await
    }
}
