use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::prompts::{self, render};
use super::verdict::json_field;
use crate::infrastructure::observability::record_token_usage;
use crate::domain::{CompletionProvider, CompletionRequest, DomainError, QuestionRouter, RouteDecision};

const CHAIN: &str = "question_router";

/// Routes questions between the indexed corpus and web search
#[derive(Debug, Clone)]
pub struct LlmQuestionRouter {
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
}

impl LlmQuestionRouter {
    pub fn new(provider: Arc<dyn CompletionProvider>, corpus_description: &str) -> Self {
        Self {
            provider,
            system_prompt: render(
                prompts::ROUTER_SYSTEM,
                &[("corpus_description", corpus_description)],
            ),
        }
    }
}

fn parse_datasource(reply: &str) -> Result<RouteDecision, DomainError> {
    let label = match json_field(reply, "datasource") {
        Some(Value::String(label)) => label,
        _ => reply.trim().trim_matches('"').to_string(),
    };

    match label.trim().to_lowercase().as_str() {
        "vectorstore" => Ok(RouteDecision::Corpus),
        "web_search" | "websearch" => Ok(RouteDecision::Web),
        other => Err(DomainError::dependency(
            CHAIN,
            format!("Unrecognised datasource: {}", other),
        )),
    }
}

#[async_trait]
impl QuestionRouter for LlmQuestionRouter {
    async fn route(&self, question: &str) -> Result<RouteDecision, DomainError> {
        let request = CompletionRequest::builder()
            .system(self.system_prompt.clone())
            .user(question)
            .temperature(0.0)
            .max_tokens(20)
            .json_output()
            .build();

        let completion = self.provider.complete(request).await?;
        if let Some(usage) = completion.usage {
            record_token_usage(CHAIN, usage);
        }
        let decision = parse_datasource(&completion.content)?;

        debug!(?decision, "Routed question");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::completion::MockCompletionProvider;

    #[test]
    fn test_parse_datasource() {
        assert_eq!(
            parse_datasource(r#"{"datasource": "vectorstore"}"#).unwrap(),
            RouteDecision::Corpus
        );
        assert_eq!(
            parse_datasource(r#"{"datasource": "web_search"}"#).unwrap(),
            RouteDecision::Web
        );
        assert_eq!(parse_datasource("vectorstore").unwrap(), RouteDecision::Corpus);
        assert!(parse_datasource(r#"{"datasource": "library"}"#).is_err());
    }

    #[tokio::test]
    async fn test_router_uses_corpus_description() {
        let provider =
            Arc::new(MockCompletionProvider::new().with_reply(r#"{"datasource":"web_search"}"#));
        let router = LlmQuestionRouter::new(provider.clone(), "telecom standards");

        let decision = router.route("Who won the match last night?").await.unwrap();
        assert_eq!(decision, RouteDecision::Web);

        let request = &provider.requests()[0];
        assert!(request.messages[0].content.contains("telecom standards"));
        assert_eq!(
            request.last_user_message(),
            Some("Who won the match last night?")
        );
    }
}
