use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::{Document, DomainError, PassageRetriever};
use crate::infrastructure::http_client::HttpClientTrait;

const SERVICE: &str = "retrieval";

/// Client for the passage-retrieval service's `POST /retrieve`
#[derive(Debug)]
pub struct HttpPassageRetriever<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> HttpPassageRetriever<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: None,
        }
    }

    /// Static bearer token sent with every request
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.auth_header = Some(format!("Bearer {}", token.into()));
        self
    }

    fn retrieve_url(&self) -> String {
        format!("{}/retrieve", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }
}

#[derive(Debug, Deserialize)]
struct RetrievedPassage {
    page_content: String,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

#[async_trait]
impl<C: HttpClientTrait> PassageRetriever for HttpPassageRetriever<C> {
    async fn retrieve(&self, question: &str) -> Result<Vec<Document>, DomainError> {
        let body = serde_json::json!({ "query": question });
        let response = self
            .client
            .post_json(&self.retrieve_url(), self.headers(), &body)
            .await?;

        let passages: Vec<RetrievedPassage> = serde_json::from_value(response).map_err(|e| {
            DomainError::dependency(SERVICE, format!("Unexpected response shape: {}", e))
        })?;

        debug!(documents = passages.len(), "Retrieved passages");

        Ok(passages
            .into_iter()
            .map(|p| Document {
                content: p.page_content,
                metadata: p.metadata,
            })
            .collect())
    }
}
