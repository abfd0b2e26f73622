use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, WebSearchHit, WebSearchTool};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
const SERVICE: &str = "web_search";

/// Tavily-compatible search API client
#[derive(Debug)]
pub struct TavilySearchTool<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl<C: HttpClientTrait> TavilySearchTool<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_TAVILY_BASE_URL.to_string(),
            max_results: 3,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    content: String,
    url: Option<String>,
}

#[async_trait]
impl<C: HttpClientTrait> WebSearchTool for TavilySearchTool<C> {
    async fn search(&self, query: &str) -> Result<Vec<WebSearchHit>, DomainError> {
        let body = serde_json::json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": self.max_results,
        });

        let response = self
            .client
            .post_json(
                &format!("{}/search", self.base_url),
                vec![("Content-Type", "application/json")],
                &body,
            )
            .await?;

        let parsed: TavilyResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::dependency(SERVICE, format!("Unexpected response shape: {}", e))
        })?;

        Ok(parsed
            .results
            .into_iter()
            .take(self.max_results)
            .map(|r| WebSearchHit {
                content: r.content,
                url: r.url,
            })
            .collect())
    }

    fn tool_name(&self) -> &'static str {
        "tavily"
    }
}
