//! Web search tool contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// One result returned by the web search tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchHit {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl WebSearchHit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Open web search used when the corpus is insufficient
#[async_trait]
pub trait WebSearchTool: Send + Sync + std::fmt::Debug {
    async fn search(&self, query: &str) -> Result<Vec<WebSearchHit>, DomainError>;

    fn tool_name(&self) -> &'static str;
}
